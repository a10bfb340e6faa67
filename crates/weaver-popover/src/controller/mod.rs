//! Selection controller.
//!
//! Reacts to selection changes by classifying the selected fragment for the
//! toolbar's indicators, and to toggle commands by rewriting the selection
//! through the host editor.
//!
//! Restoring the selection after a toggle is deferred: the host may not
//! reflect the replacement in its line model until the current callback has
//! returned, so the reselect is queued and run on the host's next tick via
//! [`SelectionController::run_deferred`]. It runs once, with no retry, and
//! does nothing if the editor it was queued for is no longer the active one.

use std::collections::VecDeque;

use crate::editor::{EditorHost, EditorId, HostEditor, Position, SelectionRange};
use crate::error::Suppressed;
use crate::format::{Formatter, FormattingKind, FormattingState, ToggleDirection, ToggleResult};

#[cfg(test)]
mod tests;

/// Selection to restore once the host has settled after a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reselect {
    /// The editor that was edited.
    editor: EditorId,
    /// The range that was replaced, in pre-edit coordinates.
    replaced: SelectionRange,
    delta: isize,
}

impl Reselect {
    /// New end of the selection.
    ///
    /// On one line the end moves by the marker delta. Across lines the
    /// delta says nothing about the last line, so the end snaps to that
    /// line's actual length after the edit.
    fn end<E: HostEditor>(&self, editor: &E) -> Option<Position> {
        let to = self.replaced.to;
        if self.replaced.is_single_line() {
            Some(Position::new(to.line, to.ch.saturating_add_signed(self.delta)))
        } else {
            let line = editor.line(to.line)?;
            Some(Position::new(to.line, line.chars().count()))
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionController {
    formatter: Formatter,
    state: FormattingState,
    deferred: VecDeque<Reselect>,
}

impl SelectionController {
    pub fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            state: FormattingState::default(),
            deferred: VecDeque::new(),
        }
    }

    /// Formatting detected at the last observed selection.
    pub fn state(&self) -> FormattingState {
        self.state
    }

    /// Reclassify the current selection.
    ///
    /// Returns the freshly published state, or `None` (leaving the previous
    /// state in place) when no editor is active. Never touches the document.
    pub fn on_selection_observed<H: EditorHost>(
        &mut self,
        host: &mut H,
    ) -> Option<FormattingState> {
        let Some(editor) = host.active_editor() else {
            tracing::trace!(reason = %Suppressed::NoActiveEditor, "selection change ignored");
            return None;
        };

        let text = editor.selection();
        self.state = self.formatter.state(&text);
        Some(self.state)
    }

    /// Toggle `kind` on the current selection.
    ///
    /// Replaces the selected text and queues the reselect. Returns `None`
    /// without touching the document when there is no editor, nothing is
    /// selected, or the selection claims formatting that cannot be removed.
    pub fn on_toggle_requested<H: EditorHost>(
        &mut self,
        host: &mut H,
        kind: FormattingKind,
    ) -> Option<ToggleResult> {
        match self.apply_toggle(host, kind) {
            Ok(result) => Some(result),
            Err(reason) => {
                tracing::debug!(%kind, %reason, "toggle suppressed");
                None
            }
        }
    }

    fn apply_toggle<H: EditorHost>(
        &mut self,
        host: &mut H,
        kind: FormattingKind,
    ) -> Result<ToggleResult, Suppressed> {
        let editor = host.active_editor().ok_or(Suppressed::NoActiveEditor)?;
        // Checked before focus so an empty selection costs one read and nothing else.
        if editor.selection().is_empty() {
            return Err(Suppressed::EmptySelection);
        }

        editor.focus();
        let text = editor.selection();
        let replaced = editor.selection_range();

        let result = self.formatter.toggle(&text, kind);
        if result.direction == ToggleDirection::Unchanged {
            return Err(Suppressed::MalformedMarkerState(kind));
        }

        editor.replace_range(&result.text, replaced.from, replaced.to);
        self.deferred.push_back(Reselect {
            editor: editor.id(),
            replaced,
            delta: result.delta,
        });

        tracing::debug!(
            %kind,
            direction = ?result.direction,
            delta = result.delta,
            range = %replaced,
            "toggled formatting"
        );
        Ok(result)
    }

    /// Whether a reselect is waiting for the next tick.
    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Run queued reselects. Call once per host tick, after the edits from
    /// the previous callback have been applied.
    ///
    /// Returns the last selection restored, if any.
    pub fn run_deferred<H: EditorHost>(&mut self, host: &mut H) -> Option<SelectionRange> {
        let mut restored = None;

        while let Some(reselect) = self.deferred.pop_front() {
            let Some(editor) = host.active_editor() else {
                let dropped = self.discard_deferred() + 1;
                tracing::debug!(reason = %Suppressed::NoActiveEditor, dropped, "reselect dropped");
                return None;
            };
            if editor.id() != reselect.editor {
                tracing::debug!(
                    queued_for = %reselect.editor,
                    active = %editor.id(),
                    "reselect dropped, editor changed"
                );
                continue;
            }

            let Some(end) = reselect.end(editor) else {
                tracing::debug!(line = reselect.replaced.to.line, "reselect target line is gone");
                continue;
            };

            let from = reselect.replaced.from;
            editor.set_selection(from, end);
            editor.focus();
            restored = Some(SelectionRange { from, to: end });
        }

        restored
    }

    /// Drop queued reselects without running them. Returns how many were dropped.
    pub fn discard_deferred(&mut self) -> usize {
        let dropped = self.deferred.len();
        self.deferred.clear();
        dropped
    }
}
