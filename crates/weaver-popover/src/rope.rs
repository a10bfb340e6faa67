//! Ropey-backed host editor.
//!
//! `RopeEditor` implements `HostEditor` over an in-memory rope so the
//! popover can run without a GUI host (the CLI, tests).

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use ropey::{Rope, RopeSlice};
use smol_str::{SmolStr, ToSmolStr};

use crate::editor::{CursorSide, EditorId, HostEditor, Position};
use crate::error::PopoverError;

/// Text selection with anchor and head positions, as char offsets.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

static NEXT_EDITOR_ID: AtomicU64 = AtomicU64::new(1);

/// In-memory markdown editor with a single selection and a focus flag.
///
/// Each editor gets a fresh id when it is created. Clones keep the id of
/// the editor they were cloned from.
#[derive(Clone, Debug)]
pub struct RopeEditor {
    id: EditorId,
    rope: Rope,
    selection: Selection,
    focused: bool,
}

impl RopeEditor {
    pub fn from_str(s: &str) -> Self {
        Self {
            id: EditorId(NEXT_EDITOR_ID.fetch_add(1, Ordering::Relaxed)),
            rope: Rope::from_str(s),
            selection: Selection::default(),
            focused: false,
        }
    }

    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Select by char offsets, clamped to the document.
    pub fn select_offsets(&mut self, selection: Selection) {
        let max = self.rope.len_chars();
        self.selection = Selection::new(selection.anchor.min(max), selection.head.min(max));
    }

    /// Char offset of `pos`, clamping the line to the document and the
    /// column to the line's length.
    pub fn position_to_char(&self, pos: Position) -> usize {
        let line = pos.line.min(self.rope.len_lines().saturating_sub(1));
        let len = self.line_slice(line).map(|s| s.len_chars()).unwrap_or(0);
        self.rope.line_to_char(line) + pos.ch.min(len)
    }

    pub fn char_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }

    /// Reject positions past the end of their line or of the document.
    pub fn check_position(&self, pos: Position) -> Result<Position, PopoverError> {
        match self.line_slice(pos.line) {
            Some(line) if pos.ch <= line.len_chars() => Ok(pos),
            _ => Err(PopoverError::PositionOutOfRange {
                line: pos.line,
                ch: pos.ch,
            }),
        }
    }

    /// A line without its trailing line break.
    ///
    /// Strips every char ropey splits lines on, not just CR and LF.
    fn line_slice(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        while len > 0 && is_line_break(slice.char(len - 1)) {
            len -= 1;
        }
        Some(slice.slice(..len))
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

impl Default for RopeEditor {
    fn default() -> Self {
        Self::from_str("")
    }
}

impl HostEditor for RopeEditor {
    fn id(&self) -> EditorId {
        self.id
    }

    fn selection(&self) -> SmolStr {
        self.rope.slice(self.selection.to_range()).to_smolstr()
    }

    fn cursor(&self, side: CursorSide) -> Position {
        match side {
            CursorSide::From => self.char_to_position(self.selection.start()),
            CursorSide::To => self.char_to_position(self.selection.end()),
        }
    }

    fn line(&self, line: usize) -> Option<SmolStr> {
        self.line_slice(line).map(|s| s.to_smolstr())
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let a = self.position_to_char(from);
        let b = self.position_to_char(to);
        let (start, end) = (a.min(b), a.max(b));

        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.selection = Selection::collapsed(start + text.chars().count());

        tracing::trace!(start, end, inserted = text.len(), "replaced range");
    }

    fn set_selection(&mut self, from: Position, to: Position) {
        let anchor = self.position_to_char(from);
        let head = self.position_to_char(to);
        self.selection = Selection::new(anchor, head);
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}

impl From<&str> for RopeEditor {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}
