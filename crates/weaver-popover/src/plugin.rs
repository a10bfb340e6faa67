//! Plugin entry point: owns the toolbar and the controller and routes host
//! lifecycle events to them.
//!
//! There is exactly one `SelectionPopover` per host session. Whatever needs
//! the toolbar goes through it rather than through global state.

use crate::config::PopoverConfig;
use crate::controller::SelectionController;
use crate::editor::EditorHost;
use crate::format::{Formatter, FormattingKind};
use crate::toolbar::{ButtonView, Rect, Size, Toolbar};

/// Kind of view focused in the host workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewKind {
    Markdown,
    #[default]
    Other,
}

/// Mode of a markdown view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Editable markdown source.
    Source,
    /// Rendered, read-only.
    Preview,
}

/// The host's document selection at the moment it changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub text: String,
    pub collapsed: bool,
    /// Bounding box of the selection on screen.
    pub bounds: Rect,
}

impl SelectionSnapshot {
    /// Whether the toolbar has anything to act on.
    fn is_blank(&self) -> bool {
        self.collapsed || self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A different view took focus.
    ActiveViewChanged(ViewKind),
    /// The workspace layout changed; `view` and `mode` describe the focused view.
    LayoutChanged { view: ViewKind, mode: EditorMode },
    /// The document selection or caret moved.
    SelectionChanged(SelectionSnapshot),
    /// A toolbar button was activated.
    ToggleRequested(FormattingKind),
    /// The shown toolbar finished rendering at this size.
    ToolbarRendered(Size),
    /// The host's event loop came back around; deferred work may run.
    Tick,
    Unload,
}

#[derive(Debug)]
pub struct SelectionPopover {
    toolbar: Toolbar,
    controller: SelectionController,
    active_view: ViewKind,
}

impl SelectionPopover {
    pub fn new(config: &PopoverConfig) -> Self {
        tracing::info!("loading selection popover");
        Self {
            toolbar: Toolbar::new(&config.toolbar),
            controller: SelectionController::new(Formatter::new(&config.format)),
            active_view: ViewKind::default(),
        }
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn active_view(&self) -> ViewKind {
        self.active_view
    }

    /// Buttons for the toolbar as it should currently be drawn.
    pub fn buttons(&self) -> [ButtonView; 4] {
        Toolbar::buttons(&self.controller.state())
    }

    pub fn handle<H: EditorHost>(&mut self, host: &mut H, event: HostEvent) {
        match event {
            HostEvent::ActiveViewChanged(view) => {
                self.active_view = view;
                // A pending reselect belongs to the view being left.
                let dropped = self.controller.discard_deferred();
                if dropped > 0 {
                    tracing::debug!(dropped, "active view changed, dropping deferred reselect");
                }
                if view != ViewKind::Markdown {
                    self.toolbar.unmount();
                }
            }
            HostEvent::LayoutChanged { view, mode } => {
                self.active_view = view;
                match (view, mode) {
                    (ViewKind::Markdown, EditorMode::Source) => {
                        self.toolbar.mount();
                    }
                    (ViewKind::Markdown, EditorMode::Preview) => {
                        self.toolbar.unmount();
                    }
                    (ViewKind::Other, _) => {}
                }
            }
            HostEvent::SelectionChanged(snapshot) => self.selection_changed(host, &snapshot),
            HostEvent::ToggleRequested(kind) => {
                if self.toolbar.is_mounted() {
                    self.controller.on_toggle_requested(host, kind);
                } else {
                    tracing::debug!(%kind, "toggle requested without a toolbar");
                }
            }
            HostEvent::ToolbarRendered(size) => {
                self.toolbar.place(size);
            }
            HostEvent::Tick => {
                if self.toolbar.is_mounted() {
                    self.controller.run_deferred(host);
                } else if self.controller.has_deferred() {
                    let dropped = self.controller.discard_deferred();
                    tracing::debug!(dropped, "toolbar gone, dropping deferred reselect");
                }
            }
            HostEvent::Unload => {
                tracing::info!("unloading selection popover");
                self.toolbar.unmount();
                self.controller.discard_deferred();
            }
        }
    }

    fn selection_changed<H: EditorHost>(&mut self, host: &mut H, snapshot: &SelectionSnapshot) {
        if self.toolbar.is_mounted() {
            self.controller.on_selection_observed(host);
        }

        if snapshot.is_blank() {
            self.toolbar.hide();
            return;
        }
        if self.active_view != ViewKind::Markdown {
            return;
        }
        self.toolbar.show(snapshot.bounds);
    }
}

impl Default for SelectionPopover {
    fn default() -> Self {
        Self::new(&PopoverConfig::default())
    }
}
