//! Floating toolbar model.
//!
//! Tracks whether the toolbar exists (mounted) and, if so, whether it is
//! shown and where. Rendering is left to the host; this only decides what
//! should be on screen.

use crate::config::ToolbarConfig;
use crate::format::{FormattingKind, FormattingState};

/// Screen rectangle in CSS pixels, viewport-relative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the toolbar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visibility {
    Hidden,
    /// Shown above `anchor`. `position` stays `None` until the rendered
    /// toolbar has reported its size.
    Shown {
        anchor: Rect,
        position: Option<Point>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarState {
    Unmounted,
    Mounted {
        /// Increments on every mount, so hosts can tell a fresh instance apart.
        instance: u64,
        visibility: Visibility,
    },
}

/// One toolbar button as the host should draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonView {
    pub kind: FormattingKind,
    pub title: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Toolbar {
    state: ToolbarState,
    mounts: u64,
    gap: f64,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self::new(&ToolbarConfig::default())
    }
}

impl Toolbar {
    pub fn new(config: &ToolbarConfig) -> Self {
        Self {
            state: ToolbarState::Unmounted,
            mounts: 0,
            gap: config.gap,
        }
    }

    pub fn state(&self) -> ToolbarState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, ToolbarState::Mounted { .. })
    }

    pub fn is_visible(&self) -> bool {
        matches!(
            self.state,
            ToolbarState::Mounted {
                visibility: Visibility::Shown { .. },
                ..
            }
        )
    }

    /// Final position, once placed.
    pub fn position(&self) -> Option<Point> {
        match self.state {
            ToolbarState::Mounted {
                visibility: Visibility::Shown { position, .. },
                ..
            } => position,
            _ => None,
        }
    }

    /// Create a fresh, hidden toolbar instance, replacing any existing one.
    pub fn mount(&mut self) -> u64 {
        self.mounts += 1;
        if self.is_mounted() {
            tracing::debug!(instance = self.mounts, "replacing mounted toolbar");
        } else {
            tracing::debug!(instance = self.mounts, "toolbar mounted");
        }
        self.state = ToolbarState::Mounted {
            instance: self.mounts,
            visibility: Visibility::Hidden,
        };
        self.mounts
    }

    /// Tear the toolbar down. Returns whether it was mounted.
    pub fn unmount(&mut self) -> bool {
        let was_mounted = self.is_mounted();
        if was_mounted {
            tracing::debug!("toolbar unmounted");
        }
        self.state = ToolbarState::Unmounted;
        was_mounted
    }

    /// Show the toolbar for a selection bounded by `anchor`.
    ///
    /// The position is computed later by [`Toolbar::place`], once the host
    /// knows the rendered size. Returns `false` if there is no toolbar.
    pub fn show(&mut self, anchor: Rect) -> bool {
        match &mut self.state {
            ToolbarState::Mounted { visibility, .. } => {
                *visibility = Visibility::Shown {
                    anchor,
                    position: None,
                };
                true
            }
            ToolbarState::Unmounted => false,
        }
    }

    pub fn hide(&mut self) {
        if let ToolbarState::Mounted { visibility, .. } = &mut self.state {
            *visibility = Visibility::Hidden;
        }
    }

    /// Position the shown toolbar now that its rendered size is known.
    ///
    /// A no-op returning `None` if the toolbar was hidden or unmounted in
    /// the meantime.
    pub fn place(&mut self, size: Size) -> Option<Point> {
        let gap = self.gap;
        match &mut self.state {
            ToolbarState::Mounted {
                visibility: Visibility::Shown { anchor, position },
                ..
            } => {
                let point = placement(*anchor, size, gap);
                *position = Some(point);
                Some(point)
            }
            _ => None,
        }
    }

    /// Buttons in display order, with their active flags.
    pub fn buttons(state: &FormattingState) -> [ButtonView; 4] {
        FormattingKind::ALL.map(|kind| ButtonView {
            kind,
            title: kind.title(),
            active: state.get(kind),
        })
    }
}

/// Centre the toolbar horizontally over `anchor`, `gap` pixels above it.
pub fn placement(anchor: Rect, size: Size, gap: f64) -> Point {
    Point {
        left: anchor.left + anchor.width / 2.0 - size.width / 2.0,
        top: anchor.top - gap - size.height,
    }
}
