//! weaver-popover: selection toolbar logic for markdown editors.
//!
//! This crate provides:
//! - `Formatter` - detects and toggles inline markdown formatting on a fragment
//! - `HostEditor` / `EditorHost` traits for the editor the popover is attached to
//! - `RopeEditor` - ropey-backed host editor for local use and tests
//! - `SelectionController` - bridges selection events and toggle commands to the host
//! - `Toolbar` / `SelectionPopover` - floating toolbar lifecycle, all framework-agnostic

pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod format;
pub mod plugin;
pub mod rope;
pub mod toolbar;

pub use smol_str::SmolStr;

pub use config::{FormatConfig, ItalicMarker, PopoverConfig, ToolbarConfig};
pub use controller::SelectionController;
pub use editor::{CursorSide, EditorHost, EditorId, HostEditor, Position, SelectionRange};
pub use error::{PopoverError, Suppressed};
pub use format::{
    Formatter, FormattingKind, FormattingState, ToggleDirection, ToggleResult, classify, toggle,
};
pub use plugin::{EditorMode, HostEvent, SelectionPopover, SelectionSnapshot, ViewKind};
pub use rope::{RopeEditor, Selection};
pub use toolbar::{ButtonView, Point, Rect, Size, Toolbar, ToolbarState, Visibility, placement};
