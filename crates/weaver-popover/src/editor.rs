//! Host editor contract.
//!
//! The popover never owns the document. Everything it reads or writes goes
//! through `HostEditor`, and every read is fresh: nothing about the editor
//! is cached between calls.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::error::PopoverError;

/// A location in editor coordinates.
///
/// `ch` counts chars (Unicode scalar values) from the start of the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

impl FromStr for Position {
    type Err = PopoverError;

    /// Parse `LINE:CH`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PopoverError::InvalidPosition(s.to_string());
        let (line, ch) = s.trim().split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            line: line.parse().map_err(|_| invalid())?,
            ch: ch.parse().map_err(|_| invalid())?,
        })
    }
}

/// Which end of the selection to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorSide {
    /// The textually earlier boundary.
    From,
    /// The textually later boundary.
    To,
}

/// An ordered selection range in editor coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionRange {
    pub from: Position,
    pub to: Position,
}

impl SelectionRange {
    /// Build a range, swapping the ends if `to` precedes `from`.
    pub fn new(from: Position, to: Position) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.from.line == self.to.line
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Identity of one open editor, stable for as long as the editor lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorId(pub u64);

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "editor#{}", self.0)
    }
}

/// The document-editing surface the popover drives.
pub trait HostEditor {
    /// Which editor this is. Two editors showing different documents must
    /// never share an id.
    fn id(&self) -> EditorId;

    /// Currently selected text, empty if nothing is selected.
    fn selection(&self) -> SmolStr;

    /// One boundary of the current selection.
    fn cursor(&self, side: CursorSide) -> Position;

    /// Full text of a line without its line break. `None` if the line does
    /// not exist.
    fn line(&self, line: usize) -> Option<SmolStr>;

    /// Replace `[from, to)` with `text`. The span may cover several lines.
    fn replace_range(&mut self, text: &str, from: Position, to: Position);

    /// Set the active selection.
    fn set_selection(&mut self, from: Position, to: Position);

    /// Give the editor input focus.
    fn focus(&mut self);

    /// Both selection boundaries.
    fn selection_range(&self) -> SelectionRange {
        SelectionRange {
            from: self.cursor(CursorSide::From),
            to: self.cursor(CursorSide::To),
        }
    }
}

/// Access to whichever editor currently has focus in the host application.
pub trait EditorHost {
    type Editor: HostEditor;

    /// The active compatible editor, or `None` while none is focused.
    fn active_editor(&mut self) -> Option<&mut Self::Editor>;
}

/// A slot that may or may not hold an editor; handy for single-editor hosts.
impl<E: HostEditor> EditorHost for Option<E> {
    type Editor = E;

    fn active_editor(&mut self) -> Option<&mut E> {
        self.as_mut()
    }
}
