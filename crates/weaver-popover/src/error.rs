//! Error types for the popover.

use std::path::PathBuf;

use miette::Diagnostic;

use crate::format::FormattingKind;

/// Errors from loading configuration or interpreting user input.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum PopoverError {
    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(popover::config::read))]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file")]
    #[diagnostic(
        code(popover::config::parse),
        help("see the `[toolbar]` and `[format]` tables in the README")
    )]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid position `{0}`")]
    #[diagnostic(
        code(popover::position),
        help("positions are zero-based LINE:CH, e.g. `2:14`")
    )]
    InvalidPosition(String),

    #[error("position {line}:{ch} is outside the document")]
    #[diagnostic(code(popover::position::range))]
    PositionOutOfRange { line: usize, ch: usize },

    #[error("unknown formatting kind `{0}`")]
    #[diagnostic(
        code(popover::kind),
        help("expected one of: bold, italic, strikeout, highlight")
    )]
    UnknownKind(String),
}

/// Reasons an action quietly does nothing.
///
/// These are normal idle states of a UI, not failures, so they are logged
/// and never handed back to the host.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppressed {
    #[error("no active editor")]
    NoActiveEditor,

    #[error("selection is empty")]
    EmptySelection,

    #[error("{0} markers detected but none could be removed")]
    MalformedMarkerState(FormattingKind),
}
