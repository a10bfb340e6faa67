//! Inline formatting detection and toggling.
//!
//! Classification is pattern matching on the selected text, not a markdown
//! parse. It tolerates selections that include the marker characters but
//! reach slightly past them into surrounding nesting, since its only
//! consumers are the toolbar's active indicators and the toggle direction.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{FormatConfig, ItalicMarker};
use crate::error::{PopoverError, Suppressed};

// Wrapped checks: `.` does not cross line breaks, so a multi-line fragment
// can only classify through the pair count.
static BOLD_WRAPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\*\*|__)(.*?)(\*\*|__)$").unwrap());
static STRIKEOUT_WRAPPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^~~(.*?)~~$").unwrap());
static HIGHLIGHT_WRAPPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^==(.*?)==$").unwrap());
static ITALIC_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_*].*[_*]").unwrap());

// Removal patterns do cross line breaks, so anything the pair count
// classifies as formatted can also be unwrapped.
static BOLD_ASTERISK_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\*\*(.*?)\*\*").unwrap());
static BOLD_UNDERSCORE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)__(.*?)__").unwrap());
static STRIKEOUT_PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)~~(.*?)~~").unwrap());
static HIGHLIGHT_PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)==(.*?)==").unwrap());

/// Inline formatting the toolbar can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormattingKind {
    Bold,
    Italic,
    Strikeout,
    Highlight,
}

impl FormattingKind {
    /// All kinds, in toolbar order.
    pub const ALL: [FormattingKind; 4] = [
        FormattingKind::Bold,
        FormattingKind::Italic,
        FormattingKind::Strikeout,
        FormattingKind::Highlight,
    ];

    /// Width of one marker, in chars.
    pub const fn marker_width(self) -> usize {
        match self {
            FormattingKind::Italic => 1,
            FormattingKind::Bold | FormattingKind::Strikeout | FormattingKind::Highlight => 2,
        }
    }

    /// Chars added by wrapping a fragment in one marker pair.
    ///
    /// Bold, strikeout and highlight are 4, italic is 2.
    pub const fn pair_width(self) -> isize {
        (self.marker_width() * 2) as isize
    }

    /// Lowercase identifier, as used in config and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            FormattingKind::Bold => "bold",
            FormattingKind::Italic => "italic",
            FormattingKind::Strikeout => "strikeout",
            FormattingKind::Highlight => "highlight",
        }
    }

    /// Human-readable button title.
    pub const fn title(self) -> &'static str {
        match self {
            FormattingKind::Bold => "Bold",
            FormattingKind::Italic => "Italic",
            FormattingKind::Strikeout => "Strikeout",
            FormattingKind::Highlight => "Highlight",
        }
    }
}

impl fmt::Display for FormattingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormattingKind {
    type Err = PopoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bold" => Ok(FormattingKind::Bold),
            "italic" => Ok(FormattingKind::Italic),
            "strikeout" | "strikethrough" => Ok(FormattingKind::Strikeout),
            "highlight" => Ok(FormattingKind::Highlight),
            _ => Err(PopoverError::UnknownKind(s.to_string())),
        }
    }
}

/// Which way a toggle went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDirection {
    /// Markers were wrapped around the fragment.
    Added,
    /// Marker pairs were stripped from the fragment.
    Removed,
    /// The fragment classified as formatted but had no pair to strip.
    Unchanged,
}

/// Replacement text produced by a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleResult {
    /// Text that replaces the selection.
    pub text: String,
    /// `chars(text) - chars(original)`. Equals `±kind.pair_width()` whenever
    /// exactly one marker pair was added or removed.
    pub delta: isize,
    pub direction: ToggleDirection,
}

impl ToggleResult {
    fn new(original: &str, text: String, direction: ToggleDirection) -> Self {
        let delta = text.chars().count() as isize - original.chars().count() as isize;
        Self {
            text,
            delta,
            direction,
        }
    }

    fn unchanged(original: &str) -> Self {
        Self {
            text: original.to_string(),
            delta: 0,
            direction: ToggleDirection::Unchanged,
        }
    }
}

/// Detected formatting for every kind, derived from one fragment.
///
/// Only `Formatter::state` builds one, so a state always reflects the text
/// it was computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormattingState {
    bold: bool,
    italic: bool,
    strikeout: bool,
    highlight: bool,
}

impl FormattingState {
    pub fn get(&self, kind: FormattingKind) -> bool {
        match kind {
            FormattingKind::Bold => self.bold,
            FormattingKind::Italic => self.italic,
            FormattingKind::Strikeout => self.strikeout,
            FormattingKind::Highlight => self.highlight,
        }
    }

    /// Iterate `(kind, active)` pairs in toolbar order.
    pub fn iter(&self) -> impl Iterator<Item = (FormattingKind, bool)> + '_ {
        FormattingKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// Whether any kind is active.
    pub fn any(&self) -> bool {
        self.bold || self.italic || self.strikeout || self.highlight
    }

    fn set(&mut self, kind: FormattingKind, active: bool) {
        match kind {
            FormattingKind::Bold => self.bold = active,
            FormattingKind::Italic => self.italic = active,
            FormattingKind::Strikeout => self.strikeout = active,
            FormattingKind::Highlight => self.highlight = active,
        }
    }
}

/// Stateless formatting engine.
///
/// The only configurable part is which marker italic emits when added;
/// classification and removal accept both `*` and `_` regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Formatter {
    italic_marker: ItalicMarker,
}

impl Formatter {
    pub fn new(config: &FormatConfig) -> Self {
        Self {
            italic_marker: config.italic_marker,
        }
    }

    /// Marker emitted on each side when `kind` is added.
    pub fn marker(&self, kind: FormattingKind) -> &'static str {
        match kind {
            FormattingKind::Bold => "**",
            FormattingKind::Italic => self.italic_marker.as_str(),
            FormattingKind::Strikeout => "~~",
            FormattingKind::Highlight => "==",
        }
    }

    /// Whether `text` should be treated as already carrying `kind`.
    pub fn classify(&self, text: &str, kind: FormattingKind) -> bool {
        if text.is_empty() {
            return false;
        }

        let formatted = match kind {
            FormattingKind::Bold => BOLD_WRAPPED.is_match(text) || has_one_pair(text, "**"),
            FormattingKind::Italic => {
                // `**` would otherwise count as two italic markers.
                !text.contains("**")
                    && text.chars().filter(|c| matches!(c, '*' | '_')).count() == 2
                    && ITALIC_SPAN.is_match(text)
            }
            FormattingKind::Strikeout => {
                STRIKEOUT_WRAPPED.is_match(text) || has_one_pair(text, "~~")
            }
            FormattingKind::Highlight => {
                HIGHLIGHT_WRAPPED.is_match(text) || has_one_pair(text, "==")
            }
        };

        tracing::trace!(%kind, len = text.len(), formatted, "classified fragment");
        formatted
    }

    /// Classify `text` for every kind.
    pub fn state(&self, text: &str) -> FormattingState {
        let mut state = FormattingState::default();
        for kind in FormattingKind::ALL {
            state.set(kind, self.classify(text, kind));
        }
        state
    }

    /// Add or remove `kind` on `text`, depending on how it classifies.
    ///
    /// Removal strips every marker pair of the kind and leaves other
    /// formatting alone. Adding wraps the whole fragment.
    pub fn toggle(&self, text: &str, kind: FormattingKind) -> ToggleResult {
        if !self.classify(text, kind) {
            let marker = self.marker(kind);
            return ToggleResult::new(
                text,
                format!("{marker}{text}{marker}"),
                ToggleDirection::Added,
            );
        }

        let stripped = strip_pairs(text, kind);
        if stripped == text {
            tracing::warn!(
                reason = %Suppressed::MalformedMarkerState(kind),
                "fragment classified as formatted but no marker pair was found"
            );
            return ToggleResult::unchanged(text);
        }
        ToggleResult::new(text, stripped, ToggleDirection::Removed)
    }
}

/// Classify with the default formatter.
pub fn classify(text: &str, kind: FormattingKind) -> bool {
    Formatter::default().classify(text, kind)
}

/// Toggle with the default formatter.
pub fn toggle(text: &str, kind: FormattingKind) -> ToggleResult {
    Formatter::default().toggle(text, kind)
}

/// Exactly two non-overlapping occurrences of `marker`.
fn has_one_pair(text: &str, marker: &str) -> bool {
    text.matches(marker).count() == 2
}

fn strip_pairs(text: &str, kind: FormattingKind) -> String {
    match kind {
        FormattingKind::Bold => {
            let asterisks = BOLD_ASTERISK_PAIR.replace_all(text, "$1");
            BOLD_UNDERSCORE_PAIR.replace_all(&asterisks, "$1").into_owned()
        }
        FormattingKind::Italic => strip_single_pairs(&strip_single_pairs(text, '*'), '_'),
        FormattingKind::Strikeout => STRIKEOUT_PAIR.replace_all(text, "$1").into_owned(),
        FormattingKind::Highlight => HIGHLIGHT_PAIR.replace_all(text, "$1").into_owned(),
    }
}

/// Unwrap `m…m` spans where the opening `m` is not part of a doubled marker
/// and the closing `m` is not followed by another `m`. Doubled markers such
/// as `**` are left in place.
fn strip_single_pairs(text: &str, marker: char) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let opens = chars[i] == marker
            && (i == 0 || chars[i - 1] != marker)
            && chars.get(i + 1) != Some(&marker);

        if opens {
            let close = (i + 1..chars.len())
                .find(|&j| chars[j] == marker && chars.get(j + 1) != Some(&marker));
            if let Some(close) = close {
                out.extend(&chars[i + 1..close]);
                i = close + 1;
                continue;
            }
        }

        out.push(chars[i]);
        i += 1;
    }

    out
}
