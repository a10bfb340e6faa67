//! Controller behaviour against a host editor that records every call.

use std::cell::RefCell;

use smol_str::SmolStr;

use super::SelectionController;
use crate::editor::{CursorSide, EditorHost, EditorId, HostEditor, Position, SelectionRange};
use crate::format::{FormattingKind, ToggleDirection};
use crate::rope::RopeEditor;

/// Wraps a `RopeEditor` and logs each trait call in order.
struct RecordingEditor {
    inner: RopeEditor,
    calls: RefCell<Vec<String>>,
}

impl RecordingEditor {
    fn new(content: &str, from: Position, to: Position) -> Self {
        let mut inner = RopeEditor::from_str(content);
        inner.set_selection(from, to);
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn log(&self) -> String {
        self.calls.borrow().join("\n")
    }

    fn take_log(&self) -> String {
        let log = self.log();
        self.calls.borrow_mut().clear();
        log
    }

    fn mutations(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("replace_range") || c.starts_with("set_selection"))
            .count()
    }
}

impl HostEditor for RecordingEditor {
    fn id(&self) -> EditorId {
        self.inner.id()
    }

    fn selection(&self) -> SmolStr {
        self.record("selection".into());
        self.inner.selection()
    }

    fn cursor(&self, side: CursorSide) -> Position {
        self.record(format!("cursor({side:?})"));
        self.inner.cursor(side)
    }

    fn line(&self, line: usize) -> Option<SmolStr> {
        self.record(format!("line({line})"));
        self.inner.line(line)
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        self.record(format!("replace_range({text:?}, {from}, {to})"));
        self.inner.replace_range(text, from, to);
    }

    fn set_selection(&mut self, from: Position, to: Position) {
        self.record(format!("set_selection({from}, {to})"));
        self.inner.set_selection(from, to);
    }

    fn focus(&mut self) {
        self.record("focus".into());
        self.inner.focus();
    }
}

fn host(content: &str, from: (usize, usize), to: (usize, usize)) -> Option<RecordingEditor> {
    Some(RecordingEditor::new(
        content,
        Position::new(from.0, from.1),
        Position::new(to.0, to.1),
    ))
}

fn editor(host: &Option<RecordingEditor>) -> &RecordingEditor {
    host.as_ref().unwrap()
}

/// Several open editors, one of which is active.
struct Workspace {
    editors: Vec<RecordingEditor>,
    active: usize,
}

impl EditorHost for Workspace {
    type Editor = RecordingEditor;

    fn active_editor(&mut self) -> Option<&mut RecordingEditor> {
        self.editors.get_mut(self.active)
    }
}

#[test]
fn test_observe_publishes_state() {
    let mut host = host("say **hi** there", (0, 4), (0, 10));
    let mut controller = SelectionController::default();

    let state = controller.on_selection_observed(&mut host).unwrap();
    assert!(state.get(FormattingKind::Bold));
    assert!(!state.get(FormattingKind::Italic));
    assert_eq!(controller.state(), state);
    assert_eq!(editor(&host).log(), "selection");
}

#[test]
fn test_observe_without_editor_keeps_state() {
    let mut with_editor = host("**hi**", (0, 0), (0, 6));
    let mut controller = SelectionController::default();
    controller.on_selection_observed(&mut with_editor);

    let mut none: Option<RecordingEditor> = None;
    assert_eq!(controller.on_selection_observed(&mut none), None);
    assert!(controller.state().get(FormattingKind::Bold));
}

#[test]
fn test_toggle_single_line() {
    let mut host = host("hello word here", (0, 6), (0, 10));
    let mut controller = SelectionController::default();

    let result = controller
        .on_toggle_requested(&mut host, FormattingKind::Bold)
        .unwrap();
    assert_eq!(result.text, "**word**");
    assert_eq!(result.delta, 4);

    insta::assert_snapshot!(editor(&host).take_log(), @r#"
    selection
    focus
    selection
    cursor(From)
    cursor(To)
    replace_range("**word**", 0:6, 0:10)
    "#);
    assert!(controller.has_deferred());

    let restored = controller.run_deferred(&mut host).unwrap();
    assert_eq!(
        restored,
        SelectionRange::new(Position::new(0, 6), Position::new(0, 14))
    );
    insta::assert_snapshot!(editor(&host).take_log(), @r"
    set_selection(0:6, 0:14)
    focus
    ");

    let editor = editor(&host);
    assert_eq!(editor.inner.content(), "hello **word** here");
    assert_eq!(editor.inner.selection(), "**word**");
    assert!(!controller.has_deferred());
}

#[test]
fn test_toggle_removal_shrinks_selection() {
    let mut host = host("a ~~gone~~ b", (0, 2), (0, 10));
    let mut controller = SelectionController::default();

    let result = controller
        .on_toggle_requested(&mut host, FormattingKind::Strikeout)
        .unwrap();
    assert_eq!(result.direction, ToggleDirection::Removed);
    assert_eq!(result.delta, -4);

    let restored = controller.run_deferred(&mut host).unwrap();
    assert_eq!(restored.to, Position::new(0, 6));
    assert_eq!(editor(&host).inner.content(), "a gone b");
    assert_eq!(editor(&host).inner.selection(), "gone");
}

#[test]
fn test_multiline_toggle_snaps_to_line_length() {
    let content = "zero\none\nalpha beta\ngamma\ndelta epsilon\ntail";
    let mut host = host(content, (2, 6), (4, 5));
    let mut controller = SelectionController::default();

    let result = controller
        .on_toggle_requested(&mut host, FormattingKind::Highlight)
        .unwrap();
    assert_eq!(result.text, "==beta\ngamma\ndelta==");
    editor(&host).take_log();

    let restored = controller.run_deferred(&mut host).unwrap();
    // Length of "delta== epsilon", not 5 + 4.
    assert_eq!(restored.to, Position::new(4, 15));
    insta::assert_snapshot!(editor(&host).log(), @r"
    line(4)
    set_selection(2:6, 4:15)
    focus
    ");
    assert_eq!(
        editor(&host).inner.content(),
        "zero\none\nalpha ==beta\ngamma\ndelta== epsilon\ntail"
    );
}

#[test]
fn test_empty_selection_makes_no_mutating_calls() {
    let mut host = host("hello", (0, 2), (0, 2));
    let mut controller = SelectionController::default();

    assert_eq!(
        controller.on_toggle_requested(&mut host, FormattingKind::Italic),
        None
    );
    assert_eq!(controller.run_deferred(&mut host), None);
    assert_eq!(editor(&host).mutations(), 0);
    assert_eq!(editor(&host).log(), "selection");
    assert_eq!(editor(&host).inner.content(), "hello");
}

#[test]
fn test_no_editor_is_a_no_op() {
    let mut none: Option<RecordingEditor> = None;
    let mut controller = SelectionController::default();
    assert_eq!(
        controller.on_toggle_requested(&mut none, FormattingKind::Bold),
        None
    );
    assert!(!controller.has_deferred());
}

#[test]
fn test_malformed_markers_leave_document_alone() {
    let mut host = host("x _a* y", (0, 2), (0, 5));
    let mut controller = SelectionController::default();

    assert_eq!(
        controller.on_toggle_requested(&mut host, FormattingKind::Italic),
        None
    );
    assert_eq!(editor(&host).mutations(), 0);
    assert_eq!(editor(&host).inner.content(), "x _a* y");
}

#[test]
fn test_reselect_dropped_when_editor_goes_away() {
    let mut host = host("word", (0, 0), (0, 4));
    let mut controller = SelectionController::default();
    controller.on_toggle_requested(&mut host, FormattingKind::Highlight);
    assert!(controller.has_deferred());

    let mut gone: Option<RecordingEditor> = None;
    assert_eq!(controller.run_deferred(&mut gone), None);
    assert!(!controller.has_deferred());

    // The original editor never sees the stale reselect.
    assert_eq!(controller.run_deferred(&mut host), None);
    assert_eq!(editor(&host).inner.content(), "==word==");
}

#[test]
fn test_reselect_triggers_fresh_classification() {
    let mut host = host("word", (0, 0), (0, 4));
    let mut controller = SelectionController::default();

    controller.on_selection_observed(&mut host);
    assert!(!controller.state().get(FormattingKind::Italic));

    controller.on_toggle_requested(&mut host, FormattingKind::Italic);
    controller.run_deferred(&mut host);
    let state = controller.on_selection_observed(&mut host).unwrap();
    assert!(state.get(FormattingKind::Italic));
    assert_eq!(editor(&host).inner.selection(), "_word_");
}

#[test]
fn test_reselect_skipped_in_another_editor() {
    let mut workspace = Workspace {
        editors: vec![
            RecordingEditor::new("word", Position::new(0, 0), Position::new(0, 4)),
            RecordingEditor::new("other document", Position::new(0, 2), Position::new(0, 2)),
        ],
        active: 0,
    };
    let mut controller = SelectionController::default();
    controller.on_toggle_requested(&mut workspace, FormattingKind::Bold);
    assert!(controller.has_deferred());

    workspace.active = 1;
    assert_eq!(controller.run_deferred(&mut workspace), None);
    assert!(!controller.has_deferred());

    let [a, b] = &workspace.editors[..] else {
        panic!("expected two editors");
    };
    assert_eq!(b.mutations(), 0);
    assert_eq!(b.inner.selection(), "");
    assert_eq!(a.inner.content(), "**word**");
    assert_eq!(a.inner.selection(), "");

    // Going back later does not revive it.
    workspace.active = 0;
    assert_eq!(controller.run_deferred(&mut workspace), None);
}

#[test]
fn test_reselect_lands_in_the_edited_editor() {
    let mut workspace = Workspace {
        editors: vec![
            RecordingEditor::new("first", Position::new(0, 0), Position::new(0, 0)),
            RecordingEditor::new("word", Position::new(0, 0), Position::new(0, 4)),
        ],
        active: 1,
    };
    let mut controller = SelectionController::default();
    controller.on_toggle_requested(&mut workspace, FormattingKind::Strikeout);

    let restored = controller.run_deferred(&mut workspace).unwrap();
    assert_eq!(restored.to, Position::new(0, 8));
    assert_eq!(workspace.editors[1].inner.selection(), "~~word~~");
    assert_eq!(workspace.editors[0].mutations(), 0);
}
