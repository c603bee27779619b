//! Shared helpers for unit tests.

use crate::editing::{Cmd, Editor, Selection};
use crate::model::{Document, Position};

pub fn doc_from(markup: &str) -> Document {
    Document::from_markup(markup)
}

pub fn markup_of(editor: &Editor) -> String {
    editor.document().to_markup()
}

/// An editor over `markup` with a collapsed caret at `path`/`offset`.
pub fn editor_at(markup: &str, path: Vec<usize>, offset: usize) -> Editor {
    let mut editor = Editor::new(doc_from(markup));
    let wanted = Selection::caret(Position::new(path, offset));
    let actual = editor.set_selection(wanted.clone()).clone();
    assert_eq!(actual, wanted, "caret does not resolve in {markup}");
    editor
}

pub fn type_text(editor: &mut Editor, text: &str) {
    editor.apply(Cmd::InsertText {
        text: text.to_string(),
    });
}
