use serde::{Deserialize, Serialize};

use crate::model::{Document, NodePath, Position};

/// Caret or range inside a document. Collapsed when anchor equals focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos.clone(),
            focus: pos,
        }
    }

    pub fn range(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Both ends address existing containers and offsets.
    pub fn resolves(&self, doc: &Document) -> bool {
        doc.resolves(&self.anchor) && doc.resolves(&self.focus)
    }

    /// Start and end in document order.
    pub fn ordered(&self, doc: &Document) -> Option<(Position, Position)> {
        let anchor = doc.order_of(&self.anchor)?;
        let focus = doc.order_of(&self.focus)?;
        if anchor <= focus {
            Some((self.anchor.clone(), self.focus.clone()))
        } else {
            Some((self.focus.clone(), self.anchor.clone()))
        }
    }
}

/// Host-facing form of a selection, with paths as plain index lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    pub anchor_path: Vec<usize>,
    pub anchor_offset: usize,
    pub focus_path: Vec<usize>,
    pub focus_offset: usize,
}

impl From<&Selection> for SelectionSnapshot {
    fn from(sel: &Selection) -> Self {
        Self {
            anchor_path: sel.anchor.path.as_slice().to_vec(),
            anchor_offset: sel.anchor.offset,
            focus_path: sel.focus.path.as_slice().to_vec(),
            focus_offset: sel.focus.offset,
        }
    }
}

impl From<SelectionSnapshot> for Selection {
    fn from(snap: SelectionSnapshot) -> Self {
        Self {
            anchor: Position::new(NodePath::new(snap.anchor_path), snap.anchor_offset),
            focus: Position::new(NodePath::new(snap.focus_path), snap.focus_offset),
        }
    }
}

/// Remembers the last caret/range so it survives focus moving to a menu,
/// picker or dialog.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    captured: Option<Selection>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capture(&mut self, selection: Selection) {
        log::trace!("capture selection {selection:?}");
        self.captured = Some(selection);
    }

    /// The last captured selection, or the end of the document when nothing
    /// was captured or the capture no longer resolves.
    pub fn restore(&self, doc: &Document) -> Selection {
        match &self.captured {
            Some(sel) if sel.resolves(doc) => sel.clone(),
            Some(sel) => {
                log::debug!("captured selection {sel:?} no longer resolves, using end of document");
                Selection::caret(doc.end_position())
            }
            None => Selection::caret(doc.end_position()),
        }
    }

    /// Drops the capture after a structural change.
    pub fn invalidate(&mut self) {
        self.captured = None;
    }

    pub fn snapshot(&self) -> Option<&Selection> {
        self.captured.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Inline};
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document::from_blocks(vec![
            Block::Paragraph(vec![Inline::text("hello")]),
            Block::Paragraph(vec![Inline::text("world")]),
        ])
    }

    #[test]
    fn capture_then_restore_round_trips() {
        let doc = doc();
        let sel = Selection::range(Position::new(vec![1], 4), Position::new(vec![0], 2));
        let mut tracker = SelectionTracker::new();
        tracker.capture(sel.clone());
        assert_eq!(tracker.restore(&doc), sel);
    }

    #[test]
    fn restore_falls_back_to_end_of_document() {
        let doc = doc();
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.restore(&doc), Selection::caret(Position::new(vec![1], 5)));

        tracker.capture(Selection::caret(Position::new(vec![7], 0)));
        assert_eq!(tracker.restore(&doc), Selection::caret(Position::new(vec![1], 5)));

        tracker.capture(Selection::caret(Position::new(vec![0], 1)));
        tracker.invalidate();
        assert!(tracker.snapshot().is_none());
    }

    #[test]
    fn ordered_sorts_by_document_order() {
        let doc = doc();
        let sel = Selection::range(Position::new(vec![1], 1), Position::new(vec![0], 3));
        let (start, end) = sel.ordered(&doc).unwrap();
        assert_eq!(start, Position::new(vec![0], 3));
        assert_eq!(end, Position::new(vec![1], 1));
    }

    #[test]
    fn snapshot_uses_camel_case_fields() {
        let sel = Selection::caret(Position::new(vec![0, 1], 2));
        let snap = SelectionSnapshot::from(&sel);
        assert_eq!(snap.anchor_path, vec![0, 1]);
        assert_eq!(Selection::from(snap), sel);
    }
}
