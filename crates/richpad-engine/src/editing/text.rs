//! Typing, Backspace and Enter outside list-specific behaviour.

use crate::editing::Editor;
use crate::model::inline::{self, Inline, TextRun};
use crate::model::{Block, Container, Position};

impl Editor {
    pub(crate) fn insert_text(&mut self, text: &str) -> bool {
        let deleted = self.delete_selection();
        if text.is_empty() {
            return deleted;
        }
        let caret = self.caret();
        let marks = match self.pending.take() {
            Some(marks) => marks,
            None => self.marks_at(&caret),
        };
        let run = Inline::Text(TextRun::marked(text, marks));
        self.insert_nodes(&caret, vec![run]) || deleted
    }

    /// Overwrites the selection, keeping the marks of its first unit.
    pub(crate) fn replace_selection(&mut self, text: &str) -> bool {
        let (start, _) = self.range();
        let marks = self.marks_at(&Position::new(start.path.clone(), start.offset + 1));
        let deleted = self.delete_selection();
        if text.is_empty() {
            return deleted;
        }
        let run = Inline::Text(TextRun::marked(text, marks));
        self.insert_nodes(&start, vec![run]) || deleted
    }

    pub(crate) fn delete_backward(&mut self) -> bool {
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }
        let caret = self.caret();
        if caret.offset > 0 {
            self.remove_in_container(&caret.path, caret.offset - 1..caret.offset);
            self.move_caret(caret.path, caret.offset - 1);
            return true;
        }
        if self.doc.list_item(&caret.path).is_some() {
            return self.backspace_in_list(&caret);
        }
        if caret.path.len() != 1 {
            // Start of a table cell.
            return false;
        }
        let b = caret.path.block();
        if matches!(self.doc.blocks[b], Block::Paragraph(_)) {
            return self.join_with_previous(b);
        }
        let replacement = match &self.doc.blocks[b] {
            Block::Heading { inlines, .. } | Block::Quote(inlines) => {
                Block::Paragraph(inlines.clone())
            }
            Block::CodeBlock(text) if text.is_empty() => Block::empty_paragraph(),
            _ => return false,
        };
        self.doc.blocks[b] = replacement;
        true
    }

    /// Backspace at the start of paragraph `b`.
    fn join_with_previous(&mut self, b: usize) -> bool {
        let Some(prev) = b.checked_sub(1) else {
            return false;
        };
        let prev_block = &self.doc.blocks[prev];
        if prev_block.is_atomic() {
            self.doc.blocks.remove(prev);
            self.move_caret(vec![prev], 0);
            return true;
        }
        if prev_block.text_inlines().is_some() {
            let offset = self.end_of(prev).map_or(0, |pos| pos.offset);
            self.join_text_blocks(prev);
            self.move_caret(vec![prev], offset);
            return true;
        }
        // List, table or code block: an empty paragraph disappears into it.
        let empty = matches!(&self.doc.blocks[b], Block::Paragraph(inlines) if inlines.is_empty());
        if !empty {
            return false;
        }
        self.doc.blocks.remove(b);
        if let Some(end) = self.end_of(prev) {
            self.move_caret(end.path, end.offset);
        }
        true
    }

    /// Enter. Lists have their own rules; code blocks and table cells take a
    /// line break; other text blocks split at the caret.
    pub(crate) fn commit(&mut self) -> bool {
        let deleted = self.delete_selection();
        let caret = self.caret();
        if self.doc.list_item(&caret.path).is_some() {
            return self.commit_in_list(&caret) || deleted;
        }
        match self.doc.container(&caret.path) {
            None => return deleted,
            Some(Container::Code(_)) => {
                return self.insert_nodes(&caret, vec![Inline::text("\n")]) || deleted;
            }
            Some(Container::Inlines(_)) if caret.path.len() != 1 => {
                let marks = self.marks_at(&caret);
                let brk = Inline::Text(TextRun::marked("\n", marks));
                return self.insert_nodes(&caret, vec![brk]) || deleted;
            }
            Some(Container::Inlines(_)) => {}
        }

        let b = caret.path.block();
        let block = &mut self.doc.blocks[b];
        if matches!(&*block, Block::Quote(inlines) if inlines.is_empty()) {
            // Enter on an empty quote leaves it.
            *block = Block::empty_paragraph();
            return true;
        }
        let Some(inlines) = block.text_inlines_mut() else {
            return deleted;
        };
        if caret.offset == 0 && !inlines.is_empty() {
            self.doc.blocks.insert(b, Block::empty_paragraph());
            self.move_caret(vec![b + 1], 0);
            return true;
        }
        let tail = inline::split_off(inlines, caret.offset);
        let next = match block {
            Block::Quote(_) => Block::Quote(tail),
            _ => Block::Paragraph(tail),
        };
        self.doc.blocks.insert(b + 1, next);
        self.move_caret(vec![b + 1], 0);
        true
    }
}
