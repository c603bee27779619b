//! Block insertion and conversion.
//!
//! New blocks are placed relative to the caret: a top-level paragraph,
//! heading or quote is split at the caret (empty halves dropped) and the new
//! blocks go between the halves; inside a list, table or code block they go
//! after the enclosing top-level block.

use crate::editing::Editor;
use crate::model::inline::{self, Inline};
use crate::model::{Block, Container, Position, Table};

impl Editor {
    /// Places `blocks` at `at` and returns the index of the first one.
    pub(crate) fn place_blocks(&mut self, at: &Position, blocks: Vec<Block>) -> usize {
        let b = at.path.block().min(self.doc.blocks.len().saturating_sub(1));
        let splittable = at.path.len() == 1
            && self.doc.blocks.get(b).and_then(Block::text_inlines).is_some();
        if !splittable {
            let index = (b + 1).min(self.doc.blocks.len());
            self.doc.blocks.splice(index..index, blocks);
            return index;
        }

        let current = &mut self.doc.blocks[b];
        let tail = current
            .text_inlines_mut()
            .map(|inlines| inline::split_off(inlines, at.offset))
            .unwrap_or_default();
        let head_empty = current.text_inlines().is_none_or(|i| i.is_empty());
        let tail_block = current.with_inlines(tail);

        let mut replacement = Vec::with_capacity(blocks.len() + 2);
        if !head_empty {
            replacement.push(current.clone());
        }
        let first = b + replacement.len();
        replacement.extend(blocks);
        if tail_block.text_inlines().is_some_and(|i| !i.is_empty()) {
            replacement.push(tail_block);
        }
        self.doc.blocks.splice(b..=b, replacement);
        first
    }

    /// Makes sure an empty paragraph follows block `index` and puts the caret
    /// in it.
    fn caret_after(&mut self, index: usize) {
        let fresh = matches!(
            self.doc.blocks.get(index + 1),
            Some(Block::Paragraph(inlines)) if inlines.is_empty()
        );
        if !fresh {
            self.doc.blocks.insert(index + 1, Block::empty_paragraph());
        }
        self.move_caret(vec![index + 1], 0);
    }

    /// Divider, image or embed: no caret position of its own.
    pub(crate) fn insert_atomic(&mut self, block: Block) -> bool {
        self.delete_selection();
        let caret = self.caret();
        let at = self.place_blocks(&caret, vec![block]);
        self.caret_after(at);
        true
    }

    pub(crate) fn insert_quote(&mut self) -> bool {
        let content = self.cut_selection();
        let caret = self.caret();
        let at = self.place_blocks(&caret, vec![Block::Quote(content)]);
        self.move_caret(vec![at], 0);
        true
    }

    pub(crate) fn insert_code_block(&mut self) -> bool {
        let content = self.cut_selection();
        let text = inline::plain_text(&content);
        let caret = self.caret();
        let at = self.place_blocks(&caret, vec![Block::CodeBlock(text)]);
        self.move_caret(vec![at], 0);
        true
    }

    /// A `rows` x `cols` grid of empty cells, caret in the first cell.
    pub(crate) fn insert_table(&mut self, rows: usize, cols: usize) -> bool {
        if rows == 0 || cols == 0 {
            log::warn!("ignoring {rows}x{cols} table");
            return false;
        }
        self.delete_selection();
        let caret = self.caret();
        let at = self.place_blocks(&caret, vec![Block::Table(Table::new(rows, cols))]);
        self.move_caret(vec![at, 0, 0], 0);
        true
    }

    /// Turns the caret's top-level paragraph or quote into a heading.
    pub(crate) fn set_heading(&mut self, level: u8) -> bool {
        let caret = self.caret();
        if caret.path.len() != 1 {
            return false;
        }
        let level = level.clamp(1, 6);
        let Some(block) = self.doc.blocks.get_mut(caret.path.block()) else {
            return false;
        };
        if matches!(&*block, Block::Heading { level: current, .. } if *current == level) {
            return false;
        }
        let Some(inlines) = block.text_inlines().cloned() else {
            return false;
        };
        *block = Block::Heading { level, inlines };
        true
    }

    /// Turns a heading, quote or code block back into a paragraph. Inside a
    /// list or table a new paragraph is added after it.
    pub(crate) fn set_paragraph(&mut self) -> bool {
        let caret = self.caret();
        if caret.path.len() != 1 {
            let at = self.place_blocks(&caret, vec![Block::empty_paragraph()]);
            self.move_caret(vec![at], 0);
            return true;
        }
        let Some(block) = self.doc.blocks.get_mut(caret.path.block()) else {
            return false;
        };
        let inlines = match block {
            Block::Paragraph(_) => return false,
            Block::Heading { inlines, .. } | Block::Quote(inlines) => std::mem::take(inlines),
            Block::CodeBlock(text) => vec![Inline::text(std::mem::take(text))],
            _ => return false,
        };
        *block = Block::Paragraph(inlines);
        true
    }

    /// Template content: parsed blocks placed at the caret.
    pub(crate) fn insert_blocks(&mut self, blocks: Vec<Block>) -> bool {
        if blocks.is_empty() {
            return false;
        }
        self.delete_selection();
        let count = blocks.len();
        let caret = self.caret();
        let at = self.place_blocks(&caret, blocks);
        match self.entry_of(at) {
            Some(pos) => self.move_caret(pos.path, pos.offset),
            None => self.caret_after(at + count - 1),
        }
        true
    }

    /// One paragraph per line of `text`, after top-level block `after`.
    pub(crate) fn insert_paragraphs_below(&mut self, after: usize, text: &str) -> bool {
        let paragraphs: Vec<Block> = text
            .lines()
            .map(|line| {
                if line.is_empty() {
                    Block::empty_paragraph()
                } else {
                    Block::Paragraph(vec![Inline::text(line)])
                }
            })
            .collect();
        if paragraphs.is_empty() {
            return false;
        }
        let index = (after + 1).min(self.doc.blocks.len());
        self.doc.blocks.splice(index..index, paragraphs);
        self.move_caret(vec![index], 0);
        true
    }

    /// Plain text of the selection, joined across containers with newlines.
    pub fn selected_text(&self) -> String {
        if self.selection.is_collapsed() {
            return String::new();
        }
        let (start, end) = self.range();
        self.segments(&start, &end)
            .into_iter()
            .filter_map(|(path, range)| match self.doc.container(&path)? {
                Container::Inlines(inlines) => Some(inline::plain_text(&inline::slice(inlines, range))),
                Container::Code(code) => Some(code.chars().skip(range.start).take(range.len()).collect()),
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
