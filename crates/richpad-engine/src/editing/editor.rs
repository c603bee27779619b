use std::ops::Range;

use crate::editing::{Cmd, Patch, Selection};
use crate::model::inline::{self, Inline};
use crate::model::{
    Block, Container, ContainerMut, Document, Image, Marks, NodePath, Position,
};

/// A document plus the live selection, mutated only through [`Cmd`]s.
///
/// `apply` is the single edit loop: run the command, normalize the tree,
/// bump the version when something changed and make sure the selection
/// still resolves.
#[derive(Debug, Clone)]
pub struct Editor {
    pub(crate) doc: Document,
    pub(crate) selection: Selection,
    /// Marks for the next typed text, set by toggling on a collapsed caret.
    pub(crate) pending: Option<Marks>,
    pub(crate) version: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl Editor {
    /// Wraps a document with the caret at its end.
    pub fn new(doc: Document) -> Self {
        let selection = Selection::caret(doc.end_position());
        Self {
            doc,
            selection,
            pending: None,
            version: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pending_marks(&self) -> Option<&Marks> {
        self.pending.as_ref()
    }

    /// Moves the selection, falling back to the end of the document when it
    /// does not resolve. Clears pending marks.
    pub fn set_selection(&mut self, selection: Selection) -> &Selection {
        self.pending = None;
        self.selection = if selection.resolves(&self.doc) {
            selection
        } else {
            log::debug!("selection {selection:?} does not resolve, using end of document");
            Selection::caret(self.doc.end_position())
        };
        &self.selection
    }

    /// Apply command to document
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        log::debug!("apply {cmd:?} at {:?}", self.selection);
        let changed = match cmd {
            Cmd::InsertText { text } => self.insert_text(&text),
            Cmd::DeleteBackward => self.delete_backward(),
            Cmd::Commit => self.commit(),
            Cmd::Indent => self.indent(),
            Cmd::Outdent => self.outdent(),
            Cmd::ToggleMark(mark) => self.toggle_mark(&mark),
            Cmd::SetLink { href } => self.set_link(&href),
            Cmd::SetHeading { level } => self.set_heading(level),
            Cmd::SetParagraph => self.set_paragraph(),
            Cmd::ToggleList { ordered } => self.toggle_list(ordered),
            Cmd::InsertQuote => self.insert_quote(),
            Cmd::InsertCodeBlock => self.insert_code_block(),
            Cmd::InsertDivider => self.insert_atomic(Block::Divider),
            Cmd::InsertTable { rows, cols } => self.insert_table(rows, cols),
            Cmd::InsertImage { src, alt } => {
                self.insert_atomic(Block::Image(Image { src, alt }))
            }
            Cmd::InsertEmbed { url } => {
                self.insert_atomic(Block::Embed(crate::media::classify_embed(&url)))
            }
            Cmd::InsertMention(mention) => self.insert_mention(mention),
            Cmd::InsertEmoji { glyph } => self.insert_emoji(glyph),
            Cmd::InsertBlocks(blocks) => self.insert_blocks(blocks),
            Cmd::ReplaceSelection { text } => self.replace_selection(&text),
            Cmd::InsertParagraphsBelow { after, text } => self.insert_paragraphs_below(after, &text),
        };

        if changed {
            self.doc.normalize();
            self.version += 1;
        }
        if !self.selection.resolves(&self.doc) {
            log::debug!("selection {:?} lost by edit, using end of document", self.selection);
            self.selection = Selection::caret(self.doc.end_position());
        }
        Patch {
            changed,
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }

    /// The focus end of the selection.
    pub(crate) fn caret(&self) -> Position {
        self.selection.focus.clone()
    }

    pub(crate) fn move_caret(&mut self, path: impl Into<NodePath>, offset: usize) {
        self.selection = Selection::caret(Position::new(path, offset));
    }

    /// Selection start and end in document order.
    pub(crate) fn range(&self) -> (Position, Position) {
        self.selection.ordered(&self.doc).unwrap_or_else(|| {
            let end = self.doc.end_position();
            (end.clone(), end)
        })
    }

    /// Marks typing at `pos` would inherit.
    pub(crate) fn marks_at(&self, pos: &Position) -> Marks {
        match self.doc.container(&pos.path) {
            Some(Container::Inlines(inlines)) => inline::marks_at(inlines, pos.offset),
            _ => Marks::default(),
        }
    }

    /// Each container touched by `start..end`, with the caret range inside it.
    pub(crate) fn segments(&self, start: &Position, end: &Position) -> Vec<(NodePath, Range<usize>)> {
        let paths = self.doc.container_paths();
        let (Some(from), Some(to)) = (
            paths.iter().position(|p| *p == start.path),
            paths.iter().position(|p| *p == end.path),
        ) else {
            return Vec::new();
        };
        paths[from..=to]
            .iter()
            .enumerate()
            .filter_map(|(i, path)| {
                let units = self.doc.container(path)?.units();
                let lo = if i == 0 { start.offset } else { 0 };
                let hi = if from + i == to { end.offset } else { units };
                Some((path.clone(), lo..hi))
            })
            .collect()
    }

    /// Inserts nodes at `pos` and puts the caret after them. Code blocks take
    /// the nodes' plain text.
    pub(crate) fn insert_nodes(&mut self, pos: &Position, nodes: Vec<Inline>) -> bool {
        let inserted = match self.doc.container_mut(&pos.path) {
            Some(ContainerMut::Inlines(inlines)) => {
                let units = inline::units(&nodes);
                inline::insert(inlines, pos.offset, nodes);
                units
            }
            Some(ContainerMut::Code(code)) => {
                let text = inline::plain_text(&nodes);
                let at = inline::byte_offset(code, pos.offset);
                code.insert_str(at, &text);
                text.chars().count()
            }
            None => return false,
        };
        self.move_caret(pos.path.clone(), pos.offset + inserted);
        inserted > 0
    }

    /// Removes a caret range inside one container, returning what was removed.
    pub(crate) fn remove_in_container(&mut self, path: &NodePath, range: Range<usize>) -> Vec<Inline> {
        if range.is_empty() {
            return Vec::new();
        }
        match self.doc.container_mut(path) {
            Some(ContainerMut::Inlines(inlines)) => inline::remove_range(inlines, range),
            Some(ContainerMut::Code(code)) => {
                let from = inline::byte_offset(code, range.start);
                let to = inline::byte_offset(code, range.end);
                let removed: String = code.drain(from..to).collect();
                vec![Inline::text(removed)]
            }
            None => Vec::new(),
        }
    }

    /// Deletes a non-collapsed selection and collapses the caret to its start.
    ///
    /// Across containers: the start container keeps its head, the end
    /// container keeps its tail and whole top-level blocks in between are
    /// removed. When both ends hold inline text outside tables, list items in
    /// between are removed (their nested items lifted in place) and the tail
    /// is appended to the start container. Otherwise the containers in
    /// between are only emptied.
    pub(crate) fn delete_selection(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        let (start, end) = self.range();
        self.move_caret(start.path.clone(), start.offset);
        if start.path == end.path {
            self.remove_in_container(&start.path, start.offset..end.offset);
            return true;
        }

        for (path, range) in self.segments(&start, &end) {
            self.remove_in_container(&path, range);
        }
        let (first, last) = (start.path.block(), end.path.block());
        if last > first + 1 {
            self.doc.blocks.drain(first + 1..last);
        }
        let end_path = if last > first {
            end.path.with_block(first + 1)
        } else {
            end.path
        };
        if self.joinable(&start.path) && self.joinable(&end_path) {
            self.join_containers(&start.path, &end_path);
        }
        true
    }

    /// A top-level text block or a list item.
    fn joinable(&self, path: &NodePath) -> bool {
        if path.len() == 1 {
            return self
                .doc
                .blocks
                .get(path.block())
                .and_then(Block::text_inlines)
                .is_some();
        }
        self.doc.list_item(path).is_some()
    }

    /// Moves the content of `end` onto the end of `start`, removing `end`
    /// and every list item between them.
    fn join_containers(&mut self, start: &NodePath, end: &NodePath) {
        let paths = self.doc.container_paths();
        let (Some(from), Some(to)) = (
            paths.iter().position(|p| p == start),
            paths.iter().position(|p| p == end),
        ) else {
            return;
        };
        let tail = if end.len() == 1 {
            self.doc
                .blocks
                .remove(end.block())
                .text_inlines()
                .cloned()
                .unwrap_or_default()
        } else {
            self.take_item(end).unwrap_or_default()
        };
        for between in paths[from + 1..to].iter().rev() {
            self.take_item(between);
        }
        if let Some(inlines) = self.doc.inlines_mut(start) {
            inlines.extend(tail);
            inline::normalize(inlines);
        }
    }

    /// Appends block `first + 1` to text block `first` when both hold inlines.
    pub(crate) fn join_text_blocks(&mut self, first: usize) -> bool {
        let both_text = self.doc.blocks.get(first).and_then(Block::text_inlines).is_some()
            && self.doc.blocks.get(first + 1).and_then(Block::text_inlines).is_some();
        if !both_text {
            return false;
        }
        let tail = self
            .doc
            .blocks
            .remove(first + 1)
            .text_inlines()
            .cloned()
            .unwrap_or_default();
        if let Some(inlines) = self.doc.blocks[first].text_inlines_mut() {
            inlines.extend(tail);
            inline::normalize(inlines);
        }
        true
    }

    /// Cuts a selection inside one container and returns it. A selection
    /// spanning containers is collapsed to its start and nothing is cut.
    pub(crate) fn cut_selection(&mut self) -> Vec<Inline> {
        if self.selection.is_collapsed() {
            return Vec::new();
        }
        let (start, end) = self.range();
        self.move_caret(start.path.clone(), start.offset);
        if start.path != end.path {
            return Vec::new();
        }
        self.remove_in_container(&start.path, start.offset..end.offset)
    }

    /// First caret position inside top-level block `index`.
    pub(crate) fn entry_of(&self, index: usize) -> Option<Position> {
        let path = match self.doc.blocks.get(index)? {
            Block::List(_) => NodePath::new(vec![index, 0]),
            Block::Table(_) => NodePath::new(vec![index, 0, 0]),
            block if block.is_atomic() => return None,
            _ => NodePath::root(index),
        };
        Some(Position::new(path, 0))
    }

    /// Caret position at the end of top-level block `index`'s last container.
    pub(crate) fn end_of(&self, index: usize) -> Option<Position> {
        let path = self
            .doc
            .container_paths()
            .into_iter()
            .rfind(|p| p.block() == index)?;
        let offset = self.doc.container(&path)?.units();
        Some(Position::new(path, offset))
    }
}
