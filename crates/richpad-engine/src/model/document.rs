use crate::model::block::{Block, List, ListItem};
use crate::model::inline::{self, Inline};
use crate::model::path::{Container, ContainerMut, NodePath, Position};

/// Ordered forest of blocks owned by one editing session.
///
/// A document is kept normalized: adjacent text runs with equal marks are
/// merged, empty lists and tables are dropped, and the last block always
/// holds a caret position (an empty paragraph is appended when needed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.normalize();
        doc
    }

    /// Parse serialized markup. Never fails; unknown markup is dropped.
    pub fn from_markup(markup: &str) -> Self {
        Self::from_blocks(crate::markup::parse(markup))
    }

    /// Parse serialized markup from raw bytes, which must be valid UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_markup(text))
    }

    pub fn to_markup(&self) -> String {
        crate::markup::serialize(self)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// True for a document with no content beyond one empty paragraph.
    pub fn is_blank(&self) -> bool {
        match self.blocks.as_slice() {
            [] => true,
            [Block::Paragraph(inlines)] => inlines.is_empty(),
            _ => false,
        }
    }

    /// Plain-text projection, one line per container.
    pub fn plain_text(&self) -> String {
        self.container_paths()
            .iter()
            .filter_map(|path| match self.container(path)? {
                Container::Inlines(inlines) => Some(inline::plain_text(inlines)),
                Container::Code(text) => Some(text.clone()),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn container(&self, path: &NodePath) -> Option<Container<'_>> {
        let block = self.blocks.get(path.block())?;
        match (block, path.rest()) {
            (Block::Paragraph(inlines) | Block::Quote(inlines), []) => {
                Some(Container::Inlines(inlines))
            }
            (Block::Heading { inlines, .. }, []) => Some(Container::Inlines(inlines)),
            (Block::CodeBlock(text), []) => Some(Container::Code(text)),
            (Block::List(list), rest) if !rest.is_empty() => {
                list.item(rest).map(|item| Container::Inlines(&item.inlines))
            }
            (Block::Table(table), [row, col]) => table
                .cell(*row, *col)
                .map(|cell| Container::Inlines(&cell.inlines)),
            _ => None,
        }
    }

    pub fn container_mut(&mut self, path: &NodePath) -> Option<ContainerMut<'_>> {
        let block = self.blocks.get_mut(path.block())?;
        match (block, path.rest()) {
            (Block::Paragraph(inlines) | Block::Quote(inlines), []) => {
                Some(ContainerMut::Inlines(inlines))
            }
            (Block::Heading { inlines, .. }, []) => Some(ContainerMut::Inlines(inlines)),
            (Block::CodeBlock(text), []) => Some(ContainerMut::Code(text)),
            (Block::List(list), rest) if !rest.is_empty() => list
                .item_mut(rest)
                .map(|item| ContainerMut::Inlines(&mut item.inlines)),
            (Block::Table(table), [row, col]) => table
                .rows
                .get_mut(*row)?
                .cells
                .get_mut(*col)
                .map(|cell| ContainerMut::Inlines(&mut cell.inlines)),
            _ => None,
        }
    }

    /// Inline content at `path`, if it is an inline container.
    pub(crate) fn inlines_mut(&mut self, path: &NodePath) -> Option<&mut Vec<Inline>> {
        match self.container_mut(path)? {
            ContainerMut::Inlines(inlines) => Some(inlines),
            ContainerMut::Code(_) => None,
        }
    }

    /// The list item at `path`, if the path addresses one.
    pub fn list_item(&self, path: &NodePath) -> Option<&ListItem> {
        match self.blocks.get(path.block())? {
            Block::List(list) => list.item(path.rest()),
            _ => None,
        }
    }

    pub(crate) fn list_mut(&mut self, block: usize) -> Option<&mut List> {
        match self.blocks.get_mut(block)? {
            Block::List(list) => Some(list),
            _ => None,
        }
    }

    /// Every caret-holding container in document order.
    pub fn container_paths(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        for (b, block) in self.blocks.iter().enumerate() {
            match block {
                Block::Paragraph(_)
                | Block::Heading { .. }
                | Block::Quote(_)
                | Block::CodeBlock(_) => out.push(NodePath::root(b)),
                Block::List(list) => collect_item_paths(list, &NodePath::root(b), &mut out),
                Block::Table(table) => {
                    for (r, row) in table.rows.iter().enumerate() {
                        for c in 0..row.cells.len() {
                            out.push(NodePath::new(vec![b, r, c]));
                        }
                    }
                }
                Block::Image(_) | Block::Embed(_) | Block::Divider => {}
            }
        }
        out
    }

    /// True if the position addresses an existing container and offset.
    pub fn resolves(&self, pos: &Position) -> bool {
        self.container(&pos.path)
            .is_some_and(|container| pos.offset <= container.units())
    }

    /// Sort key in document order: (container index, offset).
    pub fn order_of(&self, pos: &Position) -> Option<(usize, usize)> {
        let index = self.container_paths().iter().position(|p| *p == pos.path)?;
        Some((index, pos.offset))
    }

    /// Position after the last unit of the last container.
    pub fn end_position(&self) -> Position {
        self.container_paths()
            .pop()
            .map(|path| {
                let offset = self.container(&path).map_or(0, |c| c.units());
                Position { path, offset }
            })
            .unwrap_or_default()
    }

    pub(crate) fn normalize(&mut self) {
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(inlines) | Block::Quote(inlines) => inline::normalize(inlines),
                Block::Heading { level, inlines } => {
                    *level = (*level).clamp(1, 6);
                    inline::normalize(inlines);
                }
                Block::List(list) => list.normalize(),
                Block::Table(table) => {
                    for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                        inline::normalize(&mut cell.inlines);
                    }
                }
                Block::CodeBlock(_) | Block::Image(_) | Block::Embed(_) | Block::Divider => {}
            }
        }
        self.blocks.retain(|block| match block {
            Block::List(list) => !list.items.is_empty(),
            Block::Table(table) => table.shape().1 > 0,
            _ => true,
        });
        if self.blocks.last().is_none_or(Block::is_atomic) {
            self.blocks.push(Block::empty_paragraph());
        }
    }
}

fn collect_item_paths(list: &List, prefix: &NodePath, out: &mut Vec<NodePath>) {
    for (i, item) in list.items.iter().enumerate() {
        let path = prefix.child(i);
        out.push(path.clone());
        if let Some(children) = &item.children {
            collect_item_paths(children, &path, out);
        }
    }
}

/// Format a document as an indented outline for tests and debugging.
pub fn format_outline(doc: &Document) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for block in &doc.blocks {
        match block {
            Block::Paragraph(inlines) => {
                writeln!(out, "Paragraph {:?}", inline::plain_text(inlines)).unwrap();
            }
            Block::Heading { level, inlines } => {
                writeln!(out, "Heading({level}) {:?}", inline::plain_text(inlines)).unwrap();
            }
            Block::Quote(inlines) => {
                writeln!(out, "Quote {:?}", inline::plain_text(inlines)).unwrap();
            }
            Block::CodeBlock(text) => writeln!(out, "CodeBlock {text:?}").unwrap(),
            Block::List(list) => format_list(&mut out, list, 0),
            Block::Table(table) => {
                let (rows, cols) = table.shape();
                writeln!(out, "Table {rows}x{cols}").unwrap();
            }
            Block::Image(image) => writeln!(out, "Image {:?}", image.src).unwrap(),
            Block::Embed(embed) => writeln!(out, "Embed {embed:?}").unwrap(),
            Block::Divider => writeln!(out, "Divider").unwrap(),
        }
    }
    out
}

fn format_list(out: &mut String, list: &List, depth: usize) {
    use std::fmt::Write;

    let indent = "  ".repeat(depth);
    writeln!(out, "{indent}List ordered={}", list.ordered).unwrap();
    for item in &list.items {
        writeln!(out, "{indent}  Item {:?}", inline::plain_text(&item.inlines)).unwrap();
        if let Some(children) = &item.children {
            format_list(out, children, depth + 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::Table;
    use pretty_assertions::assert_eq;

    fn sample() -> Document {
        let mut first = ListItem::new(vec![Inline::text("a")]);
        first.children = Some(List::new(true, vec![ListItem::new(vec![Inline::text("a.1")])]));
        Document::from_blocks(vec![
            Block::Paragraph(vec![Inline::text("intro")]),
            Block::List(List::new(false, vec![first, ListItem::new(vec![Inline::text("b")])])),
            Block::Table(Table::new(1, 2)),
            Block::CodeBlock("let x = 1;".into()),
        ])
    }

    #[test]
    fn new_document_is_one_empty_paragraph() {
        let doc = Document::new();
        assert_eq!(doc.blocks(), &[Block::empty_paragraph()]);
        assert!(doc.is_blank());
    }

    #[test]
    fn from_bytes_rejects_invalid_utf8() {
        assert!(Document::from_bytes(&[0xFF, 0xFE]).is_err());
        assert!(Document::from_bytes(b"<p>ok</p>").is_ok());
    }

    #[test]
    fn container_paths_follow_document_order() {
        let paths: Vec<String> = sample()
            .container_paths()
            .iter()
            .map(NodePath::to_string)
            .collect();
        assert_eq!(
            paths,
            vec!["[0]", "[1/0]", "[1/0/0]", "[1/1]", "[2/0/0]", "[2/0/1]", "[3]"]
        );
    }

    #[test]
    fn resolves_checks_path_and_offset() {
        let doc = sample();
        assert!(doc.resolves(&Position::new(vec![1, 0, 0], 3)));
        assert!(!doc.resolves(&Position::new(vec![1, 0, 0], 4)));
        assert!(!doc.resolves(&Position::new(vec![1], 0)));
        assert!(!doc.resolves(&Position::new(vec![9], 0)));
    }

    #[test]
    fn end_position_is_after_last_unit() {
        assert_eq!(sample().end_position(), Position::new(vec![3], 10));
    }

    #[test]
    fn trailing_atomic_block_gets_a_paragraph() {
        let doc = Document::from_blocks(vec![Block::Divider]);
        assert_eq!(doc.blocks(), &[Block::Divider, Block::empty_paragraph()]);
    }

    #[test]
    fn empty_lists_are_dropped() {
        let doc = Document::from_blocks(vec![
            Block::List(List::new(false, Vec::new())),
            Block::Paragraph(vec![Inline::text("x")]),
        ]);
        assert_eq!(doc.blocks().len(), 1);
    }

    #[test]
    fn outline_lists_nesting() {
        assert_eq!(
            format_outline(&sample()),
            "Paragraph \"intro\"\n\
             List ordered=false\n  Item \"a\"\n    List ordered=true\n      Item \"a.1\"\n  Item \"b\"\n\
             Table 1x2\n\
             CodeBlock \"let x = 1;\"\n"
        );
    }
}
