use serde::{Deserialize, Serialize};

use crate::model::inline::{self, Inline};

/// Top-level structural unit of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading { level: u8, inlines: Vec<Inline> },
    List(List),
    Quote(Vec<Inline>),
    CodeBlock(String),
    Table(Table),
    Image(Image),
    Embed(Embed),
    Divider,
}

impl Block {
    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        Block::Paragraph(inlines)
    }

    pub fn empty_paragraph() -> Self {
        Block::Paragraph(Vec::new())
    }

    /// Inline content of a Paragraph, Heading or Quote.
    pub fn text_inlines(&self) -> Option<&Vec<Inline>> {
        match self {
            Block::Paragraph(inlines) | Block::Quote(inlines) => Some(inlines),
            Block::Heading { inlines, .. } => Some(inlines),
            _ => None,
        }
    }

    pub fn text_inlines_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Block::Paragraph(inlines) | Block::Quote(inlines) => Some(inlines),
            Block::Heading { inlines, .. } => Some(inlines),
            _ => None,
        }
    }

    /// Same kind of text block holding different content.
    pub(crate) fn with_inlines(&self, inlines: Vec<Inline>) -> Block {
        match self {
            Block::Quote(_) => Block::Quote(inlines),
            Block::Heading { level, .. } => Block::Heading {
                level: *level,
                inlines,
            },
            _ => Block::Paragraph(inlines),
        }
    }

    /// Blocks with no caret position of their own.
    pub fn is_atomic(&self) -> bool {
        matches!(self, Block::Image(_) | Block::Embed(_) | Block::Divider)
    }
}

/// An ordered or bulleted list. Holds at least one item once normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn new(ordered: bool, items: Vec<ListItem>) -> Self {
        Self { ordered, items }
    }

    /// Item addressed by an index path: the first index selects one of this
    /// list's items, each further index descends into that item's nested list.
    pub fn item(&self, path: &[usize]) -> Option<&ListItem> {
        let (&first, rest) = path.split_first()?;
        let item = self.items.get(first)?;
        if rest.is_empty() {
            Some(item)
        } else {
            item.children.as_ref()?.item(rest)
        }
    }

    pub fn item_mut(&mut self, path: &[usize]) -> Option<&mut ListItem> {
        let (&first, rest) = path.split_first()?;
        let item = self.items.get_mut(first)?;
        if rest.is_empty() {
            Some(item)
        } else {
            item.children.as_mut()?.item_mut(rest)
        }
    }

    /// The list that directly contains the item at `path`.
    pub fn parent_of(&self, path: &[usize]) -> Option<&List> {
        match path {
            [] => None,
            [_] => Some(self),
            [first, rest @ ..] => self.items.get(*first)?.children.as_ref()?.parent_of(rest),
        }
    }

    pub fn parent_of_mut(&mut self, path: &[usize]) -> Option<&mut List> {
        match path {
            [] => None,
            [_] => Some(self),
            [first, rest @ ..] => self
                .items
                .get_mut(*first)?
                .children
                .as_mut()?
                .parent_of_mut(rest),
        }
    }

    /// Items in depth-first order with their nesting depth.
    pub fn flatten(self) -> Vec<(usize, Vec<Inline>)> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into(self, depth: usize, out: &mut Vec<(usize, Vec<Inline>)>) {
        for item in self.items {
            out.push((depth, item.inlines));
            if let Some(children) = item.children {
                children.flatten_into(depth + 1, out);
            }
        }
    }

    pub(crate) fn normalize(&mut self) {
        for item in &mut self.items {
            inline::normalize(&mut item.inlines);
            if let Some(children) = &mut item.children {
                children.normalize();
                if children.items.is_empty() {
                    item.children = None;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub inlines: Vec<Inline>,
    pub children: Option<List>,
}

impl ListItem {
    pub fn new(inlines: Vec<Inline>) -> Self {
        Self {
            inlines,
            children: None,
        }
    }

    /// An item with no text, no atoms and no nested list.
    pub fn is_empty(&self) -> bool {
        inline::units(&self.inlines) == 0 && self.children.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    /// A `rows` x `cols` grid of empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows)
                .map(|_| Row {
                    cells: vec![Cell::default(); cols],
                })
                .collect(),
        }
    }

    /// Row count and widest row's cell count.
    pub fn shape(&self) -> (usize, usize) {
        let cols = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        (self.rows.len(), cols)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.cells.get(col)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// Video hosts recognised for embed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    YouTube,
    Vimeo,
    Loom,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::YouTube, Provider::Vimeo, Provider::Loom];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Vimeo => "vimeo",
            Provider::Loom => "loom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Player URL the host renders in a frame.
    pub fn player_url(self, resource_id: &str) -> String {
        match self {
            Provider::YouTube => format!("https://www.youtube.com/embed/{resource_id}"),
            Provider::Vimeo => format!("https://player.vimeo.com/video/{resource_id}"),
            Provider::Loom => format!("https://www.loom.com/embed/{resource_id}"),
        }
    }
}

/// Embedded external content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Embed {
    /// Provider-specific player for a recognised video URL.
    Video {
        provider: Provider,
        resource_id: String,
    },
    /// Clickable link-preview card for any other URL.
    Link { url: String },
}

impl Embed {
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Embed::Video { provider, .. } => Some(*provider),
            Embed::Link { .. } => None,
        }
    }
}
