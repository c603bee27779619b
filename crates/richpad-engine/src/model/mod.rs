//! Document model: a tree of blocks holding inline content, addressed by
//! structural index paths.

pub mod block;
pub mod document;
pub mod inline;
pub mod path;

pub use block::{Block, Cell, Embed, Image, List, ListItem, Provider, Row, Table};
pub use document::{Document, format_outline};
pub use inline::{EmojiGlyph, Inline, Mark, Marks, Mention, TextRun};
pub use path::{Container, ContainerMut, NodePath, Position};
