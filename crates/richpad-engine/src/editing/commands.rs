use crate::model::{Block, Mark, Mention};

/// Editing commands applied to an [`Editor`](crate::editing::Editor).
///
/// Every command acts on the editor's current selection. Commands that make
/// no sense at the caret (indenting outside a list, a zero-sized table)
/// leave the document untouched and report `changed: false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Replace the selection with `text`, using pending or inherited marks.
    InsertText { text: String },
    DeleteBackward,
    /// Enter: split the block, add a list item, or exit a list.
    Commit,
    /// Tab inside a list item.
    Indent,
    /// Shift+Tab inside a list item.
    Outdent,
    ToggleMark(Mark),
    /// Set a link on the selection; an empty href removes it.
    SetLink { href: String },
    SetHeading { level: u8 },
    SetParagraph,
    ToggleList { ordered: bool },
    InsertQuote,
    InsertCodeBlock,
    InsertDivider,
    InsertTable { rows: usize, cols: usize },
    InsertImage { src: String, alt: String },
    InsertEmbed { url: String },
    InsertMention(Mention),
    InsertEmoji { glyph: String },
    /// Place parsed blocks at the caret (templates).
    InsertBlocks(Vec<Block>),
    /// Overwrite the selected range with plain text.
    ReplaceSelection { text: String },
    /// One paragraph per line, after top-level block `after`.
    InsertParagraphsBelow { after: usize, text: String },
}
