//! Maps toolbar and insert-menu command identifiers to editor commands.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{EditorConfig, Template};
use crate::editing::Cmd;
use crate::error::EditorError;
use crate::model::{Document, Mark, Mention};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandId {
    Bold,
    Italic,
    Underline,
    Strike,
    InlineCode,
    Link,
    Indent,
    Outdent,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    Quote,
    CodeBlock,
    Table,
    Image,
    Embed,
    Mention,
    Emoji,
    Divider,
    AiAssist,
    Template,
}

/// Toggling commands change marks or nesting in place and undo themselves
/// when repeated; insertion commands add content at the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    Toggling,
    Insertion,
}

impl CommandId {
    pub const ALL: [CommandId; 22] = [
        CommandId::Bold,
        CommandId::Italic,
        CommandId::Underline,
        CommandId::Strike,
        CommandId::InlineCode,
        CommandId::Link,
        CommandId::Indent,
        CommandId::Outdent,
        CommandId::Paragraph,
        CommandId::Heading,
        CommandId::BulletList,
        CommandId::OrderedList,
        CommandId::Quote,
        CommandId::CodeBlock,
        CommandId::Table,
        CommandId::Image,
        CommandId::Embed,
        CommandId::Mention,
        CommandId::Emoji,
        CommandId::Divider,
        CommandId::AiAssist,
        CommandId::Template,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommandId::Bold => "bold",
            CommandId::Italic => "italic",
            CommandId::Underline => "underline",
            CommandId::Strike => "strike",
            CommandId::InlineCode => "inlineCode",
            CommandId::Link => "link",
            CommandId::Indent => "indent",
            CommandId::Outdent => "outdent",
            CommandId::Paragraph => "paragraph",
            CommandId::Heading => "heading",
            CommandId::BulletList => "bulletList",
            CommandId::OrderedList => "orderedList",
            CommandId::Quote => "quote",
            CommandId::CodeBlock => "codeBlock",
            CommandId::Table => "table",
            CommandId::Image => "image",
            CommandId::Embed => "embed",
            CommandId::Mention => "mention",
            CommandId::Emoji => "emoji",
            CommandId::Divider => "divider",
            CommandId::AiAssist => "aiAssist",
            CommandId::Template => "template",
        }
    }

    pub fn class(self) -> CommandClass {
        match self {
            CommandId::Bold
            | CommandId::Italic
            | CommandId::Underline
            | CommandId::Strike
            | CommandId::InlineCode
            | CommandId::Link
            | CommandId::Indent
            | CommandId::Outdent => CommandClass::Toggling,
            _ => CommandClass::Insertion,
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandId {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EditorError::UnknownCommand(s.to_string()))
    }
}

/// Optional arguments accompanying a command id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandArgs {
    pub href: Option<String>,
    pub level: Option<u8>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub url: Option<String>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub glyph: Option<String>,
    pub name: Option<String>,
}

/// Overlays a command can open instead of editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    MentionPicker,
    EmojiPicker,
    ImageUpload,
    AiPanel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit(Cmd),
    Open(OverlayKind),
}

const DEFAULT_TABLE_SIZE: usize = 3;

/// Resolves command ids against one editor's configuration.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    enabled: BTreeSet<CommandId>,
    templates: Vec<Template>,
    ai_assist: bool,
    templates_enabled: bool,
}

impl Dispatcher {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            enabled: config.toolbar.iter().chain(&config.insert_menu).copied().collect(),
            templates: config.templates.clone(),
            ai_assist: config.ai_assist,
            templates_enabled: config.templates_enabled,
        }
    }

    pub fn is_enabled(&self, id: CommandId) -> bool {
        let flagged = match id {
            CommandId::AiAssist => self.ai_assist,
            CommandId::Template => self.templates_enabled,
            _ => true,
        };
        flagged && self.enabled.contains(&id)
    }

    /// Parses `id` and resolves it with `args`.
    pub fn resolve_str(&self, id: &str, args: &CommandArgs) -> Result<Action, EditorError> {
        self.resolve(id.parse()?, args)
    }

    pub fn resolve(&self, id: CommandId, args: &CommandArgs) -> Result<Action, EditorError> {
        if !self.is_enabled(id) {
            return Err(EditorError::Disabled(id));
        }
        let invalid = |reason: &str| EditorError::InvalidArgument {
            command: id,
            reason: reason.to_string(),
        };

        let cmd = match id {
            CommandId::Bold => Cmd::ToggleMark(Mark::Bold),
            CommandId::Italic => Cmd::ToggleMark(Mark::Italic),
            CommandId::Underline => Cmd::ToggleMark(Mark::Underline),
            CommandId::Strike => Cmd::ToggleMark(Mark::Strikethrough),
            CommandId::InlineCode => Cmd::ToggleMark(Mark::Code),
            CommandId::Link => {
                let href = args.href.clone().ok_or_else(|| invalid("missing href"))?;
                Cmd::SetLink { href }
            }
            CommandId::Indent => Cmd::Indent,
            CommandId::Outdent => Cmd::Outdent,
            CommandId::Paragraph => Cmd::SetParagraph,
            CommandId::Heading => {
                let level = args.level.unwrap_or(1);
                if !(1..=6).contains(&level) {
                    return Err(invalid("heading level must be 1 to 6"));
                }
                Cmd::SetHeading { level }
            }
            CommandId::BulletList => Cmd::ToggleList { ordered: false },
            CommandId::OrderedList => Cmd::ToggleList { ordered: true },
            CommandId::Quote => Cmd::InsertQuote,
            CommandId::CodeBlock => Cmd::InsertCodeBlock,
            CommandId::Divider => Cmd::InsertDivider,
            CommandId::Table => {
                let rows = args.rows.unwrap_or(DEFAULT_TABLE_SIZE);
                let cols = args.cols.unwrap_or(DEFAULT_TABLE_SIZE);
                if rows == 0 || cols == 0 {
                    return Err(invalid("table needs at least one row and column"));
                }
                Cmd::InsertTable { rows, cols }
            }
            CommandId::Image => match &args.src {
                Some(src) => Cmd::InsertImage {
                    src: src.clone(),
                    alt: args.alt.clone().unwrap_or_default(),
                },
                None => return Ok(Action::Open(OverlayKind::ImageUpload)),
            },
            CommandId::Embed => {
                let url = args.url.as_deref().map(str::trim).unwrap_or_default();
                if url.is_empty() {
                    return Err(invalid("missing url"));
                }
                Cmd::InsertEmbed {
                    url: url.to_string(),
                }
            }
            CommandId::Mention => match (&args.user_id, &args.display_name) {
                (Some(user_id), Some(display_name)) => Cmd::InsertMention(Mention {
                    user_id: user_id.clone(),
                    display_name: display_name.clone(),
                }),
                _ => return Ok(Action::Open(OverlayKind::MentionPicker)),
            },
            CommandId::Emoji => match &args.glyph {
                Some(glyph) => Cmd::InsertEmoji {
                    glyph: glyph.clone(),
                },
                None => return Ok(Action::Open(OverlayKind::EmojiPicker)),
            },
            CommandId::AiAssist => return Ok(Action::Open(OverlayKind::AiPanel)),
            CommandId::Template => {
                let name = args.name.as_deref().ok_or_else(|| invalid("missing template name"))?;
                let template = self
                    .templates
                    .iter()
                    .find(|t| t.name == name)
                    .ok_or_else(|| invalid(&format!("no template named {name:?}")))?;
                Cmd::InsertBlocks(Document::from_markup(&template.markup).blocks().to_vec())
            }
        };
        Ok(Action::Edit(cmd))
    }
}
