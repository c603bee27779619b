//! Per-editor configuration and the presets for each host surface.

use serde::{Deserialize, Serialize};

use crate::dispatch::CommandId;
use crate::pickers::MentionSource;

/// Named markup inserted by the `template` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub markup: String,
}

/// Everything fixed when an editing session is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub initial_content: String,
    /// Shown while the document is empty.
    pub placeholder: String,
    /// Height hints in CSS pixels, passed through to the host.
    pub min_height: Option<u32>,
    pub max_height: Option<u32>,
    pub toolbar: Vec<CommandId>,
    pub insert_menu: Vec<CommandId>,
    pub mention_source: MentionSource,
    pub ai_assist: bool,
    pub templates_enabled: bool,
    pub templates: Vec<Template>,
    pub read_only: bool,
    pub autofocus: bool,
}

/// The host surfaces that embed the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    TaskDescription,
    Notepad,
    FormDescription,
}

impl Preset {
    pub const ALL: [Preset; 3] = [
        Preset::TaskDescription,
        Preset::Notepad,
        Preset::FormDescription,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::TaskDescription => "task-description",
            Preset::Notepad => "notepad",
            Preset::FormDescription => "form-description",
        }
    }

    pub fn config(self) -> EditorConfig {
        use CommandId::*;
        match self {
            Preset::TaskDescription => EditorConfig {
                placeholder: "Add a description, type @ to mention someone".into(),
                min_height: Some(120),
                toolbar: vec![
                    Bold, Italic, Underline, Strike, InlineCode, Link, Heading, BulletList,
                    OrderedList, Indent, Outdent,
                ],
                insert_menu: vec![
                    Quote, CodeBlock, Table, Image, Embed, Mention, Emoji, Divider, AiAssist,
                    Template,
                ],
                ai_assist: true,
                templates_enabled: true,
                ..EditorConfig::default()
            },
            Preset::Notepad => EditorConfig {
                placeholder: "Write something...".into(),
                min_height: Some(240),
                toolbar: vec![Bold, Italic, Underline, Strike, Link, BulletList, OrderedList],
                insert_menu: vec![Quote, CodeBlock, Emoji, Divider],
                autofocus: true,
                ..EditorConfig::default()
            },
            Preset::FormDescription => EditorConfig {
                placeholder: "Describe what this form is for".into(),
                max_height: Some(320),
                toolbar: vec![Bold, Italic, Underline, Link, BulletList, OrderedList],
                insert_menu: vec![Image, Embed, Divider],
                ..EditorConfig::default()
            },
        }
    }
}
