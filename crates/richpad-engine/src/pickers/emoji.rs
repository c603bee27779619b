//! Built-in emoji catalogue and the picker that browses it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiCategory {
    Smileys,
    People,
    Nature,
    Food,
    Activity,
    Objects,
    Symbols,
}

impl EmojiCategory {
    pub const ALL: [EmojiCategory; 7] = [
        EmojiCategory::Smileys,
        EmojiCategory::People,
        EmojiCategory::Nature,
        EmojiCategory::Food,
        EmojiCategory::Activity,
        EmojiCategory::Objects,
        EmojiCategory::Symbols,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiEntry {
    pub glyph: &'static str,
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub category: EmojiCategory,
}

impl EmojiEntry {
    fn matches(&self, needle: &str) -> bool {
        self.name.contains(needle) || self.keywords.iter().any(|k| k.contains(needle))
    }
}

macro_rules! emoji {
    ($glyph:literal, $name:literal, [$($kw:literal),*], $cat:ident) => {
        EmojiEntry {
            glyph: $glyph,
            name: $name,
            keywords: &[$($kw),*],
            category: EmojiCategory::$cat,
        }
    };
}

pub static CATALOGUE: &[EmojiEntry] = &[
    emoji!("😀", "grinning face", ["smile", "happy"], Smileys),
    emoji!("😂", "face with tears of joy", ["laugh", "lol"], Smileys),
    emoji!("😊", "smiling face with smiling eyes", ["blush", "happy"], Smileys),
    emoji!("😉", "winking face", ["wink"], Smileys),
    emoji!("🤔", "thinking face", ["hmm", "think"], Smileys),
    emoji!("😢", "crying face", ["sad", "tear"], Smileys),
    emoji!("👍", "thumbs up", ["like", "yes", "approve"], People),
    emoji!("👎", "thumbs down", ["dislike", "no"], People),
    emoji!("👏", "clapping hands", ["applause", "bravo"], People),
    emoji!("🙌", "raising hands", ["celebrate", "hooray"], People),
    emoji!("👀", "eyes", ["look", "watching"], People),
    emoji!("🙏", "folded hands", ["please", "thanks"], People),
    emoji!("🐶", "dog face", ["puppy", "pet"], Nature),
    emoji!("🐱", "cat face", ["kitten", "pet"], Nature),
    emoji!("🌱", "seedling", ["plant", "grow"], Nature),
    emoji!("🌞", "sun with face", ["sunny", "weather"], Nature),
    emoji!("🔥", "fire", ["hot", "lit"], Nature),
    emoji!("🍕", "pizza", ["slice"], Food),
    emoji!("☕", "hot beverage", ["coffee", "tea"], Food),
    emoji!("🍰", "shortcake", ["cake", "dessert"], Food),
    emoji!("🍎", "red apple", ["fruit"], Food),
    emoji!("⚽", "soccer ball", ["football", "sport"], Activity),
    emoji!("🎉", "party popper", ["celebrate", "tada"], Activity),
    emoji!("🏆", "trophy", ["win", "award"], Activity),
    emoji!("🎯", "direct hit", ["target", "goal"], Activity),
    emoji!("💡", "light bulb", ["idea"], Objects),
    emoji!("📌", "pushpin", ["pin"], Objects),
    emoji!("📅", "calendar", ["date", "schedule"], Objects),
    emoji!("🔒", "locked", ["security", "private"], Objects),
    emoji!("🚀", "rocket", ["launch", "ship"], Objects),
    emoji!("✅", "check mark button", ["done", "yes"], Symbols),
    emoji!("❌", "cross mark", ["no", "wrong"], Symbols),
    emoji!("⚠️", "warning", ["caution"], Symbols),
    emoji!("❤️", "red heart", ["love"], Symbols),
    emoji!("❓", "question mark", ["question", "help"], Symbols),
];

/// Catalogue entries matching `query` (case-insensitive substring on name or
/// keywords), optionally limited to one category.
pub fn search(query: &str, category: Option<EmojiCategory>) -> Vec<&'static EmojiEntry> {
    let needle = query.trim().to_lowercase();
    CATALOGUE
        .iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .filter(|e| needle.is_empty() || e.matches(&needle))
        .collect()
}

#[derive(Debug, Clone)]
pub struct EmojiPicker {
    ticket: Uuid,
    query: String,
    category: Option<EmojiCategory>,
    trigger: Option<Position>,
}

impl EmojiPicker {
    pub fn open(trigger: Option<Position>) -> Self {
        Self {
            ticket: Uuid::new_v4(),
            query: String::new(),
            category: None,
            trigger,
        }
    }

    pub fn ticket(&self) -> Uuid {
        self.ticket
    }

    pub fn trigger(&self) -> Option<&Position> {
        self.trigger.as_ref()
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
    }

    pub fn set_category(&mut self, category: Option<EmojiCategory>) {
        self.category = category;
    }

    pub fn results(&self) -> Vec<&'static EmojiEntry> {
        search(&self.query, self.category)
    }
}
