//! Autocomplete overlays for mentions and emoji.

pub mod emoji;
pub mod mention;

pub use emoji::{CATALOGUE, EmojiCategory, EmojiEntry, EmojiPicker};
pub use mention::{
    MentionCandidate, MentionPicker, MentionQuery, MentionSource, fetch_candidates,
    filter_candidates,
};
