pub mod ai;
pub mod config;
pub mod dispatch;
pub mod editing;
pub mod error;
pub mod host;
pub mod markup;
pub mod media;
pub mod model;
pub mod pickers;
pub mod session;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use ai::{AiBridge, AiError, AiPanel, AiService, FollowUp, InstructionKind};
pub use config::{EditorConfig, Preset, Template};
pub use dispatch::{Action, CommandArgs, CommandClass, CommandId, Dispatcher, OverlayKind};
pub use editing::{Cmd, Editor, Patch, Selection, SelectionSnapshot, SelectionTracker};
pub use error::EditorError;
pub use host::{
    AttachmentFile, Host, HostError, InMemoryFile, MentionProvider, NoopHost, RecordingHost,
    read_as_data_uri,
};
pub use model::*;
pub use pickers::{MentionCandidate, MentionSource};
pub use session::{AiRequest, Outcome, Session};
