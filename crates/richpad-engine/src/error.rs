use thiserror::Error;

use crate::dispatch::CommandId;

/// Reasons a dispatched command is ignored. None of these reach the host:
/// the session logs them and reports an ignored outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command {0} is not enabled for this editor")]
    Disabled(CommandId),

    #[error("Invalid argument for {command}: {reason}")]
    InvalidArgument { command: CommandId, reason: String },

    #[error("Editor is read-only")]
    ReadOnly,
}
