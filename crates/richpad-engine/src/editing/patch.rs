use crate::editing::Selection;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Whether the document changed
    pub changed: bool,
    pub new_selection: Selection,
    /// Document version after the command; bumped only on change
    pub version: u64,
}
