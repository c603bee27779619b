//! The edit loop: commands applied to a document and its selection.
//!
//! Everything that mutates a [`Document`](crate::model::Document) goes
//! through [`Editor::apply`], which returns a [`Patch`] describing the
//! outcome. Behaviour is split by concern across the submodules, each adding
//! methods to [`Editor`].

mod annotate;
mod blocks;
pub mod commands;
mod editor;
mod lists;
pub mod patch;
pub mod selection;
mod text;

pub use commands::Cmd;
pub use editor::Editor;
pub use patch::Patch;
pub use selection::{Selection, SelectionSnapshot, SelectionTracker};
