//! Markup codec: a lenient reader and a deterministic writer for the HTML
//! subset the editing surface renders.

mod cursor;
mod parse;
mod serialize;
mod token;

pub use parse::parse;
pub use serialize::{serialize, serialize_inlines};
