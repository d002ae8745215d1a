pub mod deal;
pub mod document;

pub use deal::Deal;
pub use document::{Document, DocumentStatus};
