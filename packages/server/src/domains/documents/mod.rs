//! Legally-meaningful document lifecycle:
//! `draft -> under_review -> {approved, returned} -> signed`.

pub mod models;
pub mod service;
pub mod transitions;

pub use models::{Deal, Document, DocumentStatus};
pub use service::{DocumentPolicy, DocumentService};
pub use transitions::{ReviewAction, TransitionError};
