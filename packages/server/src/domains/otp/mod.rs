//! One-time-code verification under two postures: strict (identity) and
//! relaxed (document-signing confirmation).

pub mod error;
pub mod models;
pub mod policy;
pub mod service;

pub use error::OtpError;
pub use policy::{CodeStorage, OtpPolicy};
pub use service::OtpService;
