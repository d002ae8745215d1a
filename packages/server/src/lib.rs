// DealDesk - B2B sales back-end, trust core.
//
// This crate carries the security-sensitive subsystems: credential issuance
// and rotation, one-time-code verification (identity + document signing),
// and the role-gated document lifecycle. Surrounding CRUD, reporting, chat
// and PDF rendering live in sibling services.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::Config;
