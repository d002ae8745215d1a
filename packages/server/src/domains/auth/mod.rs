//! Credential issuance: short-lived signed access tokens and long-lived
//! opaque refresh tokens, rotated atomically.

pub mod error;
pub mod jwt;
pub mod models;
pub mod password;
pub mod service;
pub mod tokens;

pub use error::{AuthError, TokenError};
pub use jwt::{Claims, JwtService};
pub use service::{CredentialService, RegisterRequest, TokenPair};
