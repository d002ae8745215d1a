use thiserror::Error;

/// Login failures. Unknown email and a mismatched password are deliberately
/// the same variant so callers cannot enumerate accounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("phone not verified")]
    NotVerified,
}

/// Refresh-token failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("refresh token expired")]
    Expired,

    #[error("invalid refresh token")]
    Invalid,

    #[error("refresh token revoked")]
    Revoked,
}
