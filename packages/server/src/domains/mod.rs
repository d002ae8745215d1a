pub mod auth;
pub mod authz;
pub mod documents;
pub mod otp;
