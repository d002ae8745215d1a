use thiserror::Error;

/// OTP policy failures, plus the one non-policy case: the gateway refusing
/// to carry the message. Callers can tell "your code is wrong" from "we
/// could not send you a code".
#[derive(Debug, Error)]
pub enum OtpError {
    #[error("invalid code")]
    CodeInvalid,

    #[error("code expired, please resend")]
    CodeExpired,

    #[error("too many attempts, please resend")]
    TooManyAttempts,

    #[error("too many requests, try later")]
    ResendThrottled,

    #[error("failed to dispatch code: {0}")]
    Dispatch(#[from] mobizon::MobizonError),
}
