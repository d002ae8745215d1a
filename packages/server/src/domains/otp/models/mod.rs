pub mod signing_confirmation;
pub mod verification_attempt;

pub use signing_confirmation::SigningConfirmation;
pub use verification_attempt::VerificationAttempt;
