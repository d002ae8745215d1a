//! One policy type parameterizes both OTP postures instead of two near-twin
//! code paths.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// How the code is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStorage {
    /// Only a one-way hash is stored; the raw code exists in the SMS alone.
    Hashed,
    /// Stored in clear so a live record's code can be re-delivered verbatim
    /// on resend.
    Plain,
}

#[derive(Debug, Clone)]
pub struct OtpPolicy {
    pub storage: CodeStorage,
    pub ttl: Duration,
    /// Trailing window + cap for send throttling; `None` disables it.
    pub resend_window: Option<Duration>,
    pub resend_cap: Option<i64>,
    /// Confirm attempts before the record is force-expired; `None` disables.
    pub attempt_cap: Option<i32>,
}

impl OtpPolicy {
    /// Identity verification: hashed storage, short TTL, throttled sends,
    /// capped attempts.
    pub fn strict() -> Self {
        Self {
            storage: CodeStorage::Hashed,
            ttl: Duration::minutes(5),
            resend_window: Some(Duration::minutes(10)),
            resend_cap: Some(3),
            attempt_cap: Some(5),
        }
    }

    /// Document-signing confirmation: plaintext storage (resends re-deliver
    /// the same code), no throttle, no attempt cap.
    pub fn relaxed() -> Self {
        Self {
            storage: CodeStorage::Plain,
            ttl: Duration::minutes(5),
            resend_window: None,
            resend_cap: None,
            attempt_cap: None,
        }
    }

    /// The form a code takes in storage under this policy.
    pub fn stored_form(&self, code: &str) -> String {
        match self.storage {
            CodeStorage::Hashed => hash_code(code),
            CodeStorage::Plain => code.to_string(),
        }
    }

    /// Compare a submitted code against its stored form.
    pub fn code_matches(&self, submitted: &str, stored: &str) -> bool {
        match self.storage {
            CodeStorage::Hashed => hash_code(submitted) == stored,
            CodeStorage::Plain => submitted == stored,
        }
    }

    pub fn is_expired(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now > expires_at
    }
}

/// Six decimal digits, zero-padded.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

/// One-way hash of a code for storage (hex-encoded sha256).
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn hash_is_deterministic_and_one_way() {
        let a = hash_code("123456");
        let b = hash_code("123456");
        assert_eq!(a, b);
        assert_ne!(a, "123456");
        assert_ne!(a, hash_code("654321"));
    }

    #[test]
    fn strict_policy_hashes_codes() {
        let policy = OtpPolicy::strict();
        let stored = policy.stored_form("123456");
        assert_ne!(stored, "123456");
        assert!(policy.code_matches("123456", &stored));
        assert!(!policy.code_matches("000000", &stored));
    }

    #[test]
    fn relaxed_policy_stores_codes_in_clear() {
        let policy = OtpPolicy::relaxed();
        assert_eq!(policy.stored_form("123456"), "123456");
        assert!(policy.code_matches("123456", "123456"));
    }

    #[test]
    fn strict_policy_constants() {
        let policy = OtpPolicy::strict();
        assert_eq!(policy.ttl, Duration::minutes(5));
        assert_eq!(policy.resend_window, Some(Duration::minutes(10)));
        assert_eq!(policy.resend_cap, Some(3));
        assert_eq!(policy.attempt_cap, Some(5));
    }

    #[test]
    fn relaxed_policy_has_no_caps() {
        let policy = OtpPolicy::relaxed();
        assert!(policy.resend_window.is_none());
        assert!(policy.resend_cap.is_none());
        assert!(policy.attempt_cap.is_none());
    }

    #[test]
    fn expiry_is_strictly_after_deadline() {
        let policy = OtpPolicy::strict();
        let now = Utc::now();
        assert!(!policy.is_expired(now, now));
        assert!(policy.is_expired(now - Duration::seconds(1), now));
        assert!(!policy.is_expired(now + Duration::minutes(5), now));
    }
}
