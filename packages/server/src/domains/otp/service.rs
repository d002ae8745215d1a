//! Send, resend and confirm one-time codes under the strict and relaxed
//! policies.
//!
//! Cross-request coordination note: the attempt counter increments through a
//! single atomic UPDATE, but resend-throttle counting is a read-then-write
//! sequence. Two simultaneous sends can both observe the pre-insert count,
//! so the cap may trigger one send early or late. Counts only grow, so this
//! is tolerated rather than serialized.

use chrono::{DateTime, Utc};
use mobizon::MobizonService;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::common::AppError;
use crate::domains::auth::models::User;
use crate::domains::documents::DocumentService;
use crate::domains::otp::error::OtpError;
use crate::domains::otp::models::{SigningConfirmation, VerificationAttempt};
use crate::domains::otp::policy::{generate_code, OtpPolicy};

/// What a strict confirm should do with the latest verification attempt.
/// Pure - storage effects are applied by the caller. The acting variants
/// carry the record they decided on, so the caller never re-unwraps it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StrictDecision<'a> {
    /// No record, or the record was already used.
    RejectInvalid,
    /// The record aged out (or was force-expired by the attempt cap).
    RejectExpired,
    /// Live record, wrong code: count the attempt.
    Mismatch(&'a VerificationAttempt),
    /// Live record, right code.
    Match(&'a VerificationAttempt),
}

pub(crate) fn decide_strict_confirm<'a>(
    policy: &OtpPolicy,
    attempt: Option<&'a VerificationAttempt>,
    code: &str,
    now: DateTime<Utc>,
) -> StrictDecision<'a> {
    let Some(attempt) = attempt else {
        return StrictDecision::RejectInvalid;
    };
    if attempt.confirmed {
        return StrictDecision::RejectInvalid;
    }
    if policy.is_expired(attempt.expires_at, now) {
        return StrictDecision::RejectExpired;
    }
    if policy.code_matches(code, &attempt.code_hash) {
        StrictDecision::Match(attempt)
    } else {
        StrictDecision::Mismatch(attempt)
    }
}

/// Whether another send fits under the policy's trailing-window cap.
pub(crate) fn resend_allowed(policy: &OtpPolicy, recent_sends: i64) -> bool {
    match policy.resend_cap {
        Some(cap) => recent_sends < cap,
        None => true,
    }
}

/// A relaxed-policy record is matchable while unconfirmed and unexpired.
pub(crate) fn is_matchable(
    policy: &OtpPolicy,
    confirmation: &SigningConfirmation,
    now: DateTime<Utc>,
) -> bool {
    !confirmation.confirmed && !policy.is_expired(confirmation.sent_at + policy.ttl, now)
}

pub struct OtpService {
    pool: PgPool,
    gateway: Arc<MobizonService>,
    documents: Arc<DocumentService>,
    strict: OtpPolicy,
    relaxed: OtpPolicy,
}

impl OtpService {
    pub fn new(pool: PgPool, gateway: Arc<MobizonService>, documents: Arc<DocumentService>) -> Self {
        Self {
            pool,
            gateway,
            documents,
            strict: OtpPolicy::strict(),
            relaxed: OtpPolicy::relaxed(),
        }
    }

    // ----- strict policy: identity verification -----

    /// Send a fresh identity-verification code. Every send is a new code and
    /// a new row; only the hash is persisted.
    pub async fn send_user_code(&self, user_id: i64, phone: &str) -> Result<(), AppError> {
        if let Some(window) = self.strict.resend_window {
            let since = Utc::now() - window;
            let recent = VerificationAttempt::count_recent_sends(user_id, since, &self.pool).await?;
            if !resend_allowed(&self.strict, recent) {
                warn!(user_id, recent, "verification resend throttled");
                return Err(OtpError::ResendThrottled.into());
            }
        }

        let code = generate_code();
        let sent_at = Utc::now();
        let expires_at = sent_at + self.strict.ttl;

        VerificationAttempt::create(
            user_id,
            &self.strict.stored_form(&code),
            sent_at,
            expires_at,
            &self.pool,
        )
        .await?;

        self.gateway
            .send_sms(phone, &confirmation_text(&code))
            .await
            .map_err(OtpError::Dispatch)?;

        info!(user_id, "verification code sent");
        Ok(())
    }

    /// Check a submitted identity code against the latest attempt row only.
    /// On success the user's verification flag flips (idempotently).
    pub async fn confirm_user_code(&self, user_id: i64, code: &str) -> Result<(), AppError> {
        let attempt = VerificationAttempt::latest_for_user(user_id, &self.pool).await?;

        match decide_strict_confirm(&self.strict, attempt.as_ref(), code, Utc::now()) {
            StrictDecision::RejectInvalid => Err(OtpError::CodeInvalid.into()),
            StrictDecision::RejectExpired => Err(OtpError::CodeExpired.into()),
            StrictDecision::Mismatch(attempt) => {
                let attempts =
                    VerificationAttempt::increment_attempts(attempt.id, &self.pool).await?;
                if let Some(cap) = self.strict.attempt_cap {
                    if attempts >= cap {
                        // Revoke what's left of this code; the user must
                        // request a fresh one.
                        VerificationAttempt::expire_now(attempt.id, &self.pool).await?;
                        warn!(user_id, attempts, "verification attempts exhausted");
                        return Err(OtpError::TooManyAttempts.into());
                    }
                }
                Err(OtpError::CodeInvalid.into())
            }
            StrictDecision::Match(attempt) => {
                VerificationAttempt::mark_confirmed(attempt.id, &self.pool).await?;
                User::mark_verified(user_id, &self.pool).await?;
                info!(user_id, "phone verified");
                Ok(())
            }
        }
    }

    // ----- relaxed policy: document-signing confirmation -----

    /// Send a signing code for a document. No throttle; the code is stored
    /// in clear so resends can re-deliver it.
    pub async fn send_document_code(&self, document_id: i64, phone: &str) -> Result<(), AppError> {
        let code = generate_code();

        self.gateway
            .send_sms(phone, &confirmation_text(&code))
            .await
            .map_err(OtpError::Dispatch)?;

        SigningConfirmation::create(
            document_id,
            phone,
            &self.relaxed.stored_form(&code),
            Utc::now(),
            &self.pool,
        )
        .await?;

        info!(document_id, "signing code sent");
        Ok(())
    }

    /// Re-deliver the live code if one exists; otherwise fall back to a
    /// fresh send, which needs a phone number.
    pub async fn resend_document_code(
        &self,
        document_id: i64,
        phone: Option<&str>,
    ) -> Result<(), AppError> {
        let existing = SigningConfirmation::latest_for_document(document_id, &self.pool).await?;

        match existing {
            Some(confirmation) if is_matchable(&self.relaxed, &confirmation, Utc::now()) => {
                self.gateway
                    .send_sms(&confirmation.phone, &confirmation_text(&confirmation.sms_code))
                    .await
                    .map_err(OtpError::Dispatch)?;
                info!(document_id, "signing code re-sent");
                Ok(())
            }
            _ => {
                let phone = phone
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::BadRequest(
                            "phone required for first or expired resend".to_string(),
                        )
                    })?;
                self.send_document_code(document_id, phone).await
            }
        }
    }

    /// Match a submitted signing code. False, expired and used codes are a
    /// soft non-match, not an error; a genuine match signs the document.
    pub async fn confirm_document_code(
        &self,
        document_id: i64,
        code: &str,
    ) -> Result<bool, AppError> {
        let confirmation =
            SigningConfirmation::find_by_document_and_code(document_id, code, &self.pool).await?;

        let Some(confirmation) = confirmation else {
            return Ok(false);
        };
        if !is_matchable(&self.relaxed, &confirmation, Utc::now()) {
            return Ok(false);
        }

        SigningConfirmation::mark_confirmed(confirmation.id, Utc::now(), &self.pool).await?;
        self.documents.sign_by_confirmation(document_id).await?;

        info!(document_id, "signing code confirmed");
        Ok(true)
    }

    pub async fn latest_confirmation(
        &self,
        document_id: i64,
    ) -> Result<Option<SigningConfirmation>, AppError> {
        Ok(SigningConfirmation::latest_for_document(document_id, &self.pool).await?)
    }

    pub async fn delete_confirmations(&self, document_id: i64) -> Result<(), AppError> {
        SigningConfirmation::delete_for_document(document_id, &self.pool).await?;
        Ok(())
    }
}

fn confirmation_text(code: &str) -> String {
    format!("DealDesk confirmation code: {code}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attempt(confirmed: bool, expires_in: Duration, code: &str) -> VerificationAttempt {
        let now = Utc::now();
        VerificationAttempt {
            id: 1,
            user_id: 1,
            code_hash: OtpPolicy::strict().stored_form(code),
            sent_at: now,
            expires_at: now + expires_in,
            confirmed,
            attempts: 0,
        }
    }

    fn confirmation(confirmed: bool, sent_ago: Duration) -> SigningConfirmation {
        SigningConfirmation {
            id: 1,
            document_id: 9,
            phone: "+77010000000".to_string(),
            sms_code: "123456".to_string(),
            sent_at: Utc::now() - sent_ago,
            confirmed,
            confirmed_at: None,
        }
    }

    #[test]
    fn strict_confirm_without_record_is_invalid() {
        let policy = OtpPolicy::strict();
        assert!(matches!(
            decide_strict_confirm(&policy, None, "123456", Utc::now()),
            StrictDecision::RejectInvalid
        ));
    }

    #[test]
    fn strict_confirm_on_used_record_is_invalid() {
        let policy = OtpPolicy::strict();
        let used = attempt(true, Duration::minutes(5), "123456");
        assert!(matches!(
            decide_strict_confirm(&policy, Some(&used), "123456", Utc::now()),
            StrictDecision::RejectInvalid
        ));
    }

    #[test]
    fn strict_confirm_on_expired_record_is_expired() {
        let policy = OtpPolicy::strict();
        let stale = attempt(false, Duration::minutes(-1), "123456");
        assert!(matches!(
            decide_strict_confirm(&policy, Some(&stale), "123456", Utc::now()),
            StrictDecision::RejectExpired
        ));
    }

    #[test]
    fn strict_confirm_distinguishes_match_from_mismatch() {
        let policy = OtpPolicy::strict();
        let live = attempt(false, Duration::minutes(5), "123456");

        // The acting variants hand back the record they decided on.
        match decide_strict_confirm(&policy, Some(&live), "123456", Utc::now()) {
            StrictDecision::Match(matched) => assert_eq!(matched.id, live.id),
            other => panic!("expected Match, got {other:?}"),
        }
        match decide_strict_confirm(&policy, Some(&live), "000000", Utc::now()) {
            StrictDecision::Mismatch(missed) => assert_eq!(missed.id, live.id),
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    // Five wrong confirms exhaust the cap; afterwards even the correct code
    // is rejected as expired because the record was force-expired.
    #[test]
    fn exhausted_attempts_expire_the_record_for_good() {
        let policy = OtpPolicy::strict();
        let cap = policy.attempt_cap.unwrap();

        let mut record = attempt(false, Duration::minutes(5), "123456");
        for wrong in 0..cap {
            assert!(matches!(
                decide_strict_confirm(&policy, Some(&record), "999999", Utc::now()),
                StrictDecision::Mismatch(_)
            ));
            record.attempts = wrong + 1;
        }
        assert!(record.attempts >= cap);

        // Service force-expires on the capping attempt.
        record.expires_at = Utc::now() - Duration::seconds(1);
        assert!(matches!(
            decide_strict_confirm(&policy, Some(&record), "123456", Utc::now()),
            StrictDecision::RejectExpired
        ));
    }

    #[test]
    fn resend_throttle_trips_on_the_fourth_send() {
        let policy = OtpPolicy::strict();
        // First three sends observe counts 0..2 and pass; the fourth sees 3.
        assert!(resend_allowed(&policy, 0));
        assert!(resend_allowed(&policy, 2));
        assert!(!resend_allowed(&policy, 3));
        assert!(!resend_allowed(&policy, 10));
    }

    #[test]
    fn relaxed_policy_never_throttles() {
        assert!(resend_allowed(&OtpPolicy::relaxed(), 1_000));
    }

    #[test]
    fn relaxed_record_matchable_only_while_live() {
        let policy = OtpPolicy::relaxed();
        let now = Utc::now();

        assert!(is_matchable(&policy, &confirmation(false, Duration::minutes(1)), now));
        assert!(!is_matchable(&policy, &confirmation(true, Duration::minutes(1)), now));
        assert!(!is_matchable(&policy, &confirmation(false, Duration::minutes(6)), now));
    }
}
