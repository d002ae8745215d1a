//! Pure transition and guard rules for the document lifecycle. The service
//! layer loads rows and applies these; keeping them pure keeps the legal
//! rules testable without a database.

use serde::Deserialize;
use thiserror::Error;

use crate::domains::authz::Role;
use crate::domains::documents::models::DocumentStatus;

/// Role/ownership refusals render as 403, wrong-source-state refusals as
/// 409; callers need to tell them apart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("forbidden")]
    Forbidden,

    #[error("invalid document status")]
    InvalidState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Return,
}

/// Submit: the deal owner or any elevated role; read-only never mutates.
pub fn ensure_can_submit(role: Role, is_owner: bool) -> Result<(), TransitionError> {
    if role.is_read_only() {
        return Err(TransitionError::Forbidden);
    }
    if is_owner || role.is_elevated() {
        Ok(())
    } else {
        Err(TransitionError::Forbidden)
    }
}

/// Review: operational authority only - ownership alone is never enough.
pub fn ensure_can_review(role: Role) -> Result<(), TransitionError> {
    if role.is_elevated() {
        Ok(())
    } else {
        Err(TransitionError::Forbidden)
    }
}

/// Explicit sign: senior roles only.
pub fn ensure_can_sign(role: Role) -> Result<(), TransitionError> {
    if role.is_senior() {
        Ok(())
    } else {
        Err(TransitionError::Forbidden)
    }
}

pub fn submit(status: DocumentStatus) -> Result<DocumentStatus, TransitionError> {
    match status {
        DocumentStatus::Draft => Ok(DocumentStatus::UnderReview),
        _ => Err(TransitionError::InvalidState),
    }
}

pub fn review(
    status: DocumentStatus,
    action: ReviewAction,
) -> Result<DocumentStatus, TransitionError> {
    match status {
        DocumentStatus::UnderReview => Ok(match action {
            ReviewAction::Approve => DocumentStatus::Approved,
            ReviewAction::Return => DocumentStatus::Returned,
        }),
        _ => Err(TransitionError::InvalidState),
    }
}

pub fn sign(status: DocumentStatus) -> Result<DocumentStatus, TransitionError> {
    match status {
        DocumentStatus::Approved | DocumentStatus::Returned => Ok(DocumentStatus::Signed),
        _ => Err(TransitionError::InvalidState),
    }
}

/// Sign driven by a confirmed one-time code rather than a role check.
///
/// Whether `under_review` is an allowed source - i.e. whether a confirmed
/// code may skip the review gate - is policy, not a fixed rule.
pub fn confirm_driven_sign(
    status: DocumentStatus,
    sign_from_review: bool,
) -> Result<DocumentStatus, TransitionError> {
    match status {
        DocumentStatus::Approved | DocumentStatus::Returned => Ok(DocumentStatus::Signed),
        DocumentStatus::UnderReview if sign_from_review => Ok(DocumentStatus::Signed),
        _ => Err(TransitionError::InvalidState),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_only_from_draft() {
        assert_eq!(submit(DocumentStatus::Draft), Ok(DocumentStatus::UnderReview));
        for status in [
            DocumentStatus::UnderReview,
            DocumentStatus::Approved,
            DocumentStatus::Returned,
            DocumentStatus::Signed,
        ] {
            assert_eq!(submit(status), Err(TransitionError::InvalidState));
        }
    }

    #[test]
    fn review_only_from_under_review() {
        assert_eq!(
            review(DocumentStatus::UnderReview, ReviewAction::Approve),
            Ok(DocumentStatus::Approved)
        );
        assert_eq!(
            review(DocumentStatus::UnderReview, ReviewAction::Return),
            Ok(DocumentStatus::Returned)
        );
        // Neither a fresh draft nor a signed document is reviewable.
        for status in [DocumentStatus::Draft, DocumentStatus::Signed] {
            assert_eq!(
                review(status, ReviewAction::Approve),
                Err(TransitionError::InvalidState)
            );
        }
    }

    #[test]
    fn explicit_sign_requires_a_reviewed_document() {
        assert_eq!(sign(DocumentStatus::Approved), Ok(DocumentStatus::Signed));
        assert_eq!(sign(DocumentStatus::Returned), Ok(DocumentStatus::Signed));
        for status in [
            DocumentStatus::Draft,
            DocumentStatus::UnderReview,
            DocumentStatus::Signed,
        ] {
            assert_eq!(sign(status), Err(TransitionError::InvalidState));
        }
    }

    #[test]
    fn confirm_driven_sign_review_bypass_is_gated_by_policy() {
        assert_eq!(
            confirm_driven_sign(DocumentStatus::UnderReview, true),
            Ok(DocumentStatus::Signed)
        );
        assert_eq!(
            confirm_driven_sign(DocumentStatus::UnderReview, false),
            Err(TransitionError::InvalidState)
        );
        // Both settings accept reviewed documents and reject the rest.
        for flag in [true, false] {
            assert_eq!(
                confirm_driven_sign(DocumentStatus::Approved, flag),
                Ok(DocumentStatus::Signed)
            );
            assert_eq!(
                confirm_driven_sign(DocumentStatus::Returned, flag),
                Ok(DocumentStatus::Signed)
            );
            assert_eq!(
                confirm_driven_sign(DocumentStatus::Draft, flag),
                Err(TransitionError::InvalidState)
            );
            assert_eq!(
                confirm_driven_sign(DocumentStatus::Signed, flag),
                Err(TransitionError::InvalidState)
            );
        }
    }

    #[test]
    fn submit_guard() {
        assert!(ensure_can_submit(Role::Sales, true).is_ok());
        assert_eq!(
            ensure_can_submit(Role::Sales, false),
            Err(TransitionError::Forbidden)
        );
        assert!(ensure_can_submit(Role::Operations, false).is_ok());
        // Audit is read-only even when it somehow owns the deal.
        assert_eq!(
            ensure_can_submit(Role::Audit, true),
            Err(TransitionError::Forbidden)
        );
    }

    #[test]
    fn review_guard_ignores_ownership() {
        assert_eq!(ensure_can_review(Role::Sales), Err(TransitionError::Forbidden));
        assert_eq!(ensure_can_review(Role::Audit), Err(TransitionError::Forbidden));
        assert!(ensure_can_review(Role::Operations).is_ok());
        assert!(ensure_can_review(Role::Management).is_ok());
        assert!(ensure_can_review(Role::Admin).is_ok());
    }

    #[test]
    fn sign_guard_is_senior_only() {
        assert_eq!(ensure_can_sign(Role::Operations), Err(TransitionError::Forbidden));
        assert!(ensure_can_sign(Role::Management).is_ok());
        assert!(ensure_can_sign(Role::Admin).is_ok());
    }
}
