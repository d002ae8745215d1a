//! Role-gated application of the document lifecycle rules.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::common::AppError;
use crate::domains::authz::Role;
use crate::domains::documents::models::{Deal, Document, DocumentStatus};
use crate::domains::documents::transitions;
use crate::domains::documents::transitions::ReviewAction;

/// Lifecycle policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct DocumentPolicy {
    /// Whether a confirmed signing code may take a document from
    /// `under_review` straight to `signed`, skipping the review gate.
    pub sign_from_review: bool,
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        // Matches the historical behavior of the signing flow.
        Self {
            sign_from_review: true,
        }
    }
}

pub struct DocumentService {
    pool: PgPool,
    policy: DocumentPolicy,
}

impl DocumentService {
    pub fn new(pool: PgPool, policy: DocumentPolicy) -> Self {
        Self { pool, policy }
    }

    /// draft -> under_review. Caller must own the underlying deal or hold an
    /// elevated role.
    pub async fn submit(&self, id: i64, actor_id: i64, role: Role) -> Result<Document, AppError> {
        let document = self.load(id).await?;
        let deal = Deal::find_by_id(document.deal_id, &self.pool)
            .await?
            .ok_or(AppError::NotFound)?;

        transitions::ensure_can_submit(role, deal.owner_id == actor_id)?;
        let next = transitions::submit(document.status)?;

        let updated = Document::update_status(id, next, &self.pool).await?;
        info!(document_id = id, actor_id, "document submitted for review");
        Ok(updated)
    }

    /// under_review -> approved | returned. Operational roles only;
    /// ownership alone never suffices.
    pub async fn review(
        &self,
        id: i64,
        action: ReviewAction,
        actor_id: i64,
        role: Role,
    ) -> Result<Document, AppError> {
        transitions::ensure_can_review(role)?;

        let document = self.load(id).await?;
        let next = transitions::review(document.status, action)?;

        let updated = Document::update_status(id, next, &self.pool).await?;
        info!(document_id = id, actor_id, ?action, status = ?next, "document reviewed");
        Ok(updated)
    }

    /// approved | returned -> signed, by explicit senior-role action.
    pub async fn sign(&self, id: i64, actor_id: i64, role: Role) -> Result<Document, AppError> {
        transitions::ensure_can_sign(role)?;

        let document = self.load(id).await?;
        let next = transitions::sign(document.status)?;
        debug_assert_eq!(next, DocumentStatus::Signed);

        let signed = Document::mark_signed(id, Utc::now(), &self.pool).await?;
        info!(document_id = id, actor_id, "document signed");
        Ok(signed)
    }

    /// Sign transition driven by a confirmed one-time code. No role check:
    /// the confirmed code itself is the authorization.
    pub async fn sign_by_confirmation(&self, id: i64) -> Result<Document, AppError> {
        let document = self.load(id).await?;
        let next = transitions::confirm_driven_sign(document.status, self.policy.sign_from_review)?;
        debug_assert_eq!(next, DocumentStatus::Signed);

        let signed = Document::mark_signed(id, Utc::now(), &self.pool).await?;
        info!(document_id = id, "document signed via sms confirmation");
        Ok(signed)
    }

    async fn load(&self, id: i64) -> Result<Document, AppError> {
        Document::find_by_id(id, &self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }
}
