//! Login, refresh rotation and revocation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::common::AppError;
use crate::domains::auth::error::{AuthError, TokenError};
use crate::domains::auth::jwt::JwtService;
use crate::domains::auth::models::User;
use crate::domains::auth::password::{hash_password, verify_password};
use crate::domains::auth::tokens::new_refresh_token;
use crate::domains::authz::Role;

const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub company_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Whether a login may proceed. Pure - token minting and persistence are
/// applied by the caller.
///
/// The password is verified before the verification flag is consulted, so
/// only a caller who already holds the right password learns whether the
/// phone is verified.
pub(crate) fn decide_login(user: &User, password: &str) -> Result<(), AuthError> {
    if !verify_password(password.trim(), &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }

    if !user.is_verified {
        return Err(AuthError::NotVerified);
    }

    Ok(())
}

/// Pre-swap check of a refresh rotation: expiry and revocation are reported
/// precisely before the conditional swap is attempted.
pub(crate) fn decide_rotation(user: Option<&User>, now: DateTime<Utc>) -> Result<(), TokenError> {
    let Some(user) = user else {
        return Err(TokenError::Invalid);
    };
    if user.refresh_revoked {
        return Err(TokenError::Revoked);
    }
    match user.refresh_expires_at {
        Some(expires_at) if expires_at > now => Ok(()),
        _ => Err(TokenError::Expired),
    }
}

/// Outcome of the conditional swap itself. Zero rows affected means a racing
/// caller rotated first (or the token was already replaced); the loser gets
/// `Invalid`, and a replayed pre-rotation token can never match again.
pub(crate) fn settle_rotation<T>(winner: Option<T>) -> Result<T, TokenError> {
    winner.ok_or(TokenError::Invalid)
}

pub struct CredentialService {
    pool: PgPool,
    jwt: JwtService,
    decoy_hash: String,
}

impl CredentialService {
    pub fn new(pool: PgPool, jwt: JwtService) -> anyhow::Result<Self> {
        let decoy_hash = hash_password("decoy")?;
        Ok(Self {
            pool,
            jwt,
            decoy_hash,
        })
    }

    /// Authenticate and mint a token pair.
    ///
    /// Unknown email burns a verify against the decoy hash so the miss path
    /// costs roughly the same as a real password check.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AppError> {
        let email = email.trim();
        debug!(email, "login attempt");

        let Some(user) = User::find_by_email(email, &self.pool).await? else {
            let _ = verify_password(password, &self.decoy_hash);
            return Err(AuthError::InvalidCredentials.into());
        };
        decide_login(&user, password)?;

        let pair = self.issue_tokens(&user).await?;
        info!(user_id = user.id, role = ?user.role, "login successful");
        Ok((user, pair))
    }

    /// Exchange a refresh token for a fresh pair, single-use per rotation.
    pub async fn rotate_refresh(&self, old_token: &str) -> Result<TokenPair, AppError> {
        let old_token = old_token.trim();

        // The swap's WHERE clause re-checks expiry and revocation, so a
        // racing caller cannot slip through on a stale read here.
        let user = User::find_by_refresh_token(old_token, &self.pool).await?;
        decide_rotation(user.as_ref(), Utc::now())?;

        let new_token = new_refresh_token();
        let new_expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS);

        let swapped = User::rotate_refresh(old_token, &new_token, new_expires_at, &self.pool).await?;
        let rotated = settle_rotation(swapped)?;

        let access_token = self.jwt.create_token(rotated.id, rotated.role)?;
        debug!(user_id = rotated.id, "refresh token rotated");

        Ok(TokenPair {
            access_token,
            refresh_token: new_token,
        })
    }

    /// Invalidate the current session (logout or administrative action).
    pub async fn revoke(&self, user_id: i64) -> Result<(), AppError> {
        User::clear_refresh(user_id, &self.pool).await?;
        info!(user_id, "refresh token revoked");
        Ok(())
    }

    /// Public registration: always a Sales account, unverified until the
    /// phone code is confirmed.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        if request.password.trim().is_empty() {
            return Err(AppError::BadRequest("password is required".to_string()));
        }
        if request.phone.trim().is_empty() {
            return Err(AppError::BadRequest("phone is required".to_string()));
        }

        let password_hash = hash_password(request.password.trim())?;

        let user = User::insert(
            request.company_name.trim(),
            request.email.trim(),
            &password_hash,
            Role::Sales,
            request.phone.trim(),
            &self.pool,
        )
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::BadRequest("email already registered".to_string())
            }
            _ => AppError::Database(e),
        })?;

        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    async fn issue_tokens(&self, user: &User) -> Result<TokenPair, AppError> {
        let access_token = self.jwt.create_token(user.id, user.role)?;

        let refresh_token = new_refresh_token();
        let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS);
        User::store_refresh(user.id, &refresh_token, expires_at, &self.pool).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(password: &str, is_verified: bool) -> User {
        User {
            id: 1,
            company_name: "Acme".to_string(),
            email: "sales@acme.example".to_string(),
            password_hash: hash_password(password).unwrap(),
            role: Role::Sales,
            phone: "+77010000000".to_string(),
            is_verified,
            verified_at: None,
            refresh_token: None,
            refresh_expires_at: None,
            refresh_revoked: false,
            created_at: Utc::now(),
        }
    }

    fn user_with_refresh(expires_in: Duration, revoked: bool) -> User {
        let mut user = user("hunter2", true);
        user.refresh_token = Some("deadbeef".to_string());
        user.refresh_expires_at = Some(Utc::now() + expires_in);
        user.refresh_revoked = revoked;
        user
    }

    // An unverified account with the correct password is refused with
    // NotVerified, never granted a token.
    #[test]
    fn correct_password_on_unverified_account_is_not_verified() {
        let unverified = user("hunter2", false);
        assert_eq!(
            decide_login(&unverified, "hunter2"),
            Err(AuthError::NotVerified)
        );
    }

    // The wrong password never learns the verification state: it gets
    // InvalidCredentials even on an unverified account.
    #[test]
    fn wrong_password_is_checked_before_verification_state() {
        let unverified = user("hunter2", false);
        assert_eq!(
            decide_login(&unverified, "wrong"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn verified_account_with_correct_password_is_accepted() {
        let verified = user("hunter2", true);
        assert_eq!(decide_login(&verified, "hunter2"), Ok(()));
    }

    #[test]
    fn rotation_of_unknown_token_is_invalid() {
        assert_eq!(decide_rotation(None, Utc::now()), Err(TokenError::Invalid));
    }

    #[test]
    fn rotation_reports_revocation_and_expiry_precisely() {
        let revoked = user_with_refresh(Duration::days(1), true);
        assert_eq!(
            decide_rotation(Some(&revoked), Utc::now()),
            Err(TokenError::Revoked)
        );

        let expired = user_with_refresh(Duration::days(-1), false);
        assert_eq!(
            decide_rotation(Some(&expired), Utc::now()),
            Err(TokenError::Expired)
        );

        let live = user_with_refresh(Duration::days(1), false);
        assert_eq!(decide_rotation(Some(&live), Utc::now()), Ok(()));
    }

    // Of N racing rotations with the same token, the store matches exactly
    // one row; every loser observes zero rows and fails with Invalid. A
    // replayed pre-rotation token takes the same path: it no longer matches,
    // so it can never succeed again.
    #[test]
    fn swap_loser_and_replayed_token_get_invalid() {
        let winner = settle_rotation(Some(user_with_refresh(Duration::days(1), false)));
        assert!(winner.is_ok());

        assert_eq!(
            settle_rotation::<User>(None).unwrap_err(),
            TokenError::Invalid
        );
    }
}
