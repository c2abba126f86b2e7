//! Referral service - referral-code lifecycle and the referral graph.
//!
//! Code expiry is enforced at read time on the lookup-by-email path only.
//! Redemption (`register_with_referral`) deliberately skips the expiry
//! check, matching the behavior the rest of the system was built around;
//! the asymmetry is pinned by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::{Password, Referral, ReferralCode, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// A user's stored referral code with its expiry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveReferralCode {
    /// The shareable code
    #[schema(example = "b3e6a1ac-2f64-4f3c-9f2a-6f4b1f0c8d21")]
    pub code: String,
    /// Expiry timestamp, if one was set
    pub expiry: Option<DateTime<Utc>>,
}

/// Referral service trait for dependency injection.
#[async_trait]
pub trait ReferralService: Send + Sync {
    /// Issue a fresh referral code for a user, replacing any prior one.
    ///
    /// The expiry is stored as given; nothing rejects a timestamp that is
    /// already in the past.
    async fn create_referral_code(&self, user_id: i64, expiry: DateTime<Utc>) -> AppResult<User>;

    /// Clear a user's referral code and expiry. Idempotent.
    async fn delete_referral_code(&self, user_id: i64) -> AppResult<User>;

    /// Look up a user's referral code by their email.
    async fn get_referral_code_by_email(&self, email: &str) -> AppResult<ActiveReferralCode>;

    /// Register a new user under someone else's referral code.
    async fn register_with_referral(
        &self,
        code: &str,
        email: String,
        password: String,
    ) -> AppResult<User>;

    /// List the referral edges owned by a referrer. Empty when none.
    async fn get_referrals(&self, user_id: i64) -> AppResult<Vec<Referral>>;
}

/// Concrete implementation of ReferralService using Unit of Work.
pub struct ReferralManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReferralManager<U> {
    /// Create new referral service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReferralService for ReferralManager<U> {
    async fn create_referral_code(&self, user_id: i64, expiry: DateTime<Utc>) -> AppResult<User> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;

        // Fresh code unconditionally replaces whatever was stored
        let code = ReferralCode::generate();
        self.uow
            .users()
            .set_referral_code(user.id, Some(code.into_string()), Some(expiry))
            .await
    }

    async fn delete_referral_code(&self, user_id: i64) -> AppResult<User> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;

        self.uow.users().set_referral_code(user.id, None, None).await
    }

    async fn get_referral_code_by_email(&self, email: &str) -> AppResult<ActiveReferralCode> {
        let user = self.uow.users().find_by_email(email).await?.ok_or_not_found()?;

        if user.referral_code_expired(Utc::now()) {
            return Err(AppError::CodeExpired);
        }

        match user.referral_code {
            Some(code) => Ok(ActiveReferralCode {
                code,
                expiry: user.referral_expiry,
            }),
            None => Err(AppError::NoCodeFound),
        }
    }

    async fn register_with_referral(
        &self,
        code: &str,
        email: String,
        password: String,
    ) -> AppResult<User> {
        // No expiry check here: an expired code still redeems
        let referrer = self
            .uow
            .users()
            .find_by_referral_code(code)
            .await?
            .ok_or(AppError::InvalidReferralCode)?;

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let password_hash = Password::new(&password)?.into_string();

        // User row and referral edge commit or roll back together
        self.uow
            .create_referred_user(email, password_hash, referrer.id)
            .await
    }

    async fn get_referrals(&self, user_id: i64) -> AppResult<Vec<Referral>> {
        self.uow.referrals().list_by_referrer(user_id).await
    }
}
