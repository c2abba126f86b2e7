//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the one cross-aggregate
//! operation that must be atomic: inserting a referred user together
//! with its referral edge. Everything else is a single-row write and
//! relies on the store's uniqueness constraints for consistency.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, DatabaseConnection, DatabaseTransaction, IsolationLevel, NotSet,
    Set, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::entities::{referral, user};
use super::repositories::{ReferralRepository, ReferralStore, UserRepository, UserStore};
use crate::domain::User;
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories plus the atomic
/// referred-registration write.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get referral repository
    fn referrals(&self) -> Arc<dyn ReferralRepository>;

    /// Insert a new user and its referral edge in one transaction.
    ///
    /// If the edge insert fails the user row is rolled back and the
    /// whole operation fails; a referred user never exists without its
    /// edge.
    async fn create_referred_user(
        &self,
        email: String,
        password_hash: String,
        referrer_id: i64,
    ) -> AppResult<User>;
}

/// Transaction context providing repository access within a transaction.
///
/// All writes performed through this context are part of the same
/// database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Insert a user row inside the transaction.
    pub async fn insert_user(&self, email: String, password_hash: String) -> AppResult<User> {
        let now = Utc::now();
        let active_model = user::ActiveModel {
            id: NotSet,
            email: Set(email),
            password_hash: Set(password_hash),
            referral_code: Set(None),
            referral_expiry: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    /// Insert a referral edge inside the transaction.
    pub async fn insert_referral(&self, referred_id: i64, referred_by: i64) -> AppResult<()> {
        let now = Utc::now();
        let active_model = referral::ActiveModel {
            id: NotSet,
            referred_id: Set(referred_id),
            referred_by: Set(referred_by),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(())
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    user_repo: Arc<UserStore>,
    referral_repo: Arc<ReferralStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let referral_repo = Arc::new(ReferralStore::new(db.clone()));
        Self {
            db,
            user_repo,
            referral_repo,
        }
    }

    /// Run a closure inside a ReadCommitted transaction, committing on
    /// success and rolling back on error.
    async fn execute_transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        // Bind before matching so the callback future (which borrows the
        // transaction) is dropped before commit/rollback take ownership.
        let outcome = f(ctx).await;

        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn referrals(&self) -> Arc<dyn ReferralRepository> {
        self.referral_repo.clone()
    }

    async fn create_referred_user(
        &self,
        email: String,
        password_hash: String,
        referrer_id: i64,
    ) -> AppResult<User> {
        self.execute_transaction(move |ctx| {
            Box::pin(async move {
                let new_user = ctx.insert_user(email, password_hash).await?;
                ctx.insert_referral(new_user.id, referrer_id).await?;
                Ok(new_user)
            })
        })
        .await
    }
}
