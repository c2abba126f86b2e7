//! Referral edge repository implementation.
//!
//! Edges are insert-only: there is no update path once an edge exists.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set};

use super::entities::referral::{self, ActiveModel, Entity as ReferralEntity};
use crate::domain::Referral;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Referral repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// Record a referrer -> referred edge
    async fn create(&self, referred_id: i64, referred_by: i64) -> AppResult<Referral>;

    /// List all edges owned by a referrer
    async fn list_by_referrer(&self, referrer_id: i64) -> AppResult<Vec<Referral>>;
}

/// Concrete implementation of ReferralRepository backed by SeaORM
pub struct ReferralStore {
    db: Arc<DatabaseConnection>,
}

impl ReferralStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReferralRepository for ReferralStore {
    async fn create(&self, referred_id: i64, referred_by: i64) -> AppResult<Referral> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            referred_id: Set(referred_id),
            referred_by: Set(referred_by),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let model = active_model.insert(self.db.as_ref()).await.map_err(AppError::from)?;
        Ok(Referral::from(model))
    }

    async fn list_by_referrer(&self, referrer_id: i64) -> AppResult<Vec<Referral>> {
        let models = ReferralEntity::find()
            .filter(referral::Column::ReferredBy.eq(referrer_id))
            .filter(referral::Column::DeletedAt.is_null())
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Referral::from).collect())
    }
}
