//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Active referral code (None = no code issued)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    /// Expiry of the referral code, checked at read time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the stored referral code has passed its expiry.
    ///
    /// Expiry is a read-time classification: an expired code stays stored
    /// until it is deleted or overwritten.
    pub fn referral_code_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.referral_expiry, Some(expiry) if expiry < now)
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = 42)]
    pub id: i64,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Active referral code, if any
    #[schema(example = "b3e6a1ac-2f64-4f3c-9f2a-6f4b1f0c8d21")]
    pub referral_code: Option<String>,
    /// Referral code expiry, if any
    pub referral_expiry: Option<DateTime<Utc>>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            referral_code: user.referral_code,
            referral_expiry: user.referral_expiry,
            created_at: user.created_at,
        }
    }
}
