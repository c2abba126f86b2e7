//! Referral edge entity and referral code value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A directed referrer -> referred relationship.
///
/// Created exactly once per successful referred registration and never
/// updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Referral {
    /// Unique edge identifier
    #[schema(example = 7)]
    pub id: i64,
    /// Id of the user who registered with the code
    #[schema(example = 42)]
    pub referred_id: i64,
    /// Id of the user who owns the code
    #[schema(example = 1)]
    pub referred_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing, default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Opaque referral code value object.
///
/// Codes are random high-entropy identifiers; collisions are treated as
/// negligible and there is no retry on the unique constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralCode(String);

impl ReferralCode {
    /// Generate a fresh code.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}
