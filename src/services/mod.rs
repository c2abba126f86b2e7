//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, with the Unit of Work providing repository
//! access and transaction management.

mod auth_service;
mod referral_service;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use referral_service::{ActiveReferralCode, ReferralManager, ReferralService};
