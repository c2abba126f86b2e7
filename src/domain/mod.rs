//! Domain layer - Core business entities and logic
//!
//! Contains the domain models that represent business concepts
//! independent of infrastructure concerns.

pub mod password;
pub mod referral;
pub mod user;

pub use password::Password;
pub use referral::{Referral, ReferralCode};
pub use user::{User, UserResponse};
