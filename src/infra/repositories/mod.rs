//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod referral_repository;
mod user_repository;

pub use referral_repository::{ReferralRepository, ReferralStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use referral_repository::MockReferralRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
