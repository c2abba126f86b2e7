//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and
//! infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, Persistence};
use crate::services::{AuthService, Authenticator, ReferralManager, ReferralService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Referral service
    pub referral_service: Arc<dyn ReferralService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from a connected database and config.
    ///
    /// Wires the Unit of Work into both services; this is the production
    /// initialization path.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), config));
        let referral_service = Arc::new(ReferralManager::new(uow));

        Self {
            auth_service,
            referral_service,
            database,
        }
    }

    /// Create application state with manually injected services.
    ///
    /// Used by tests to substitute mock services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        referral_service: Arc<dyn ReferralService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            referral_service,
            database,
        }
    }
}
