//! Authentication service - registration, login, and token issuance.
//!
//! Owns the credential path: plaintext passwords stop here, everything
//! downstream only ever sees the Argon2 hash.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::password::DUMMY_HASH;
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, email: String, password: String) -> AppResult<User>;

    /// Login and return a signed JWT
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify a JWT and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate a JWT for a user id
fn generate_token(user_id: i64, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, email: String, password: String) -> AppResult<User> {
        // Best-effort pre-check. Two concurrent registrations can both pass
        // it; the store's unique constraint on email is the backstop and
        // surfaces the loser as a database error.
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let password_hash = Password::new(&password)?.into_string();
        self.uow.users().create(email, password_hash).await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user_result = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash when the user doesn't exist so the
        // timing doesn't reveal which emails are registered.
        let password_hash = match &user_result {
            Some(user) => user.password_hash.as_str(),
            None => DUMMY_HASH,
        };

        let password_valid = Password::from_hash(password_hash.to_string()).verify(&password);

        let Some(user) = user_result.filter(|_| password_valid) else {
            // One generic error for unknown email and wrong password
            return Err(AppError::InvalidCredentials);
        };

        generate_token(user.id, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockUserRepository;
    use crate::services::testing::{test_config, test_user, TestUnitOfWork};

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(test_user(1))));
        users.expect_create().never();

        let uow = TestUnitOfWork::with_users(users);
        let service = Authenticator::new(Arc::new(uow), test_config());

        let result = service
            .register("taken@example.com".to_string(), "password123".to_string())
            .await;
        assert!(matches!(result.unwrap_err(), AppError::EmailTaken));
    }

    #[tokio::test]
    async fn register_stores_hash_not_plaintext() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_create().returning(|email, hash| {
            let mut user = test_user(1);
            user.email = email;
            user.password_hash = hash;
            Ok(user)
        });

        let uow = TestUnitOfWork::with_users(users);
        let service = Authenticator::new(Arc::new(uow), test_config());

        let user = service
            .register("new@example.com".to_string(), "password123".to_string())
            .await
            .unwrap();

        assert_ne!(user.password_hash, "password123");
        assert!(Password::from_hash(user.password_hash).verify("password123"));
    }

    #[tokio::test]
    async fn login_unknown_email_and_wrong_password_are_indistinguishable() {
        // Unknown email
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        let service = Authenticator::new(Arc::new(TestUnitOfWork::with_users(users)), test_config());
        let unknown = service
            .login("ghost@example.com".to_string(), "password123".to_string())
            .await
            .unwrap_err();

        // Known email, wrong password
        let hash = Password::new("correct-password").unwrap().into_string();
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |_| {
            let mut user = test_user(1);
            user.password_hash = hash.clone();
            Ok(Some(user))
        });
        let service = Authenticator::new(Arc::new(TestUnitOfWork::with_users(users)), test_config());
        let wrong = service
            .login("test@example.com".to_string(), "wrong-password".to_string())
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let hash = Password::new("correct-password").unwrap().into_string();
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |_| {
            let mut user = test_user(42);
            user.password_hash = hash.clone();
            Ok(Some(user))
        });

        let service = Authenticator::new(Arc::new(TestUnitOfWork::with_users(users)), test_config());
        let response = service
            .login("test@example.com".to_string(), "correct-password".to_string())
            .await
            .unwrap();

        assert_eq!(response.token_type, "Bearer");
        let claims = service.verify_token(&response.token).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn tampered_token_rejected() {
        let service = Authenticator::new(
            Arc::new(TestUnitOfWork::with_users(MockUserRepository::new())),
            test_config(),
        );
        assert!(service.verify_token("not-a-jwt").is_err());
    }
}
