//! Integration tests for API endpoints.
//!
//! These tests run the real router and middleware against mock services,
//! so no database is required.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{json, Value};
use tower::ServiceExt;

use referral_system::api::{create_router, AppState};
use referral_system::domain::{Referral, User};
use referral_system::errors::{AppError, AppResult};
use referral_system::infra::Database;
use referral_system::services::{
    ActiveReferralCode, AuthService, Claims, ReferralService, TokenResponse,
};

const VALID_TOKEN: &str = "valid-test-token";

fn test_user(id: i64, email: &str) -> User {
    User {
        id,
        email: email.to_string(),
        password_hash: "hashed".to_string(),
        referral_code: None,
        referral_expiry: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

// =============================================================================
// Mock Services
// =============================================================================

/// Mock auth service with predefined behavior per email
struct MockAuthService;

#[async_trait]
impl AuthService for MockAuthService {
    async fn register(&self, email: String, _password: String) -> AppResult<User> {
        if email == "taken@example.com" {
            return Err(AppError::EmailTaken);
        }
        Ok(test_user(1, &email))
    }

    async fn login(&self, email: String, _password: String) -> AppResult<TokenResponse> {
        if email == "wrong@example.com" {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            token: "mock-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token == VALID_TOKEN {
            Ok(Claims {
                sub: 1,
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

/// Mock referral service with behavior keyed on inputs
struct MockReferralService;

#[async_trait]
impl ReferralService for MockReferralService {
    async fn create_referral_code(&self, user_id: i64, expiry: DateTime<Utc>) -> AppResult<User> {
        let mut user = test_user(user_id, "owner@example.com");
        user.referral_code = Some("fresh-code".to_string());
        user.referral_expiry = Some(expiry);
        Ok(user)
    }

    async fn delete_referral_code(&self, user_id: i64) -> AppResult<User> {
        Ok(test_user(user_id, "owner@example.com"))
    }

    async fn get_referral_code_by_email(&self, email: &str) -> AppResult<ActiveReferralCode> {
        match email {
            "ghost@example.com" => Err(AppError::NotFound),
            "expired@example.com" => Err(AppError::CodeExpired),
            "nocode@example.com" => Err(AppError::NoCodeFound),
            _ => Ok(ActiveReferralCode {
                code: "stored-code".to_string(),
                expiry: Some(Utc::now() + Duration::days(7)),
            }),
        }
    }

    async fn register_with_referral(
        &self,
        code: &str,
        email: String,
        _password: String,
    ) -> AppResult<User> {
        if code == "bogus" {
            return Err(AppError::InvalidReferralCode);
        }
        Ok(test_user(2, &email))
    }

    async fn get_referrals(&self, user_id: i64) -> AppResult<Vec<Referral>> {
        Ok(vec![Referral {
            id: 1,
            referred_id: 2,
            referred_by: user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }])
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn test_app() -> Router {
    let database = Arc::new(Database::from_connection(
        MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
    ));
    let state = AppState::new(
        Arc::new(MockAuthService),
        Arc::new(MockReferralService),
        database,
    );
    create_router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Registration & Login
// =============================================================================

#[tokio::test]
async fn register_returns_created_user() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/register",
        json!({"email": "new@example.com", "password": "password123"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["email"], "new@example.com");
    // The password hash must never leave the server
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/register",
        json!({"email": "not-an-email", "password": "password123"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/register",
        json!({"email": "new@example.com", "password": "short"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_conflicts_on_taken_email() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/register",
        json!({"email": "taken@example.com", "password": "password123"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_returns_token() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/login",
        json!({"email": "user@example.com", "password": "password123"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["token"], "mock-token");
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/login",
        json!({"email": "wrong@example.com", "password": "password123"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Public referral code lookup
// =============================================================================

#[tokio::test]
async fn referral_code_lookup_is_public() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/referral_code?email=user@example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["referral_code"], "stored-code");
    assert!(body["expiry"].is_string());
}

#[tokio::test]
async fn referral_code_lookup_requires_email_param() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/referral_code")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_code_maps_to_bad_request() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/referral_code?email=expired@example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "CODE_EXPIRED");
}

#[tokio::test]
async fn missing_code_maps_to_not_found() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/referral_code?email=nocode@example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "NO_CODE_FOUND");
}

#[tokio::test]
async fn unknown_email_maps_to_not_found() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/referral_code?email=ghost@example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Registration with referral
// =============================================================================

#[tokio::test]
async fn register_with_referral_creates_user() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/register_with_referral",
        json!({
            "referral_code": "stored-code",
            "email": "referred@example.com",
            "password": "password123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["email"], "referred@example.com");
}

#[tokio::test]
async fn register_with_unknown_referral_code_fails() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/register_with_referral",
        json!({
            "referral_code": "bogus",
            "email": "referred@example.com",
            "password": "password123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_REFERRAL_CODE");
}

// =============================================================================
// Protected routes
// =============================================================================

#[tokio::test]
async fn create_referral_code_requires_token() {
    let app = test_app();
    let request = json_request(
        "POST",
        "/referral_code",
        json!({"expiry": "2030-01-01T00:00:00Z"}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_authorization_header_rejected() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/referrals")
        .header(header::AUTHORIZATION, "Token abc123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_token_rejected() {
    let app = test_app();
    let request = authed_request("GET", "/referrals", "garbage-token", None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_referral_code_with_token() {
    let app = test_app();
    let request = authed_request(
        "POST",
        "/referral_code",
        VALID_TOKEN,
        Some(json!({"expiry": "2030-01-01T00:00:00Z"})),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["referral_code"], "fresh-code");
    assert!(body["expiry"].is_string());
}

#[tokio::test]
async fn delete_referral_code_with_token() {
    let app = test_app();
    let request = authed_request("DELETE", "/referral_code", VALID_TOKEN, None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Referral code deleted");
    assert!(body["referral_code"].is_null());
}

#[tokio::test]
async fn referrals_listed_for_authenticated_user() {
    let app = test_app();
    let request = authed_request("GET", "/referrals", VALID_TOKEN, None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    let referrals = body["referrals"].as_array().unwrap();
    assert_eq!(referrals.len(), 1);
    assert_eq!(referrals[0]["referred_by"], 1);
    assert_eq!(referrals[0]["referred_id"], 2);
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn root_returns_banner() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
