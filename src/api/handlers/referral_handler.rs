//! Referral code and referral graph handlers.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Referral, User, UserResponse};
use crate::errors::AppResult;

/// Registration-with-referral request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterWithReferralRequest {
    /// Referral code of the recruiting user
    #[validate(length(min = 1, message = "Referral code is required"))]
    #[schema(example = "b3e6a1ac-2f64-4f3c-9f2a-6f4b1f0c8d21")]
    pub referral_code: String,
    /// New user's email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// New user's password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

/// Referral code creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReferralCodeRequest {
    /// Expiry timestamp for the new code. Stored as given, even when
    /// already in the past.
    #[schema(example = "2026-12-31T23:59:59Z")]
    pub expiry: DateTime<Utc>,
}

/// Query parameters for the public referral code lookup
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReferralCodeQuery {
    /// Email of the code's owner
    pub email: String,
}

/// Referral code response
#[derive(Debug, Serialize, ToSchema)]
pub struct ReferralCodeResponse {
    /// The shareable referral code
    #[schema(example = "b3e6a1ac-2f64-4f3c-9f2a-6f4b1f0c8d21")]
    pub referral_code: String,
    /// Code expiry, if one is set
    pub expiry: Option<DateTime<Utc>>,
}

impl From<&User> for ReferralCodeResponse {
    fn from(user: &User) -> Self {
        Self {
            referral_code: user.referral_code.clone().unwrap_or_default(),
            expiry: user.referral_expiry,
        }
    }
}

/// Referral code deletion response
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteReferralCodeResponse {
    #[schema(example = "Referral code deleted")]
    pub message: String,
    /// Always null after a successful deletion
    pub referral_code: Option<String>,
}

/// Referral list response
#[derive(Debug, Serialize, ToSchema)]
pub struct ReferralsResponse {
    pub referrals: Vec<Referral>,
}

/// Register a new user under a referral code
#[utoipa::path(
    post,
    path = "/register_with_referral",
    tag = "Referrals",
    request_body = RegisterWithReferralRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error or invalid referral code"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_with_referral(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterWithReferralRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .referral_service
        .register_with_referral(&payload.referral_code, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Look up a user's referral code by email
#[utoipa::path(
    get,
    path = "/referral_code",
    tag = "Referrals",
    params(ReferralCodeQuery),
    responses(
        (status = 200, description = "Referral code found", body = ReferralCodeResponse),
        (status = 400, description = "Referral code expired"),
        (status = 404, description = "Unknown email or no code set")
    )
)]
pub async fn get_referral_code(
    State(state): State<AppState>,
    Query(query): Query<ReferralCodeQuery>,
) -> AppResult<Json<ReferralCodeResponse>> {
    let active = state
        .referral_service
        .get_referral_code_by_email(&query.email)
        .await?;

    Ok(Json(ReferralCodeResponse {
        referral_code: active.code,
        expiry: active.expiry,
    }))
}

/// Create a referral code for the authenticated user
#[utoipa::path(
    post,
    path = "/referral_code",
    tag = "Referrals",
    request_body = CreateReferralCodeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Referral code created", body = ReferralCodeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn create_referral_code(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateReferralCodeRequest>,
) -> AppResult<Json<ReferralCodeResponse>> {
    let user = state
        .referral_service
        .create_referral_code(current_user.id, payload.expiry)
        .await?;

    Ok(Json(ReferralCodeResponse::from(&user)))
}

/// Delete the authenticated user's referral code
#[utoipa::path(
    delete,
    path = "/referral_code",
    tag = "Referrals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Referral code deleted", body = DeleteReferralCodeResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn delete_referral_code(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<DeleteReferralCodeResponse>> {
    let user = state
        .referral_service
        .delete_referral_code(current_user.id)
        .await?;

    Ok(Json(DeleteReferralCodeResponse {
        message: "Referral code deleted".to_string(),
        referral_code: user.referral_code,
    }))
}

/// List the authenticated user's referrals
#[utoipa::path(
    get,
    path = "/referrals",
    tag = "Referrals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Referral list", body = ReferralsResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn get_referrals(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ReferralsResponse>> {
    let referrals = state
        .referral_service
        .get_referrals(current_user.id)
        .await?;

    Ok(Json(ReferralsResponse { referrals }))
}
