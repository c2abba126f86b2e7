//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, referral_handler};
use crate::domain::{Referral, UserResponse};
use crate::services::TokenResponse;

/// OpenAPI documentation for the referral system
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Referral System",
        version = "0.1.0",
        description = "Referral-tracking API: registration, login, referral codes and referral graph",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
        contact(name = "API Support", email = "support@example.com")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Referral endpoints
        referral_handler::register_with_referral,
        referral_handler::get_referral_code,
        referral_handler::create_referral_code,
        referral_handler::delete_referral_code,
        referral_handler::get_referrals,
    ),
    components(
        schemas(
            // Domain types
            UserResponse,
            Referral,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Referral types
            referral_handler::RegisterWithReferralRequest,
            referral_handler::CreateReferralCodeRequest,
            referral_handler::ReferralCodeResponse,
            referral_handler::DeleteReferralCodeResponse,
            referral_handler::ReferralsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Referrals", description = "Referral code lifecycle and referral graph")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /login"))
                        .build(),
                ),
            );
        }
    }
}
