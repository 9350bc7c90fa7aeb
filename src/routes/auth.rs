//! Registration, email verification, and login endpoints

use axum::{
    Json, Router,
    extract::{FromRequestParts, Query, State},
    http::{StatusCode, request::Parts},
    routing::{get, post},
};
use base64::Engine;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use validator::Validate;

use super::users::UserResponse;
use crate::AppState;
use crate::domain::{models::NewUser, users};
use crate::services::error::{ApiError, LogErr};
use crate::services::response::{Envelope, EmptyEnvelope, success, success_empty};
use crate::services::{password, session};

pub fn routes() -> Router<Arc<AppState>> {
    // Rate limit auth endpoints to slow down brute force attempts
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limit config");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify", get(verify))
        .route("/auth/login", post(login))
        .layer(rate_limit_layer)
}

// ============================================================================
// Auth extractor - validates the bearer JWT and extracts the user_id
// ============================================================================

/// Extractor that validates the `Authorization: Bearer` JWT and returns the user_id
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let user_id = session::validate_token(token, &state.jwt_secret).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ApiError::Unauthorized
        })?;

        Ok(AuthUser(user_id))
    }
}

// ============================================================================
// Registration
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
struct RegisterRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 2, max = 40))]
    username: String,
    #[validate(length(min = 2, max = 40))]
    fullname: String,
    #[validate(length(min = 6))]
    password: String,
}

/// POST /auth/register - Create a user and send the confirmation email
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<UserResponse>>), ApiError> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password).log_500("Password hash error")?;
    let confirm_hash = generate_confirm_hash();

    let new_user = NewUser {
        email: &req.email,
        username: &req.username,
        fullname: &req.fullname,
        password_hash: &password_hash,
        confirm_hash: &confirm_hash,
    };

    let user = users::insert_user(&state.db, &new_user)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::BadRequest("email or username is already taken".to_string())
            }
            _ => {
                tracing::error!("Insert user error: {}", e);
                ApiError::Internal(e.to_string())
            }
        })?;

    let link = format!("{}/auth/verify?hash={}", state.public_url, confirm_hash);
    state
        .mailer
        .send_confirmation(&user.email, &link)
        .await
        .log_500("Send confirmation email error")?;

    Ok((StatusCode::CREATED, success(UserResponse::from(user))))
}

// ============================================================================
// Email verification
// ============================================================================

#[derive(Debug, Deserialize)]
struct VerifyQuery {
    hash: Option<String>,
}

/// GET /auth/verify?hash= - Confirm the email behind a confirmation hash
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<EmptyEnvelope>, ApiError> {
    let hash = query
        .hash
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing confirmation hash".to_string()))?;

    users::confirm_user(&state.db, &hash)
        .await
        .log_500("Confirm user error")?
        .ok_or(ApiError::NotFound)?;

    Ok(success_empty())
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginData {
    token: String,
    user: UserResponse,
}

/// POST /auth/login - Verify credentials and issue a bearer JWT
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginData>>, ApiError> {
    let user = users::get_user_by_username(&state.db, &req.username)
        .await
        .log_500("Get user by username error")?
        .ok_or(ApiError::Unauthorized)?;

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = session::create_token(user.id, &state.jwt_secret).log_500("Create token error")?;

    Ok(success(LoginData {
        token,
        user: UserResponse::from(user),
    }))
}

/// Generate a random single-use confirmation hash
fn generate_confirm_hash() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
