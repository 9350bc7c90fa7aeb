//! User listing and profile endpoints (/users, /users/me, /users/:id)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::auth::AuthUser;
use super::tweets::TweetResponse;
use crate::AppState;
use crate::domain::models::User;
use crate::domain::{tweets, users};
use crate::services::error::{ApiError, LogErr};
use crate::services::response::{Envelope, success};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(get_me))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/tweets", get(get_user_tweets))
}

/// User API response DTO
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub fullname: String,
    pub confirmed: bool,
    pub location: Option<String>,
    pub about: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    // password_hash and confirm_hash intentionally omitted
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            fullname: u.fullname,
            confirmed: u.confirmed,
            location: u.location,
            about: u.about,
            website: u.website,
            created_at: u.created_at,
        }
    }
}

/// GET /users - List all users
async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<UserResponse>>>, ApiError> {
    let users = users::list_users(&state.db)
        .await
        .log_500("List users error")?;

    Ok(success(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/me - Get the authenticated user
async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    // Return 401 if the user is gone - a valid JWT for a deleted user is still unauthorized
    let user = users::get_user_by_id(&state.db, user_id)
        .await
        .log_500("Get user by ID error")?
        .ok_or(ApiError::Unauthorized)?;

    Ok(success(UserResponse::from(user)))
}

/// GET /users/:id - Get a user by id
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let user = users::get_user_by_id(&state.db, user_id)
        .await
        .log_500("Get user by ID error")?
        .ok_or(ApiError::NotFound)?;

    Ok(success(UserResponse::from(user)))
}

/// GET /users/:id/tweets - A user's tweets, newest first
async fn get_user_tweets(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Envelope<Vec<TweetResponse>>>, ApiError> {
    // 404 for an unknown user rather than an empty list
    users::get_user_by_id(&state.db, user_id)
        .await
        .log_500("Get user by ID error")?
        .ok_or(ApiError::NotFound)?;

    let rows = tweets::list_user_tweets(&state.db, user_id)
        .await
        .log_500("List user tweets error")?;

    Ok(success(rows.into_iter().map(TweetResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            email: "crow@example.com".into(),
            username: "crow".into(),
            fullname: "Crow Person".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            confirm_hash: "abc123".into(),
            confirmed: true,
            location: Some("The Wire".into()),
            about: None,
            website: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_response_hides_credentials() {
        let value = serde_json::to_value(UserResponse::from(sample_user())).unwrap();
        let obj = value.as_object().unwrap();

        assert!(!obj.contains_key("password_hash"));
        assert!(!obj.contains_key("confirm_hash"));
        assert_eq!(obj["username"], "crow");
        assert_eq!(obj["confirmed"], true);
    }
}
