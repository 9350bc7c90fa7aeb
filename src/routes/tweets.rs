//! Tweet CRUD and like endpoints (/tweets/*)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::auth::AuthUser;
use crate::AppState;
use crate::domain::models::TweetRow;
use crate::domain::tweets;
use crate::services::error::{ApiError, LogErr};
use crate::services::response::{Envelope, EmptyEnvelope, success, success_empty};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tweets", get(list_tweets).post(create_tweet))
        .route(
            "/tweets/{id}",
            get(get_tweet).patch(update_tweet).delete(delete_tweet),
        )
        .route("/tweets/{id}/like", post(like_tweet))
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TweetAuthor {
    pub id: i64,
    pub username: String,
    pub fullname: String,
}

#[derive(Debug, Serialize)]
pub struct RetweetResponse {
    pub id: i64,
    pub text: String,
    pub images: Vec<String>,
    pub likes: Vec<i64>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub user: TweetAuthor,
}

#[derive(Debug, Serialize)]
pub struct TweetResponse {
    pub id: i64,
    pub text: String,
    pub images: Vec<String>,
    pub likes: Vec<i64>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub user: TweetAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retweet: Option<RetweetResponse>,
}

impl From<TweetRow> for TweetResponse {
    fn from(row: TweetRow) -> Self {
        let retweet = match (
            row.retweet_id,
            row.retweet_text,
            row.retweet_created_at,
            row.retweet_user_id,
            row.retweet_user_username,
            row.retweet_user_fullname,
        ) {
            (Some(id), Some(text), Some(created_at), Some(uid), Some(username), Some(fullname)) => {
                Some(RetweetResponse {
                    id,
                    text,
                    images: row.retweet_images.unwrap_or_default(),
                    likes: row.retweet_likes.unwrap_or_default(),
                    favorite: row.retweet_favorite.unwrap_or(false),
                    created_at,
                    user: TweetAuthor {
                        id: uid,
                        username,
                        fullname,
                    },
                })
            }
            _ => None,
        };

        Self {
            id: row.id,
            text: row.text,
            images: row.images,
            likes: row.likes,
            favorite: row.favorite,
            created_at: row.created_at,
            user: TweetAuthor {
                id: row.user_id,
                username: row.user_username,
                fullname: row.user_fullname,
            },
            retweet,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tweets - All tweets with author and retweet populated, newest first
async fn list_tweets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<TweetResponse>>>, ApiError> {
    let rows = tweets::list_tweets(&state.db)
        .await
        .log_500("List tweets error")?;

    Ok(success(rows.into_iter().map(TweetResponse::from).collect()))
}

/// GET /tweets/:id - One tweet with author and retweet populated
async fn get_tweet(
    State(state): State<Arc<AppState>>,
    Path(tweet_id): Path<i64>,
) -> Result<Json<Envelope<TweetResponse>>, ApiError> {
    let row = tweets::get_tweet(&state.db, tweet_id)
        .await
        .log_500("Get tweet error")?
        .ok_or(ApiError::NotFound)?;

    Ok(success(TweetResponse::from(row)))
}

#[derive(Debug, Deserialize, Validate)]
struct CreateTweetRequest {
    #[validate(length(min = 1, max = 280))]
    text: String,
    #[validate(length(max = 10))]
    images: Option<Vec<String>>,
    retweet: Option<i64>,
}

/// POST /tweets - Create a tweet for the authenticated user
async fn create_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateTweetRequest>,
) -> Result<Json<Envelope<TweetResponse>>, ApiError> {
    req.validate()?;

    let images = req.images.unwrap_or_default();
    let tweet_id = tweets::insert_tweet(&state.db, user_id, &req.text, &images, req.retweet)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::BadRequest("retweeted tweet does not exist".to_string())
            }
            _ => {
                tracing::error!("Insert tweet error: {}", e);
                ApiError::Internal(e.to_string())
            }
        })?;

    let row = tweets::get_tweet(&state.db, tweet_id)
        .await
        .log_500("Get tweet error")?
        .ok_or(ApiError::NotFound)?;

    Ok(success(TweetResponse::from(row)))
}

#[derive(Debug, Deserialize, Validate)]
struct UpdateTweetRequest {
    #[validate(length(min = 1, max = 280))]
    text: String,
}

/// PATCH /tweets/:id - Owner-only text edit
async fn update_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<i64>,
    Json(req): Json<UpdateTweetRequest>,
) -> Result<Json<EmptyEnvelope>, ApiError> {
    req.validate()?;

    check_owner(&state, tweet_id, user_id).await?;

    tweets::update_tweet_text(&state.db, tweet_id, &req.text)
        .await
        .log_500("Update tweet error")?;

    Ok(success_empty())
}

/// DELETE /tweets/:id - Owner-only delete
async fn delete_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<i64>,
) -> Result<Json<EmptyEnvelope>, ApiError> {
    check_owner(&state, tweet_id, user_id).await?;

    tweets::delete_tweet(&state.db, tweet_id)
        .await
        .log_500("Delete tweet error")?;

    Ok(success_empty())
}

/// POST /tweets/:id/like - Toggle the caller's like on a tweet
async fn like_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<i64>,
) -> Result<Json<Envelope<TweetResponse>>, ApiError> {
    tweets::toggle_tweet_like(&state.db, tweet_id, user_id)
        .await
        .log_500("Toggle like error")?
        .ok_or(ApiError::NotFound)?;

    let row = tweets::get_tweet(&state.db, tweet_id)
        .await
        .log_500("Get tweet error")?
        .ok_or(ApiError::NotFound)?;

    Ok(success(TweetResponse::from(row)))
}

/// 404 when the tweet is missing, 403 when the caller does not own it
async fn check_owner(state: &AppState, tweet_id: i64, user_id: i64) -> Result<(), ApiError> {
    let owner_id = tweets::get_tweet_owner(&state.db, tweet_id)
        .await
        .log_500("Get tweet owner error")?
        .ok_or(ApiError::NotFound)?;

    if owner_id != user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_row() -> TweetRow {
        TweetRow {
            id: 1,
            text: "first post".into(),
            images: vec!["/media/image/user_7/1.png".into()],
            likes: vec![2, 3],
            favorite: true,
            created_at: Utc::now(),
            user_id: 7,
            user_username: "crow".into(),
            user_fullname: "Crow Person".into(),
            retweet_id: None,
            retweet_text: None,
            retweet_images: None,
            retweet_likes: None,
            retweet_favorite: None,
            retweet_created_at: None,
            retweet_user_id: None,
            retweet_user_username: None,
            retweet_user_fullname: None,
        }
    }

    #[test]
    fn test_response_without_retweet_omits_field() {
        let response = TweetResponse::from(base_row());
        assert!(response.retweet.is_none());

        let value = serde_json::to_value(&response).unwrap();
        assert!(!value.as_object().unwrap().contains_key("retweet"));
        assert_eq!(value["user"]["username"], "crow");
        assert_eq!(value["likes"], serde_json::json!([2, 3]));
    }

    #[test]
    fn test_response_with_retweet_is_nested() {
        let mut row = base_row();
        row.retweet_id = Some(9);
        row.retweet_text = Some("original".into());
        row.retweet_images = Some(vec![]);
        row.retweet_likes = Some(vec![7]);
        row.retweet_favorite = Some(true);
        row.retweet_created_at = Some(Utc::now());
        row.retweet_user_id = Some(4);
        row.retweet_user_username = Some("magpie".into());
        row.retweet_user_fullname = Some("Mag Pie".into());

        let response = TweetResponse::from(row);
        let retweet = response.retweet.as_ref().unwrap();
        assert_eq!(retweet.id, 9);
        assert_eq!(retweet.user.username, "magpie");

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["retweet"]["text"], "original");
        assert_eq!(value["retweet"]["user"]["id"], 4);
    }

    #[test]
    fn test_partial_retweet_join_is_dropped() {
        // A row with a dangling retweet id but no joined columns must not panic
        let mut row = base_row();
        row.retweet_id = Some(9);

        let response = TweetResponse::from(row);
        assert!(response.retweet.is_none());
    }

    #[test]
    fn test_tweet_validation_rules() {
        let empty = CreateTweetRequest {
            text: String::new(),
            images: None,
            retweet: None,
        };
        assert!(empty.validate().is_err());

        let too_long = CreateTweetRequest {
            text: "x".repeat(281),
            images: None,
            retweet: None,
        };
        assert!(too_long.validate().is_err());

        let too_many_images = CreateTweetRequest {
            text: "ok".into(),
            images: Some(vec![String::from("/media/x.png"); 11]),
            retweet: None,
        };
        assert!(too_many_images.validate().is_err());

        let valid = CreateTweetRequest {
            text: "x".repeat(280),
            images: Some(vec!["/media/x.png".into()]),
            retweet: Some(3),
        };
        assert!(valid.validate().is_ok());
    }
}
