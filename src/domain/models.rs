//! Row models for users and tweets
//!
//! These are the raw database shapes. Routes convert them into response DTOs;
//! `password_hash` and `confirm_hash` never leave the domain layer.

use chrono::{DateTime, Utc};

/// A user row. Not serializable on purpose - it carries credential columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub fullname: String,
    pub password_hash: String,
    pub confirm_hash: String,
    pub confirmed: bool,
    pub location: Option<String>,
    pub about: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a new user
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub fullname: &'a str,
    pub password_hash: &'a str,
    pub confirm_hash: &'a str,
}

/// A tweet joined with its author and (when present) the retweeted tweet and
/// that tweet's author, one level deep.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TweetRow {
    pub id: i64,
    pub text: String,
    pub images: Vec<String>,
    pub likes: Vec<i64>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub user_username: String,
    pub user_fullname: String,
    pub retweet_id: Option<i64>,
    pub retweet_text: Option<String>,
    pub retweet_images: Option<Vec<String>>,
    pub retweet_likes: Option<Vec<i64>>,
    pub retweet_favorite: Option<bool>,
    pub retweet_created_at: Option<DateTime<Utc>>,
    pub retweet_user_id: Option<i64>,
    pub retweet_user_username: Option<String>,
    pub retweet_user_fullname: Option<String>,
}
