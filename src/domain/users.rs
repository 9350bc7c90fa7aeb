//! User domain - DB queries for users
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use sqlx::{Executor, Postgres};

use super::models::{NewUser, User};

const USER_COLUMNS: &str = "id, email, username, fullname, password_hash, confirm_hash, \
     confirmed, location, about, website, created_at";

/// List all users, newest first
pub async fn list_users<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(executor)
    .await
}

/// Get a user by ID
pub async fn get_user_by_id<'e, E>(executor: E, user_id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// Get a user by username (login lookup)
pub async fn get_user_by_username<'e, E>(
    executor: E,
    username: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(executor)
    .await
}

/// Insert a new user and return the stored row
pub async fn insert_user<'e, E>(executor: E, new_user: &NewUser<'_>) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        INSERT INTO users (email, username, fullname, password_hash, confirm_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(new_user.email)
    .bind(new_user.username)
    .bind(new_user.fullname)
    .bind(new_user.password_hash)
    .bind(new_user.confirm_hash)
    .fetch_one(executor)
    .await
}

/// Mark the user holding this confirmation hash as confirmed.
/// Returns the user's id, or None when no user carries the hash.
pub async fn confirm_user<'e, E>(executor: E, hash: &str) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET confirmed = TRUE
        WHERE confirm_hash = $1
        RETURNING id
        "#,
    )
    .bind(hash)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(id,)| id))
}
