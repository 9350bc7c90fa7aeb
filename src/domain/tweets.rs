//! Tweet domain - DB queries for tweets
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).
//!
//! Reads join the author and, when present, the retweeted tweet with its own
//! author (one level deep), mirroring the feed shape clients expect.

use sqlx::{Executor, Postgres};

use super::models::TweetRow;

const TWEET_SELECT: &str = r#"
    SELECT t.id, t.text, t.images, t.likes, t.favorite, t.created_at,
           t.user_id, u.username AS user_username, u.fullname AS user_fullname,
           t.retweet_id,
           rt.text AS retweet_text, rt.images AS retweet_images,
           rt.likes AS retweet_likes, rt.favorite AS retweet_favorite,
           rt.created_at AS retweet_created_at,
           rt.user_id AS retweet_user_id,
           ru.username AS retweet_user_username,
           ru.fullname AS retweet_user_fullname
    FROM tweets t
    JOIN users u ON u.id = t.user_id
    LEFT JOIN tweets rt ON rt.id = t.retweet_id
    LEFT JOIN users ru ON ru.id = rt.user_id
"#;

/// List all tweets, newest first
pub async fn list_tweets<'e, E>(executor: E) -> Result<Vec<TweetRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!("{TWEET_SELECT} ORDER BY t.created_at DESC"))
        .fetch_all(executor)
        .await
}

/// Get a single tweet with author and retweet populated
pub async fn get_tweet<'e, E>(executor: E, tweet_id: i64) -> Result<Option<TweetRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!("{TWEET_SELECT} WHERE t.id = $1"))
        .bind(tweet_id)
        .fetch_optional(executor)
        .await
}

/// List one user's tweets, newest first
pub async fn list_user_tweets<'e, E>(
    executor: E,
    user_id: i64,
) -> Result<Vec<TweetRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "{TWEET_SELECT} WHERE t.user_id = $1 ORDER BY t.created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Insert a tweet and return its id
pub async fn insert_tweet<'e, E>(
    executor: E,
    user_id: i64,
    text: &str,
    images: &[String],
    retweet_id: Option<i64>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO tweets (text, images, user_id, retweet_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(images)
    .bind(user_id)
    .bind(retweet_id)
    .fetch_one(executor)
    .await?;

    Ok(row.0)
}

/// Get the owning user's id for a tweet
pub async fn get_tweet_owner<'e, E>(executor: E, tweet_id: i64) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(id,)| id))
}

/// Replace a tweet's text
pub async fn update_tweet_text<'e, E>(
    executor: E,
    tweet_id: i64,
    text: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE tweets SET text = $2 WHERE id = $1")
        .bind(tweet_id)
        .bind(text)
        .execute(executor)
        .await?;

    Ok(())
}

/// Delete a tweet
pub async fn delete_tweet<'e, E>(executor: E, tweet_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("DELETE FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .execute(executor)
        .await?;

    Ok(())
}

// Single statement so two concurrent toggles cannot lose an update. Column
// references on the right-hand side read the pre-update row, so favorite
// mirrors the toggle: true when the user was not yet in likes, false after
// an unlike.
const TOGGLE_LIKE_SQL: &str = r#"
    UPDATE tweets
    SET likes = CASE
            WHEN $2 = ANY(likes) THEN array_remove(likes, $2)
            ELSE array_append(likes, $2)
        END,
        favorite = NOT ($2 = ANY(likes))
    WHERE id = $1
    RETURNING favorite
"#;

/// Atomically toggle a user's membership in a tweet's likes list, mirroring
/// the favorite flag. Returns the new favorite flag, or None when the tweet
/// does not exist.
pub async fn toggle_tweet_like<'e, E>(
    executor: E,
    tweet_id: i64,
    user_id: i64,
) -> Result<Option<bool>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(bool,)> = sqlx::query_as(TOGGLE_LIKE_SQL)
        .bind(tweet_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|(favorite,)| favorite))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_like_is_one_statement() {
        // The toggle must stay a single UPDATE; splitting it back into a
        // read-modify-write reintroduces lost updates under concurrency.
        assert!(!TOGGLE_LIKE_SQL.contains(';'));
        assert_eq!(TOGGLE_LIKE_SQL.matches("UPDATE").count(), 1);
        assert!(!TOGGLE_LIKE_SQL.contains("SELECT"));
    }

    #[test]
    fn test_toggle_like_handles_both_directions() {
        // Both branches of the membership toggle are present, and favorite
        // is derived from pre-update membership rather than bound separately.
        assert!(TOGGLE_LIKE_SQL.contains("array_append(likes, $2)"));
        assert!(TOGGLE_LIKE_SQL.contains("array_remove(likes, $2)"));
        assert!(TOGGLE_LIKE_SQL.contains("favorite = NOT ($2 = ANY(likes))"));
        assert!(TOGGLE_LIKE_SQL.contains("RETURNING favorite"));
    }
}
