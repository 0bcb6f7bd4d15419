use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CreateSubredditRequest, Subreddit, User},
};

const MIN_ACCOUNT_AGE_DAYS: i64 = 30;

/// Subreddit creation is gated on account age.
pub fn can_create_subreddit(account_created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - account_created_at >= Duration::days(MIN_ACCOUNT_AGE_DAYS)
}

pub async fn get_subreddit_by_name(db: &PgPool, name: &str) -> Result<Option<Subreddit>> {
    let subreddit = sqlx::query_as::<_, Subreddit>("SELECT * FROM subreddits WHERE name = $1")
        .bind(name)
        .fetch_optional(db)
        .await?;

    Ok(subreddit)
}

pub async fn list_subreddits(db: &PgPool) -> Result<Vec<Subreddit>> {
    let subreddits =
        sqlx::query_as::<_, Subreddit>("SELECT * FROM subreddits ORDER BY created_at DESC")
            .fetch_all(db)
            .await?;

    Ok(subreddits)
}

pub async fn create_subreddit(
    db: &PgPool,
    admin: &User,
    request: &CreateSubredditRequest,
) -> Result<Subreddit> {
    if !can_create_subreddit(admin.created_at, Utc::now()) {
        return Err(AppError::Forbidden(format!(
            "Account must be at least {MIN_ACCOUNT_AGE_DAYS} days old to create a subreddit"
        )));
    }

    if get_subreddit_by_name(db, &request.name).await?.is_some() {
        return Err(AppError::Conflict("Subreddit name already taken".to_string()));
    }

    let subreddit = sqlx::query_as::<_, Subreddit>(
        r#"
        INSERT INTO subreddits (
            id, name, title, description, admin_id, admin_name, subscriber_count, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 0, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.name)
    .bind(&request.title)
    .bind(request.description.as_deref().unwrap_or(""))
    .bind(admin.id)
    .bind(&admin.username)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(subreddit)
}

/// Adds a subscription row and bumps the counter in one transaction. A repeat
/// subscribe is a no-op rather than a double count.
pub async fn subscribe(db: &PgPool, user_id: Uuid, subreddit_id: Uuid) -> Result<()> {
    let mut tx = db.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO subscriptions (id, user_id, subreddit_id, created_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (user_id, subreddit_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(subreddit_id)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() > 0 {
        sqlx::query("UPDATE subreddits SET subscriber_count = subscriber_count + 1 WHERE id = $1")
            .bind(subreddit_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn unsubscribe(db: &PgPool, user_id: Uuid, subreddit_id: Uuid) -> Result<()> {
    let mut tx = db.begin().await?;

    let deleted =
        sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND subreddit_id = $2")
            .bind(user_id)
            .bind(subreddit_id)
            .execute(&mut *tx)
            .await?;

    if deleted.rows_affected() > 0 {
        sqlx::query("UPDATE subreddits SET subscriber_count = subscriber_count - 1 WHERE id = $1")
            .bind(subreddit_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn young_accounts_cannot_create_subreddits() {
        let now = Utc::now();
        assert!(!can_create_subreddit(now - Duration::days(29), now));
        assert!(!can_create_subreddit(now, now));
    }

    #[test]
    fn month_old_accounts_can_create_subreddits() {
        let now = Utc::now();
        assert!(can_create_subreddit(now - Duration::days(30), now));
        assert!(can_create_subreddit(now - Duration::days(365), now));
    }
}
