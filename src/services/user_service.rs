use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    auth::hash_password,
    error::{AppError, Result},
    markdown,
    models::{RegisterRequest, UpdateProfileRequest, User},
    voting::KarmaKind,
};

pub async fn get_user_by_id(db: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn get_user_by_username(db: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn create_user(db: &PgPool, request: &RegisterRequest) -> Result<User> {
    if get_user_by_username(db, &request.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash_password(&request.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, password_hash, email, link_karma, comment_karma, created_at)
        VALUES ($1, $2, $3, $4, 0, 0, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.username)
    .bind(&password_hash)
    .bind(&request.email)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(user)
}

pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    request: &UpdateProfileRequest,
) -> Result<User> {
    let about_html = request.about_text.as_deref().map(markdown::render);

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = COALESCE($1, email),
            about_text = COALESCE($2, about_text),
            about_html = COALESCE($3, about_html)
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(&request.email)
    .bind(&request.about_text)
    .bind(&about_html)
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(user)
}

/// The karma ledger. Adds `delta` to the named counter with a relative update
/// so concurrent votes on different targets by the same author never clobber
/// each other. Runs on the vote transaction's connection; callers invoke it
/// exactly once per transition.
pub async fn adjust_karma(
    conn: &mut PgConnection,
    user_id: Uuid,
    kind: KarmaKind,
    delta: i32,
) -> Result<()> {
    let sql = match kind {
        KarmaKind::Link => "UPDATE users SET link_karma = link_karma + $1 WHERE id = $2",
        KarmaKind::Comment => "UPDATE users SET comment_karma = comment_karma + $1 WHERE id = $2",
    };

    sqlx::query(sql).bind(delta).bind(user_id).execute(conn).await?;

    Ok(())
}
