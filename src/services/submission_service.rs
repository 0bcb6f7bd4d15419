use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    markdown,
    models::{CreateSubmissionRequest, Submission},
};

pub async fn get_submission_by_id(db: &PgPool, submission_id: Uuid) -> Result<Option<Submission>> {
    let submission = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
        .bind(submission_id)
        .fetch_optional(db)
        .await?;

    Ok(submission)
}

pub async fn create_submission(
    db: &PgPool,
    author_id: Uuid,
    author_name: &str,
    subreddit_id: Uuid,
    request: &CreateSubmissionRequest,
) -> Result<Submission> {
    if request.url.is_none() && request.body_text.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::BadRequest(
            "A submission needs a url or body text".to_string(),
        ));
    }

    let body_html = request.body_text.as_deref().map(markdown::render);

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        INSERT INTO submissions (
            id, author_id, author_name, subreddit_id, title, url,
            body_text, body_html, ups, downs, score, comment_count, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0, 0, 0, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(author_id)
    .bind(author_name)
    .bind(subreddit_id)
    .bind(&request.title)
    .bind(&request.url)
    .bind(&request.body_text)
    .bind(&body_html)
    .bind(Utc::now())
    .fetch_one(db)
    .await?;

    Ok(submission)
}

pub async fn submissions_for_subreddit(db: &PgPool, subreddit_id: Uuid) -> Result<Vec<Submission>> {
    let submissions = sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE subreddit_id = $1 ORDER BY created_at DESC",
    )
    .bind(subreddit_id)
    .fetch_all(db)
    .await?;

    Ok(submissions)
}
