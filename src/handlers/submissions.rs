use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{OptionalAuthUser, WriteAuthUser},
    error::{AppError, Result},
    models::{CreateSubmissionRequest, Submission, ThreadResponse},
    services::{comment_service, submission_service, subreddit_service, vote_service},
};

pub async fn create_submission(
    State(state): State<AppState>,
    Path(subreddit_name): Path<String>,
    WriteAuthUser(auth_user): WriteAuthUser,
    Json(payload): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>)> {
    payload.validate()?;

    let subreddit = subreddit_service::get_subreddit_by_name(&state.db, &subreddit_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    let submission = submission_service::create_submission(
        &state.db,
        auth_user.user_id,
        &auth_user.username,
        subreddit.id,
        &payload,
    )
    .await?;
    tracing::info!(id = %submission.id, subreddit = %subreddit.name, "submission created");

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Serves a thread: the submission, its comment tree, and every vote the
/// caller has cast in it so the UI can mark voted arrows without extra reads.
pub async fn get_thread(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
    auth_user: OptionalAuthUser,
) -> Result<Json<ThreadResponse>> {
    let submission = submission_service::get_submission_by_id(&state.db, submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    let comments = comment_service::comments_for_submission(&state.db, submission_id).await?;
    let comments = comment_service::build_tree(comments);

    let (sub_vote, comment_votes) = match auth_user.0 {
        Some(user) => {
            vote_service::votes_for_user_in_submission(&state.db, user.user_id, submission_id)
                .await?
        }
        None => (None, HashMap::new()),
    };

    Ok(Json(ThreadResponse {
        submission,
        sub_vote,
        comment_votes,
        comments,
    }))
}
