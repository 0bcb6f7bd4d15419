use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::collections::HashMap;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::{AppError, Result},
    models::{CreateSubredditRequest, Subreddit, SubredditPage},
    services::{submission_service, subreddit_service, user_service, vote_service},
};

pub async fn list_subreddits(State(state): State<AppState>) -> Result<Json<Vec<Subreddit>>> {
    let subreddits = subreddit_service::list_subreddits(&state.db).await?;
    Ok(Json(subreddits))
}

pub async fn create_subreddit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateSubredditRequest>,
) -> Result<(StatusCode, Json<Subreddit>)> {
    payload.validate()?;

    let admin = user_service::get_user_by_id(&state.db, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let subreddit = subreddit_service::create_subreddit(&state.db, &admin, &payload).await?;
    tracing::info!(name = %subreddit.name, "subreddit created");

    Ok((StatusCode::CREATED, Json(subreddit)))
}

pub async fn get_subreddit(
    State(state): State<AppState>,
    Path(name): Path<String>,
    auth_user: OptionalAuthUser,
) -> Result<Json<SubredditPage>> {
    let subreddit = subreddit_service::get_subreddit_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    let submissions = submission_service::submissions_for_subreddit(&state.db, subreddit.id).await?;

    let submission_votes = match auth_user.0 {
        Some(user) => {
            let ids: Vec<_> = submissions.iter().map(|s| s.id).collect();
            vote_service::votes_for_submissions(&state.db, user.user_id, &ids).await?
        }
        None => HashMap::new(),
    };

    Ok(Json(SubredditPage {
        subreddit,
        submissions,
        submission_votes,
    }))
}

pub async fn subscribe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    auth_user: AuthUser,
) -> Result<StatusCode> {
    let subreddit = subreddit_service::get_subreddit_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    subreddit_service::subscribe(&state.db, auth_user.user_id, subreddit.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(name): Path<String>,
    auth_user: AuthUser,
) -> Result<StatusCode> {
    let subreddit = subreddit_service::get_subreddit_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| AppError::NotFound("Subreddit not found".to_string()))?;

    subreddit_service::unsubscribe(&state.db, auth_user.user_id, subreddit.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
