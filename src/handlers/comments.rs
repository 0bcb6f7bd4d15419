use axum::{extract::State, http::StatusCode, response::Json};
use validator::Validate;

use crate::{
    AppState,
    auth::WriteAuthUser,
    error::Result,
    models::{Comment, CreateCommentRequest},
    services::comment_service,
};

pub async fn create_comment(
    State(state): State<AppState>,
    WriteAuthUser(auth_user): WriteAuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    payload.validate()?;

    let comment = comment_service::create_comment(
        &state.db,
        auth_user.user_id,
        &auth_user.username,
        &payload.raw_body,
        &payload.parent_type,
        payload.parent_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
