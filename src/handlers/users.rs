use axum::{
    extract::{Path, State},
    response::Json,
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{UpdateProfileRequest, UserResponse},
    services::user_service,
};

pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = user_service::get_user_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn update_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    payload.validate()?;

    let user = user_service::update_profile(&state.db, auth_user.user_id, &payload).await?;

    Ok(Json(user.into()))
}
