use axum::{extract::State, http::StatusCode, response::Json};
use validator::Validate;

use crate::{
    AppState,
    auth::{Claims, verify_password},
    error::{AppError, Result},
    models::{AuthResponse, LoginRequest, RegisterRequest},
    services::user_service,
};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    payload.validate()?;

    let user = user_service::create_user(&state.db, &payload).await?;
    tracing::info!(username = %user.username, "user registered");

    let (token, _) = Claims::new(user.id, user.username.clone(), &state.config.jwt_secret)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let user = user_service::get_user_by_username(&state.db, &payload.username)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Authentication(
            "Invalid username or password".to_string(),
        ));
    }

    let (token, _) = Claims::new(user.id, user.username.clone(), &state.config.jwt_secret)?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
