use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String, jwt_secret: &str) -> Result<(String, Self)> {
        let now = Utc::now();
        let exp = now + Duration::hours(24);

        let claims = Self {
            sub: user_id.to_string(),
            username,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_ref()),
        )?;

        Ok((token, claims))
    }

    pub fn verify(token: &str, jwt_secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing authorization header".to_string()))?;

        let claims = Claims::verify(bearer.token(), &state.config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Authentication("Invalid user ID in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
        })
    }
}

/// Auth for the content-write endpoints (vote, comment, submit). An
/// anonymous caller there is forbidden outright, not challenged to log in.
#[derive(Debug)]
pub struct WriteAuthUser(pub AuthUser);

impl FromRequestParts<AppState> for WriteAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(WriteAuthUser(user)),
            Err(_) => Err(AppError::Forbidden(
                "You must be logged in to vote, comment, or submit".to_string(),
            )),
        }
    }
}

// Optional auth user (for endpoints that work with or without auth)
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}

// Password hashing utilities
pub fn hash_password(password: &str) -> Result<String> {
    let cost = 12;
    bcrypt::hash(password, cost).map_err(AppError::from)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::http::{Request, header::AUTHORIZATION};
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState {
            db: PgPoolOptions::new()
                .connect_lazy("postgres://localhost/unused")
                .unwrap(),
            config: Arc::new(Config {
                database_url: "postgres://localhost/unused".to_string(),
                jwt_secret: "test-secret".to_string(),
                port: 3000,
                host: "127.0.0.1".to_string(),
                allowed_origins: Vec::new(),
            }),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let user_id = Uuid::new_v4();
        let (token, _) = Claims::new(user_id, "alice".to_string(), "test-secret").unwrap();

        let claims = Claims::verify(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = Claims::new(Uuid::new_v4(), "alice".to_string(), "test-secret").unwrap();
        assert!(Claims::verify(&token, "other-secret").is_err());
    }

    #[tokio::test]
    async fn anonymous_caller_is_challenged_on_session_routes() {
        let state = test_state();
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn anonymous_caller_is_forbidden_on_write_routes() {
        let state = test_state();
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

        let err = WriteAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn bad_token_is_forbidden_on_write_routes() {
        let state = test_state();
        let (mut parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer not-a-jwt")
            .body(())
            .unwrap()
            .into_parts();

        let err = WriteAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn valid_token_passes_write_auth() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let (token, _) = Claims::new(user_id, "alice".to_string(), "test-secret").unwrap();
        let (mut parts, _) = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts();

        let user = WriteAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.0.user_id, user_id);
        assert_eq!(user.0.username, "alice");
    }
}
