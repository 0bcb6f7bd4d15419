use axum::{extract::State, response::Json};

use crate::{
    AppState,
    auth::WriteAuthUser,
    error::Result,
    models::{VoteRequest, VoteResponse, VoteTargetKind},
    services::vote_service,
    voting::VoteDirection,
};

/// The vote endpoint. An anonymous caller is forbidden before the payload is
/// even parsed; all other validation happens before any mutation, and the
/// service applies the whole transition atomically or not at all.
pub async fn vote(
    State(state): State<AppState>,
    WriteAuthUser(auth_user): WriteAuthUser,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let requested = VoteDirection::from_value(payload.value)?;
    let kind: VoteTargetKind = payload.target_type.parse()?;

    let vote_diff = vote_service::cast_vote(
        &state.db,
        auth_user.user_id,
        kind,
        payload.target_id,
        requested,
    )
    .await?;

    Ok(Json(VoteResponse {
        error: None,
        vote_diff,
    }))
}
