use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::VoteTargetKind,
    services::user_service,
    voting::{self, VoteDirection, VoteState},
};

/// The fields of a votable row the state machine needs: who gets the karma
/// and which thread the target belongs to.
#[derive(Debug, FromRow)]
struct TargetRow {
    author_id: Uuid,
    submission_id: Uuid,
}

/// Locks the target row for the duration of the vote transaction and returns
/// its author and root submission. Concurrent votes on the same target
/// serialize here; votes on different targets proceed in parallel.
async fn lock_target(
    conn: &mut PgConnection,
    kind: VoteTargetKind,
    target_id: Uuid,
) -> Result<Option<TargetRow>> {
    let sql = match kind {
        VoteTargetKind::Submission => {
            "SELECT author_id, id AS submission_id FROM submissions WHERE id = $1 FOR UPDATE"
        }
        VoteTargetKind::Comment => {
            "SELECT author_id, submission_id FROM comments WHERE id = $1 FOR UPDATE"
        }
    };

    let row = sqlx::query_as::<_, TargetRow>(sql)
        .bind(target_id)
        .fetch_optional(conn)
        .await?;

    Ok(row)
}

/// Applies one vote request end to end: looks up the caller's current vote
/// for the target, runs the transition, and writes the target's counters, the
/// author's karma, and the vote row in a single transaction. Nothing is
/// mutated on any rejection path. Returns the realized score delta for the
/// client's live counter update.
pub async fn cast_vote(
    db: &PgPool,
    user_id: Uuid,
    kind: VoteTargetKind,
    target_id: Uuid,
    requested: VoteDirection,
) -> Result<i32> {
    let mut tx = db.begin().await?;

    let target = lock_target(&mut *tx, kind, target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vote target not found".to_string()))?;

    // Lock the vote row too, so two near-simultaneous clicks by the same user
    // cannot both apply the same transition.
    let existing: Option<i16> = sqlx::query_scalar(
        r#"
        SELECT value FROM votes
        WHERE user_id = $1 AND target_kind = $2 AND target_id = $3
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(target_id)
    .fetch_optional(&mut *tx)
    .await?;

    let current = VoteState::from_row(existing)?;
    let outcome = voting::transition(current, requested);

    let counter_sql = match kind {
        VoteTargetKind::Submission => {
            "UPDATE submissions SET ups = ups + $1, downs = downs + $2, score = score + $3 WHERE id = $4"
        }
        VoteTargetKind::Comment => {
            "UPDATE comments SET ups = ups + $1, downs = downs + $2, score = score + $3 WHERE id = $4"
        }
    };
    sqlx::query(counter_sql)
        .bind(outcome.ups_delta)
        .bind(outcome.downs_delta)
        .bind(outcome.score_delta)
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

    user_service::adjust_karma(&mut *tx, target.author_id, kind.karma_kind(), outcome.score_delta)
        .await?;

    // One row per (user, target) forever; cancellation keeps the row at 0.
    sqlx::query(
        r#"
        INSERT INTO votes (id, user_id, target_kind, target_id, submission_id, value, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
        ON CONFLICT (user_id, target_kind, target_id)
        DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(kind)
    .bind(target_id)
    .bind(target.submission_id)
    .bind(outcome.new_value)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        %user_id, %target_id, ?kind,
        diff = outcome.score_delta,
        "vote applied"
    );

    Ok(outcome.score_delta)
}

#[derive(Debug, FromRow)]
struct UserThreadVote {
    target_kind: VoteTargetKind,
    target_id: Uuid,
    value: i16,
}

/// All votes a user has cast in one thread, split into the vote on the
/// submission itself and a target-id map for the comments. Cancelled votes
/// (value 0) are included; the UI treats them the same as no vote.
pub async fn votes_for_user_in_submission(
    db: &PgPool,
    user_id: Uuid,
    submission_id: Uuid,
) -> Result<(Option<i16>, HashMap<Uuid, i16>)> {
    let rows = sqlx::query_as::<_, UserThreadVote>(
        "SELECT target_kind, target_id, value FROM votes WHERE user_id = $1 AND submission_id = $2",
    )
    .bind(user_id)
    .bind(submission_id)
    .fetch_all(db)
    .await?;

    let mut sub_vote = None;
    let mut comment_votes = HashMap::new();
    for row in rows {
        match row.target_kind {
            VoteTargetKind::Submission => sub_vote = Some(row.value),
            VoteTargetKind::Comment => {
                comment_votes.insert(row.target_id, row.value);
            }
        }
    }

    Ok((sub_vote, comment_votes))
}

/// The caller's votes on a page of submissions, keyed by submission id.
pub async fn votes_for_submissions(
    db: &PgPool,
    user_id: Uuid,
    submission_ids: &[Uuid],
) -> Result<HashMap<Uuid, i16>> {
    let rows = sqlx::query_as::<_, UserThreadVote>(
        r#"
        SELECT target_kind, target_id, value FROM votes
        WHERE user_id = $1 AND target_kind = 'submission' AND target_id = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(submission_ids)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(|r| (r.target_id, r.value)).collect())
}
