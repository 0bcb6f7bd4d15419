use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub submission_id: Uuid,
    /// None means the comment hangs directly off the submission.
    pub parent_id: Option<Uuid>,
    pub raw_body: String,
    pub rendered_body: String,
    pub ups: i32,
    pub downs: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// "submission" or "comment"; anything else is rejected.
    pub parent_type: String,
    pub parent_id: Uuid,
    #[validate(length(min = 1, max = 10000))]
    pub raw_body: String,
}

/// One node of the rendered thread tree. Siblings are ordered by score
/// descending with creation time as the stable tiebreak.
#[derive(Debug, Serialize)]
pub struct CommentNode {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub parent_id: Option<Uuid>,
    pub rendered_body: String,
    pub ups: i32,
    pub downs: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn from_comment(comment: Comment, replies: Vec<CommentNode>) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            author_name: comment.author_name,
            parent_id: comment.parent_id,
            rendered_body: comment.rendered_body,
            ups: comment.ups,
            downs: comment.downs,
            score: comment.score,
            created_at: comment.created_at,
            replies,
        }
    }
}
