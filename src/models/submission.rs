use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::CommentNode;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub subreddit_id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub ups: i32,
    pub downs: i32,
    pub score: i32,
    pub comment_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubmissionRequest {
    #[validate(length(min = 1, max = 250))]
    pub title: String,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(length(max = 5000))]
    pub body_text: Option<String>,
}

/// A full thread view: the submission, its comment tree, and every vote the
/// caller has cast in the thread keyed by target id.
#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub submission: Submission,
    pub sub_vote: Option<i16>,
    pub comment_votes: HashMap<Uuid, i16>,
    pub comments: Vec<CommentNode>,
}
