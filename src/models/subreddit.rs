use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::Submission;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subreddit {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub description: String,
    pub admin_id: Uuid,
    pub admin_name: String,
    pub subscriber_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubredditRequest {
    #[validate(length(min = 3, max = 30))]
    pub name: String,
    #[validate(length(min = 1, max = 60))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// A subreddit page: the listing plus the caller's existing submission votes,
/// so the UI can highlight arrows without a round trip per row.
#[derive(Debug, Serialize)]
pub struct SubredditPage {
    pub subreddit: Subreddit,
    pub submissions: Vec<Submission>,
    pub submission_votes: HashMap<Uuid, i16>,
}
