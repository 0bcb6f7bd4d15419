use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::voting::KarmaKind;

/// The closed set of votable entities. Stored as a Postgres enum and used as
/// the discriminant half of the (kind, id) target reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_target", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteTargetKind {
    Submission,
    Comment,
}

impl VoteTargetKind {
    /// Which karma counter the target's author earns from votes on it.
    pub fn karma_kind(self) -> KarmaKind {
        match self {
            Self::Submission => KarmaKind::Link,
            Self::Comment => KarmaKind::Comment,
        }
    }
}

impl std::str::FromStr for VoteTargetKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submission" => Ok(Self::Submission),
            "comment" => Ok(Self::Comment),
            other => Err(AppError::BadRequest(format!(
                "unknown vote target type: {other}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    /// "submission" or "comment".
    pub target_type: String,
    pub target_id: Uuid,
    /// -1 or 1; repeating the current vote cancels it.
    pub value: i16,
}

/// Wire shape expected by the vote endpoint's clients.
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub error: Option<String>,
    #[serde(rename = "voteDiff")]
    pub vote_diff: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voting::KarmaKind;

    #[test]
    fn target_kind_parses_known_values() {
        assert_eq!(
            "submission".parse::<VoteTargetKind>().unwrap(),
            VoteTargetKind::Submission
        );
        assert_eq!(
            "comment".parse::<VoteTargetKind>().unwrap(),
            VoteTargetKind::Comment
        );
    }

    #[test]
    fn target_kind_rejects_unknown_values() {
        assert!("post".parse::<VoteTargetKind>().is_err());
        assert!("".parse::<VoteTargetKind>().is_err());
    }

    #[test]
    fn karma_routing_by_target_kind() {
        assert_eq!(VoteTargetKind::Submission.karma_kind(), KarmaKind::Link);
        assert_eq!(VoteTargetKind::Comment.karma_kind(), KarmaKind::Comment);
    }
}
