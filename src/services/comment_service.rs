use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    markdown,
    models::{Comment, CommentNode, VoteTargetKind},
};

/// Parent types accepted by comment creation. Distinct from the vote target
/// parser: an unrecognized parent is an InvalidParent, not a plain bad
/// request, so callers can tell the two apart.
fn parse_parent_kind(parent_type: &str) -> Result<VoteTargetKind> {
    match parent_type {
        "submission" => Ok(VoteTargetKind::Submission),
        "comment" => Ok(VoteTargetKind::Comment),
        other => Err(AppError::InvalidParent(format!(
            "parent must be a submission or comment, got {other:?}"
        ))),
    }
}

/// A resolved comment parent: the submission itself, or an existing comment
/// together with the submission its tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Submission(Uuid),
    Comment { id: Uuid, submission_id: Uuid },
}

/// Where a new comment lands. `submission_id` is the root submission, the
/// row whose comment_count the insert bumps no matter how deep the parent
/// sits in the tree. `parent_id` is the immediate tree parent, None when the
/// comment hangs directly off the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPlacement {
    pub submission_id: Uuid,
    pub parent_id: Option<Uuid>,
}

pub fn placement(parent: ParentRef) -> CommentPlacement {
    match parent {
        ParentRef::Submission(id) => CommentPlacement {
            submission_id: id,
            parent_id: None,
        },
        ParentRef::Comment { id, submission_id } => CommentPlacement {
            submission_id,
            parent_id: Some(id),
        },
    }
}

/// Creates a comment under a submission or another comment. Resolves the root
/// submission from the parent, renders the body once, and inserts the row and
/// the submission's comment_count bump in one transaction, so the counter can
/// never drift from the rows it summarizes.
pub async fn create_comment(
    db: &PgPool,
    author_id: Uuid,
    author_name: &str,
    raw_body: &str,
    parent_type: &str,
    parent_id: Uuid,
) -> Result<Comment> {
    let parent_kind = parse_parent_kind(parent_type)?;
    let rendered_body = markdown::render(raw_body);

    let mut tx = db.begin().await?;

    let parent = match parent_kind {
        VoteTargetKind::Submission => ParentRef::Submission(parent_id),
        VoteTargetKind::Comment => {
            let submission_id: Option<Uuid> =
                sqlx::query_scalar("SELECT submission_id FROM comments WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let submission_id = submission_id
                .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

            ParentRef::Comment {
                id: parent_id,
                submission_id,
            }
        }
    };
    let placed = placement(parent);

    // Lock the root submission so concurrent comment_count bumps serialize;
    // also the existence check for a submission parent.
    let locked: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM submissions WHERE id = $1 FOR UPDATE")
            .bind(placed.submission_id)
            .fetch_optional(&mut *tx)
            .await?;
    locked.ok_or_else(|| AppError::NotFound("Parent submission not found".to_string()))?;

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (
            id, author_id, author_name, submission_id, parent_id,
            raw_body, rendered_body, ups, downs, score, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 0, 0, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(author_id)
    .bind(author_name)
    .bind(placed.submission_id)
    .bind(placed.parent_id)
    .bind(raw_body)
    .bind(&rendered_body)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE submissions SET comment_count = comment_count + 1 WHERE id = $1")
        .bind(placed.submission_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(comment)
}

pub async fn comments_for_submission(db: &PgPool, submission_id: Uuid) -> Result<Vec<Comment>> {
    let comments =
        sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE submission_id = $1")
            .bind(submission_id)
            .fetch_all(db)
            .await?;

    Ok(comments)
}

/// Assembles the flat comment list of a thread into a nested tree. Sibling
/// order is applied here at read time rather than maintained in storage:
/// score descending, then creation time ascending as the stable tiebreak.
pub fn build_tree(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let mut children: HashMap<Option<Uuid>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }

    attach(None, &mut children)
}

fn attach(
    parent: Option<Uuid>,
    children: &mut HashMap<Option<Uuid>, Vec<Comment>>,
) -> Vec<CommentNode> {
    children
        .remove(&parent)
        .unwrap_or_default()
        .into_iter()
        .map(|comment| {
            let id = comment.id;
            let replies = attach(Some(id), children);
            CommentNode::from_comment(comment, replies)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(
        id: Uuid,
        submission_id: Uuid,
        parent_id: Option<Uuid>,
        score: i32,
        age_secs: i64,
    ) -> Comment {
        Comment {
            id,
            author_id: Uuid::new_v4(),
            author_name: "alice".to_string(),
            submission_id,
            parent_id,
            raw_body: "body".to_string(),
            rendered_body: "<p>body</p>\n".to_string(),
            ups: score.max(0),
            downs: (-score).max(0),
            score,
            created_at: Utc::now() + Duration::seconds(age_secs),
        }
    }

    #[test]
    fn unknown_parent_type_is_invalid_parent() {
        let err = parse_parent_kind("subreddit").unwrap_err();
        assert!(matches!(err, AppError::InvalidParent(_)));
    }

    #[test]
    fn known_parent_types_parse() {
        assert_eq!(
            parse_parent_kind("submission").unwrap(),
            VoteTargetKind::Submission
        );
        assert_eq!(
            parse_parent_kind("comment").unwrap(),
            VoteTargetKind::Comment
        );
    }

    #[test]
    fn comment_under_submission_is_top_level() {
        let s = Uuid::new_v4();

        let p = placement(ParentRef::Submission(s));
        assert_eq!(p.parent_id, None);
        // The count bump lands on the submission itself.
        assert_eq!(p.submission_id, s);
    }

    #[test]
    fn reply_attributes_count_to_root_submission() {
        let s = Uuid::new_v4();
        let c1 = Uuid::new_v4();

        let p = placement(ParentRef::Comment {
            id: c1,
            submission_id: s,
        });
        assert_eq!(p.parent_id, Some(c1));
        // Not the intermediate comment: the root submission owns the count.
        assert_eq!(p.submission_id, s);
    }

    #[test]
    fn nested_thread_counts_accumulate_on_one_submission() {
        // C1 under submission S, then C2 under C1: every bump targets S,
        // so its comment_count goes 0 -> 1 -> 2.
        let s = Uuid::new_v4();
        let c1 = Uuid::new_v4();

        let first = placement(ParentRef::Submission(s));
        let second = placement(ParentRef::Comment {
            id: c1,
            submission_id: first.submission_id,
        });

        let mut comment_count = 0;
        for p in [first, second] {
            assert_eq!(p.submission_id, s);
            comment_count += 1;
        }
        assert_eq!(comment_count, 2);
        assert_eq!(second.parent_id, Some(c1));
    }

    #[test]
    fn top_level_comments_sort_by_score_descending() {
        let sub = Uuid::new_v4();
        let low = comment(Uuid::new_v4(), sub, None, 1, 0);
        let high = comment(Uuid::new_v4(), sub, None, 5, 1);

        let tree = build_tree(vec![low.clone(), high.clone()]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, high.id);
        assert_eq!(tree[1].id, low.id);
    }

    #[test]
    fn score_ties_break_by_insertion_order() {
        let sub = Uuid::new_v4();
        let first = comment(Uuid::new_v4(), sub, None, 3, 0);
        let second = comment(Uuid::new_v4(), sub, None, 3, 10);

        // Feed them in reverse to prove the sort, not the input order, wins.
        let tree = build_tree(vec![second.clone(), first.clone()]);
        assert_eq!(tree[0].id, first.id);
        assert_eq!(tree[1].id, second.id);
    }

    #[test]
    fn replies_nest_under_their_parent() {
        let sub = Uuid::new_v4();
        let root = comment(Uuid::new_v4(), sub, None, 0, 0);
        let child = comment(Uuid::new_v4(), sub, Some(root.id), 0, 1);
        let grandchild = comment(Uuid::new_v4(), sub, Some(child.id), 0, 2);

        let tree = build_tree(vec![grandchild.clone(), root.clone(), child.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, root.id);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].id, child.id);
        assert_eq!(tree[0].replies[0].replies[0].id, grandchild.id);
    }

    #[test]
    fn sibling_replies_sort_within_their_level() {
        let sub = Uuid::new_v4();
        let root = comment(Uuid::new_v4(), sub, None, 0, 0);
        let weak = comment(Uuid::new_v4(), sub, Some(root.id), -2, 1);
        let strong = comment(Uuid::new_v4(), sub, Some(root.id), 4, 2);

        let tree = build_tree(vec![root.clone(), weak.clone(), strong.clone()]);
        let replies = &tree[0].replies;
        assert_eq!(replies[0].id, strong.id);
        assert_eq!(replies[1].id, weak.id);
    }
}
