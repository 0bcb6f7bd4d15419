pub mod comment_service;
pub mod submission_service;
pub mod subreddit_service;
pub mod user_service;
pub mod vote_service;
