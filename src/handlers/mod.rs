pub mod auth;
pub mod comments;
pub mod submissions;
pub mod subreddits;
pub mod users;
pub mod votes;
