pub mod comment;
pub mod submission;
pub mod subreddit;
pub mod user;
pub mod vote;

pub use comment::*;
pub use submission::*;
pub use subreddit::*;
pub use user::*;
pub use vote::*;
