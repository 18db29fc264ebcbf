// Domain records - users, reviews, comments

pub mod comment;
pub mod review;
pub mod user;

pub use comment::{Comment, CommentWithReview, NewComment};
pub use review::{NewReview, Review, ReviewPatch};
pub use user::{Actor, NewUser, SocialProvider, User};
