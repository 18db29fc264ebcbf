use serde::{Deserialize, Serialize};

/// A remark on a review. `parent_id` points at a top-level comment when this
/// is a reply; nesting never goes deeper than one level.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
    pub created: i64,
    pub updated: i64,
}

/// A comment joined with the title of its owning review, for the
/// "my comments" listing.
#[derive(Debug, Clone, Serialize)]
pub struct CommentWithReview {
    pub id: i64,
    pub review_id: i64,
    pub review_title: String,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
    pub created: i64,
    pub updated: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}
