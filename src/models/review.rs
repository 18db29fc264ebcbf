use serde::{Deserialize, Serialize};

/// A book review. `author_id` is the canonical ownership reference;
/// `author_name` is denormalized for display only.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub title: String,
    pub book_title: String,
    pub publisher: Option<String>,
    pub book_author: Option<String>,
    pub content: String,
    pub author_id: i64,
    pub author_name: String,
    pub views: i64,
    pub created: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub title: String,
    pub book_title: String,
    pub content: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub book_author: Option<String>,
}

/// Partial update. Absent fields are left unchanged; blank values clear the
/// optional fields and are rejected for the mandatory ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewPatch {
    pub title: Option<String>,
    pub book_title: Option<String>,
    pub content: Option<String>,
    pub publisher: Option<String>,
    pub book_author: Option<String>,
}
