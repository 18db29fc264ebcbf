// Storage layer - SQLx pool, schema, and the aggregate stores

pub mod comments;
pub mod database;
pub mod paging;
pub mod reviews;
pub mod users;

pub use comments::CommentStore;
pub use database::Database;
pub use paging::{FilterField, PagedResult, ReviewFilter, SortKey};
pub use reviews::ReviewStore;
pub use users::UserStore;
