use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::auth::policy::can_mutate;
use crate::error::{AppError, AppResult};
use crate::models::{Actor, Comment, CommentWithReview};
use crate::store::paging::{page_offset, PagedResult, SortKey};

#[derive(Clone)]
pub struct CommentStore {
    pool: SqlitePool,
    author_page_size: u32,
}

impl CommentStore {
    pub fn new(pool: SqlitePool, author_page_size: u32) -> Self {
        CommentStore {
            pool,
            author_page_size,
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        review_id: i64,
        content: String,
        parent_id: Option<i64>,
    ) -> AppResult<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }

        let review = sqlx::query("SELECT 1 FROM reviews WHERE id = ?")
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?;
        if review.is_none() {
            return Err(AppError::NotFound(format!(
                "Review {} not found",
                review_id
            )));
        }

        if let Some(parent_id) = parent_id {
            self.check_parent(review_id, parent_id).await?;
        }

        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO comments (review_id, parent_id, content, author_id, author_name, created, updated)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(review_id)
        .bind(parent_id)
        .bind(&content)
        .bind(actor.id)
        .bind(&actor.username)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            review_id,
            parent_id,
            content,
            author_id: actor.id,
            author_name: actor.username.clone(),
            created: now,
            updated: now,
        })
    }

    /// A reply may only target a top-level comment on the same review.
    async fn check_parent(&self, review_id: i64, parent_id: i64) -> AppResult<()> {
        let row = sqlx::query("SELECT review_id, parent_id FROM comments WHERE id = ?")
            .bind(parent_id)
            .fetch_optional(&self.pool)
            .await?;

        let row = match row {
            Some(row) => row,
            None => {
                return Err(AppError::Validation(format!(
                    "Parent comment {} not found",
                    parent_id
                )))
            }
        };

        if row.get::<i64, _>("review_id") != review_id {
            return Err(AppError::Validation(
                "Parent comment belongs to a different review".to_string(),
            ));
        }
        if row.get::<Option<i64>, _>("parent_id").is_some() {
            return Err(AppError::Validation(
                "Replies to replies are not allowed".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn find(&self, id: i64) -> AppResult<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, review_id, parent_id, content, author_id, author_name, created, updated
             FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_comment))
    }

    pub async fn get(&self, id: i64) -> AppResult<Comment> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }

    pub async fn update(&self, actor: &Actor, id: i64, content: String) -> AppResult<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("Content is required".to_string()));
        }

        let mut comment = self.get(id).await?;

        if !can_mutate(actor, comment.author_id) {
            return Err(AppError::Forbidden(
                "Only the author may edit this comment".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        sqlx::query("UPDATE comments SET content = ?, updated = ? WHERE id = ?")
            .bind(&content)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        comment.content = content;
        comment.updated = now;
        Ok(comment)
    }

    /// Deleting a top-level comment takes its replies with it, in one unit.
    pub async fn delete(&self, actor: &Actor, id: i64) -> AppResult<()> {
        let comment = self.get(id).await?;

        if !can_mutate(actor, comment.author_id) {
            return Err(AppError::Forbidden(
                "Only the author may delete this comment".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE parent_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Flat listing in creation order; `parent_id` lets the consumer indent.
    pub async fn list_by_review(&self, review_id: i64) -> AppResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, review_id, parent_id, content, author_id, author_name, created, updated
             FROM comments WHERE review_id = ? ORDER BY created ASC, id ASC",
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_comment).collect())
    }

    pub async fn list_by_author(
        &self,
        username: &str,
        page: i64,
        sort: SortKey,
    ) -> AppResult<PagedResult<CommentWithReview>> {
        let total_count: i64 = sqlx::query("SELECT COUNT(*) FROM comments WHERE author_name = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await?
            .get(0);

        let offset = match page_offset(page, total_count, self.author_page_size) {
            Some(offset) => offset,
            None => {
                return Ok(PagedResult::out_of_range(
                    page,
                    total_count,
                    self.author_page_size,
                ))
            }
        };

        let order_sql = match sort {
            SortKey::Oldest => "c.created ASC, c.id ASC",
            _ => "c.created DESC, c.id DESC",
        };

        let list_sql = format!(
            "SELECT c.id, c.review_id, r.title AS review_title, c.parent_id, c.content,
                    c.author_id, c.author_name, c.created, c.updated
             FROM comments c JOIN reviews r ON r.id = c.review_id
             WHERE c.author_name = ? ORDER BY {} LIMIT ? OFFSET ?",
            order_sql
        );
        let rows = sqlx::query(&list_sql)
            .bind(username)
            .bind(self.author_page_size as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| CommentWithReview {
                id: row.get("id"),
                review_id: row.get("review_id"),
                review_title: row.get("review_title"),
                parent_id: row.get("parent_id"),
                content: row.get("content"),
                author_id: row.get("author_id"),
                author_name: row.get("author_name"),
                created: row.get("created"),
                updated: row.get("updated"),
            })
            .collect();

        Ok(PagedResult::page(
            items,
            page,
            total_count,
            self.author_page_size,
        ))
    }
}

fn row_to_comment(row: sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        review_id: row.get("review_id"),
        parent_id: row.get("parent_id"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        author_name: row.get("author_name"),
        created: row.get("created"),
        updated: row.get("updated"),
    }
}
