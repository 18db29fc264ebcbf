use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::auth::policy::can_mutate;
use crate::error::{AppError, AppResult};
use crate::models::{Actor, NewReview, Review, ReviewPatch};
use crate::store::paging::{page_offset, FilterField, PagedResult, ReviewFilter, SortKey};

#[derive(Clone)]
pub struct ReviewStore {
    pool: SqlitePool,
    page_size: u32,
}

impl ReviewStore {
    pub fn new(pool: SqlitePool, page_size: u32) -> Self {
        ReviewStore { pool, page_size }
    }

    pub async fn create(&self, actor: &Actor, new: NewReview) -> AppResult<Review> {
        require_non_blank("Title", &new.title)?;
        require_non_blank("Book title", &new.book_title)?;
        require_non_blank("Content", &new.content)?;

        let publisher = normalize_optional(new.publisher);
        let book_author = normalize_optional(new.book_author);

        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO reviews (title, book_title, publisher, book_author, content, author_id, author_name, views, created)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&new.title)
        .bind(&new.book_title)
        .bind(&publisher)
        .bind(&book_author)
        .bind(&new.content)
        .bind(actor.id)
        .bind(&actor.username)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Review {
            id: result.last_insert_rowid(),
            title: new.title,
            book_title: new.book_title,
            publisher,
            book_author,
            content: new.content,
            author_id: actor.id,
            author_name: actor.username.clone(),
            views: 0,
            created: now,
        })
    }

    pub async fn find(&self, id: i64) -> AppResult<Option<Review>> {
        let row = sqlx::query(
            "SELECT id, title, book_title, publisher, book_author, content, author_id, author_name, views, created
             FROM reviews WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_review))
    }

    /// Pure read. View counting is the separate `record_view`.
    pub async fn get(&self, id: i64) -> AppResult<Review> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review {} not found", id)))
    }

    /// Explicit view-counter increment, composed with `get` by the caller.
    pub async fn record_view(&self, id: i64) -> AppResult<i64> {
        let result = sqlx::query("UPDATE reviews SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review {} not found", id)));
        }

        let row = sqlx::query("SELECT views FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get(0))
    }

    pub async fn update(&self, actor: &Actor, id: i64, patch: ReviewPatch) -> AppResult<Review> {
        let mut review = self.get(id).await?;

        if !can_mutate(actor, review.author_id) {
            return Err(AppError::Forbidden(
                "Only the author may edit this review".to_string(),
            ));
        }

        if let Some(title) = patch.title {
            require_non_blank("Title", &title)?;
            review.title = title;
        }
        if let Some(book_title) = patch.book_title {
            require_non_blank("Book title", &book_title)?;
            review.book_title = book_title;
        }
        if let Some(content) = patch.content {
            require_non_blank("Content", &content)?;
            review.content = content;
        }
        if let Some(publisher) = patch.publisher {
            review.publisher = normalize_optional(Some(publisher));
        }
        if let Some(book_author) = patch.book_author {
            review.book_author = normalize_optional(Some(book_author));
        }

        sqlx::query(
            "UPDATE reviews SET title = ?, book_title = ?, publisher = ?, book_author = ?, content = ?
             WHERE id = ?",
        )
        .bind(&review.title)
        .bind(&review.book_title)
        .bind(&review.publisher)
        .bind(&review.book_author)
        .bind(&review.content)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(review)
    }

    /// Deletes the review and every comment attached to it as one unit.
    /// Partial deletion is never observable.
    pub async fn delete(&self, actor: &Actor, id: i64) -> AppResult<()> {
        let review = self.get(id).await?;

        if !can_mutate(actor, review.author_id) {
            return Err(AppError::Forbidden(
                "Only the author may delete this review".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE review_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Deleted review {} by actor {}", id, actor.id);
        Ok(())
    }

    pub async fn list(
        &self,
        page: i64,
        sort: SortKey,
        filter: Option<ReviewFilter>,
    ) -> AppResult<PagedResult<Review>> {
        let (where_sql, pattern) = match &filter {
            Some(f) => {
                let column = match f.field {
                    FilterField::Title => "title",
                    FilterField::Username => "author_name",
                };
                (
                    format!(" WHERE LOWER({}) LIKE ?", column),
                    Some(format!("%{}%", f.term.to_lowercase())),
                )
            }
            None => (String::new(), None),
        };

        let count_sql = format!("SELECT COUNT(*) FROM reviews{}", where_sql);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(pattern) = &pattern {
            count_query = count_query.bind(pattern);
        }
        let total_count: i64 = count_query.fetch_one(&self.pool).await?.get(0);

        let offset = match page_offset(page, total_count, self.page_size) {
            Some(offset) => offset,
            None => return Ok(PagedResult::out_of_range(page, total_count, self.page_size)),
        };

        let order_sql = match sort {
            SortKey::Latest => "created DESC, id DESC",
            SortKey::Oldest => "created ASC, id ASC",
            SortKey::MostViewed => "views DESC, created DESC, id DESC",
        };

        let list_sql = format!(
            "SELECT id, title, book_title, publisher, book_author, content, author_id, author_name, views, created
             FROM reviews{} ORDER BY {} LIMIT ? OFFSET ?",
            where_sql, order_sql
        );
        let mut list_query = sqlx::query(&list_sql);
        if let Some(pattern) = &pattern {
            list_query = list_query.bind(pattern);
        }
        let rows = list_query
            .bind(self.page_size as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(row_to_review).collect();
        Ok(PagedResult::page(items, page, total_count, self.page_size))
    }
}

fn require_non_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn row_to_review(row: sqlx::sqlite::SqliteRow) -> Review {
    Review {
        id: row.get("id"),
        title: row.get("title"),
        book_title: row.get("book_title"),
        publisher: row.get("publisher"),
        book_author: row.get("book_author"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        author_name: row.get("author_name"),
        views: row.get("views"),
        created: row.get("created"),
    }
}
