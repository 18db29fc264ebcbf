use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, SocialProvider, User};

pub const USERNAME_MIN_CHARS: usize = 2;
pub const USERNAME_MAX_CHARS: usize = 8;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// Length is counted in Unicode scalar values so Hangul names measure the
/// same as Latin ones. The narrower UI alphabet is a presentation concern.
pub fn validate_username(username: &str) -> AppResult<()> {
    let chars = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&chars) {
        return Err(AppError::Validation(format!(
            "Username must be {} to {} characters",
            USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
        )));
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::Validation(
            "Username must not contain whitespace".to_string(),
        ));
    }
    Ok(())
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        UserStore { pool }
    }

    pub async fn create(&self, new: NewUser) -> AppResult<User> {
        validate_username(&new.username)?;

        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, provider, provider_id, is_admin, created)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.provider.map(|p| p.as_str()))
        .bind(&new.provider_id)
        .bind(new.is_admin)
        .bind(now)
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                if db_err.message().contains("users.username") {
                    return Err(AppError::Conflict(format!(
                        "Username \"{}\" is already taken",
                        new.username
                    )));
                }
                return Err(AppError::Conflict(
                    "Social account is already linked to another user".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(User {
            id: result.last_insert_rowid(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            provider: new.provider,
            provider_id: new.provider_id,
            is_admin: new.is_admin,
            created: now,
        })
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, provider, provider_id, is_admin, created
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, provider, provider_id, is_admin, created
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_provider(
        &self,
        provider: SocialProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, provider, provider_id, is_admin, created
             FROM users WHERE provider = ? AND provider_id = ?",
        )
        .bind(provider.as_str())
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, provider, provider_id, is_admin, created
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_user))
    }

    /// Advisory check for the signup form. The UNIQUE constraint at creation
    /// time remains the authoritative guard against the read-then-write race.
    pub async fn is_username_available(&self, username: &str) -> AppResult<bool> {
        validate_username(username)?;

        let row = sqlx::query("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_none())
    }

    pub async fn set_password(&self, user_id: i64, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        provider: row
            .get::<Option<String>, _>("provider")
            .and_then(|p| SocialProvider::parse(&p)),
        provider_id: row.get("provider_id"),
        is_admin: row.get("is_admin"),
        created: row.get("created"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length_in_chars() {
        assert!(validate_username("ab").is_ok());
        assert!(validate_username("책벌레").is_ok());
        assert!(validate_username("가나다라마바사아").is_ok());
        assert!(validate_username("a").is_err());
        assert!(validate_username("ninechars").is_err());
        assert!(validate_username("가나다라마바사아자").is_err());
    }

    #[test]
    fn test_username_rejects_whitespace() {
        assert!(validate_username("a b").is_err());
        assert!(validate_username("ab\t").is_err());
        assert!(validate_username("ab\n").is_err());
    }
}
