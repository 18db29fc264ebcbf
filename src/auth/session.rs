use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::Engine;
use chrono::Utc;
use rand::Rng;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::{AppError, AppResult};
use crate::models::Actor;

/// Issues and resolves opaque bearer credentials. The token itself carries
/// nothing; all state lives in the sessions table.
#[derive(Clone)]
pub struct SessionService {
    pool: SqlitePool,
    ttl_secs: i64,
}

impl SessionService {
    pub fn new(pool: SqlitePool, ttl_secs: i64) -> Self {
        SessionService { pool, ttl_secs }
    }

    pub async fn issue(&self, user_id: i64) -> AppResult<String> {
        let mut bytes = [0u8; 32];
        rand::rng().fill(&mut bytes[..]);
        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);

        let now = Utc::now().timestamp();
        sqlx::query("INSERT INTO sessions (token, user_id, created, expires) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(now)
            .bind(now + self.ttl_secs)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Maps a bearer credential to the acting identity. Unknown and expired
    /// tokens are indistinguishable to the caller; expired rows are dropped
    /// on the way out.
    pub async fn resolve(&self, token: &str) -> AppResult<Actor> {
        let row = sqlx::query(
            "SELECT s.expires, u.id, u.username, u.is_admin
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => {
                return Err(AppError::Unauthenticated(
                    "Invalid or expired credential".to_string(),
                ))
            }
        };

        if row.get::<i64, _>("expires") <= Utc::now().timestamp() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AppError::Unauthenticated(
                "Invalid or expired credential".to_string(),
            ));
        }

        Ok(Actor {
            id: row.get("id"),
            username: row.get("username"),
            is_admin: row.get("is_admin"),
        })
    }

    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
