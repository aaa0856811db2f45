//! # User Repository
//!
//! Staff accounts: who acted, and under which role. Authentication is not
//! handled here; callers pass the acting user's id.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use kasir_core::validation::{validate_name, validate_required_text, MAX_TEXT_LEN};
use kasir_core::{Role, User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a staff account. Emails are unique.
    pub async fn insert(&self, name: &str, email: &str, role: Role) -> DbResult<User> {
        validate_name(name)?;
        validate_required_text("email", email, MAX_TEXT_LEN)?;

        let user = User {
            id: generate_id(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            role,
            created_at: Utc::now(),
        };

        debug!(email = %user.email, role = role.as_str(), "Inserting user");

        sqlx::query("INSERT INTO users (id, name, email, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)")
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.role)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(&user.email))?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users WHERE email = ?1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, role, created_at FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
