// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles provisioning, lookup, and deactivation of user accounts

use chrono::Utc;
use opsdesk_core::{generate_id, validate_required, Role};
use opsdesk_storage::{StorageError, StorageResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::types::{User, UserCreateInput};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, input: UserCreateInput) -> StorageResult<User> {
        validate_required("name", &input.name)?;
        validate_required("email", &input.email)?;

        let user_id = generate_id("usr");
        let now = Utc::now();

        debug!("Creating user: {} (role: {})", user_id, input.role);

        sqlx::query(
            r#"
            INSERT INTO users (id, role, name, email, is_active, is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, 0, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(input.role)
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_user(&user_id).await
    }

    /// Fetch a user regardless of its active or deleted flags
    pub async fn get_user(&self, user_id: &str) -> StorageResult<User> {
        self.find_user(user_id)
            .await?
            .ok_or_else(|| StorageError::not_found("User", user_id))
    }

    pub async fn find_user(&self, user_id: &str) -> StorageResult<Option<User>> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn list_users_by_role(&self, role: Role) -> StorageResult<Vec<User>> {
        debug!("Listing users with role: {}", role);

        let rows = sqlx::query(
            "SELECT * FROM users WHERE role = ? AND is_deleted = 0 ORDER BY name, id",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_user).collect()
    }

    /// Mark a user inactive; the record stays referenceable
    pub async fn deactivate_user(&self, user_id: &str) -> StorageResult<User> {
        debug!("Deactivating user: {}", user_id);

        let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("User", user_id));
        }

        self.get_user(user_id).await
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> StorageResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        role: row.try_get("role")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        is_active: row.try_get("is_active")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
