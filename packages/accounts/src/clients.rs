// ABOUTME: Client storage layer using SQLite
// ABOUTME: Lookups by id, by linked user, and by owning sales person

use chrono::Utc;
use opsdesk_core::{generate_id, validate_required};
use opsdesk_storage::{StorageError, StorageResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::types::{Client, ClientCreateInput};

pub struct ClientStorage {
    pool: SqlitePool,
}

impl ClientStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_client(&self, input: ClientCreateInput) -> StorageResult<Client> {
        validate_required("name", &input.name)?;
        validate_required("userId", &input.user_id)?;

        let client_id = generate_id("cli");
        let now = Utc::now();

        debug!(
            "Creating client: {} for user: {} (sales person: {:?})",
            client_id, input.user_id, input.sales_person_id
        );

        sqlx::query(
            r#"
            INSERT INTO clients (id, user_id, sales_person_id, name, contact_email, is_deleted, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&client_id)
        .bind(&input.user_id)
        .bind(&input.sales_person_id)
        .bind(input.name.trim())
        .bind(&input.contact_email)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_client(&client_id).await
    }

    pub async fn get_client(&self, client_id: &str) -> StorageResult<Client> {
        self.find_client(client_id)
            .await?
            .ok_or_else(|| StorageError::not_found("Client", client_id))
    }

    pub async fn find_client(&self, client_id: &str) -> StorageResult<Option<Client>> {
        debug!("Fetching client: {}", client_id);

        let row = sqlx::query("SELECT * FROM clients WHERE id = ?")
            .bind(client_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_client).transpose()
    }

    /// Resolve the client record linked to a `client` role user
    pub async fn find_client_by_user(&self, user_id: &str) -> StorageResult<Option<Client>> {
        debug!("Fetching client for user: {}", user_id);

        let row = sqlx::query("SELECT * FROM clients WHERE user_id = ? AND is_deleted = 0")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_client).transpose()
    }

    pub async fn list_clients_for_sales_person(
        &self,
        sales_person_id: &str,
    ) -> StorageResult<Vec<Client>> {
        debug!("Listing clients for sales person: {}", sales_person_id);

        let rows = sqlx::query(
            "SELECT * FROM clients WHERE sales_person_id = ? AND is_deleted = 0 ORDER BY name, id",
        )
        .bind(sales_person_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_client).collect()
    }
}

fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Client> {
    Ok(Client {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        sales_person_id: row.try_get("sales_person_id")?,
        name: row.try_get("name")?,
        contact_email: row.try_get("contact_email")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
