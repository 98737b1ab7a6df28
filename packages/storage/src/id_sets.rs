// ABOUTME: Atomic set-valued column writes
// ABOUTME: Idempotent append into JSON array columns executed as a single statement

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{StorageError, StorageResult};

/// A JSON array column holding unique ids, e.g. `requirements.requested_by`
#[derive(Debug, Clone, Copy)]
pub struct IdSetColumn {
    pub entity: &'static str,
    pub table: &'static str,
    pub column: &'static str,
    /// Extra predicate restricting which rows are writable, e.g. `AND is_deleted = 0`
    pub live_filter: &'static str,
}

impl IdSetColumn {
    /// Append `value` unless already present.
    ///
    /// The membership check and the write are one UPDATE statement, so
    /// concurrent appends to the same row compose as set union. Returns
    /// `true` when the value was added, `false` when it was already there.
    pub async fn append(
        &self,
        pool: &SqlitePool,
        record_id: &str,
        value: &str,
    ) -> StorageResult<bool> {
        debug!(
            "Appending {} to {}.{} of {}",
            value, self.table, self.column, record_id
        );

        // Table and column names are compile-time constants; values are bound
        let update = format!(
            r#"
            UPDATE {table}
            SET {column} = json_insert({column}, '$[#]', ?), updated_at = ?
            WHERE id = ? {live}
            AND NOT EXISTS (
                SELECT 1 FROM json_each({table}.{column}) WHERE json_each.value = ?
            )
            "#,
            table = self.table,
            column = self.column,
            live = self.live_filter,
        );

        let result = sqlx::query(&update)
            .bind(value)
            .bind(Utc::now())
            .bind(record_id)
            .bind(value)
            .execute(pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists = format!(
            "SELECT COUNT(*) FROM {table} WHERE id = ? {live}",
            table = self.table,
            live = self.live_filter,
        );
        let count: i64 = sqlx::query_scalar(&exists)
            .bind(record_id)
            .fetch_one(pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if count == 0 {
            return Err(StorageError::not_found(self.entity, record_id));
        }

        Ok(false)
    }
}
