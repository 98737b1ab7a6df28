// ABOUTME: Notification storage layer using SQLite
// ABOUTME: Append-only inserts plus recipient-scoped listing and read marking

use chrono::Utc;
use opsdesk_core::generate_id;
use opsdesk_storage::{StorageError, StorageResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::types::{NewNotification, Notification};

#[derive(Clone)]
pub struct NotificationStorage {
    pool: SqlitePool,
}

impl NotificationStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> StorageResult<Notification> {
        let notification_id = generate_id("ntf");
        let now = Utc::now();

        debug!(
            "Creating notification: {} ({:?}) for {}",
            notification_id, notification.notification_type, notification.sent_to
        );

        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, sent_to, notification_type, related_entity_type, related_entity_id,
                initiated_by, title, message, is_read, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(&notification_id)
        .bind(&notification.sent_to)
        .bind(notification.notification_type)
        .bind(notification.related_entity_type)
        .bind(&notification.related_entity_id)
        .bind(&notification.initiated_by)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(Notification {
            id: notification_id,
            sent_to: notification.sent_to.clone(),
            notification_type: notification.notification_type,
            related_entity_type: notification.related_entity_type,
            related_entity_id: notification.related_entity_id.clone(),
            initiated_by: notification.initiated_by.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            is_read: false,
            created_at: now,
        })
    }

    /// Notifications addressed to `user_id`, newest first
    pub async fn list_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> StorageResult<Vec<Notification>> {
        debug!("Listing notifications for {} (unread only: {})", user_id, unread_only);

        let query = if unread_only {
            "SELECT * FROM notifications WHERE sent_to = ? AND is_read = 0 ORDER BY created_at DESC, id"
        } else {
            "SELECT * FROM notifications WHERE sent_to = ? ORDER BY created_at DESC, id"
        };

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_notification).collect()
    }

    /// Mark a notification read. Only its recipient may do so; anyone else
    /// gets `NotFound`.
    pub async fn mark_read(&self, notification_id: &str, user_id: &str) -> StorageResult<()> {
        debug!("Marking notification {} read for {}", notification_id, user_id);

        let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND sent_to = ?")
            .bind(notification_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Notification", notification_id));
        }

        Ok(())
    }
}

fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Notification> {
    Ok(Notification {
        id: row.try_get("id")?,
        sent_to: row.try_get("sent_to")?,
        notification_type: row.try_get("notification_type")?,
        related_entity_type: row.try_get("related_entity_type")?,
        related_entity_id: row.try_get("related_entity_id")?,
        initiated_by: row.try_get("initiated_by")?,
        title: row.try_get("title")?,
        message: row.try_get("message")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}
