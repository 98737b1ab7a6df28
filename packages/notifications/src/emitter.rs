// ABOUTME: Notification emission for workflow side effects
// ABOUTME: Sink trait for persistence and an emitter whose best-effort path never fails callers

use std::sync::Arc;

use async_trait::async_trait;
use opsdesk_storage::StorageResult;
use tracing::{info, warn};

use crate::storage::NotificationStorage;
use crate::types::{NewNotification, Notification};

/// Where emitted notifications are persisted
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: NewNotification) -> StorageResult<Notification>;
}

#[async_trait]
impl NotificationSink for NotificationStorage {
    async fn deliver(&self, notification: NewNotification) -> StorageResult<Notification> {
        self.insert_notification(&notification).await
    }
}

#[derive(Clone)]
pub struct NotificationEmitter {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationEmitter {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub async fn emit(&self, notification: NewNotification) -> StorageResult<String> {
        let stored = self.sink.deliver(notification).await?;
        info!(
            "Notification {} ({:?}) sent to {}",
            stored.id, stored.notification_type, stored.sent_to
        );
        Ok(stored.id)
    }

    /// Emit, logging and swallowing any failure. Returns the notification
    /// id when it was persisted.
    pub async fn emit_best_effort(&self, notification: NewNotification) -> Option<String> {
        let notification_type = notification.notification_type;
        let sent_to = notification.sent_to.clone();
        let related_entity_id = notification.related_entity_id.clone();

        match self.emit(notification).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(
                    "Failed to emit {:?} notification to {} for {}: {}",
                    notification_type, sent_to, related_entity_id, e
                );
                None
            }
        }
    }
}
