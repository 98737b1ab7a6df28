// ABOUTME: Notification type definitions
// ABOUTME: Notification kinds, related entity kinds, and stored/new records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    SubmissionCreated,
    SubmissionApproved,
    SubmissionRejected,
    ChangesRequested,
    RequirementAssigned,
    TaskAssigned,
    AssignmentRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RelatedEntityType {
    Requirement,
    Task,
    Submission,
    Meeting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub sent_to: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub related_entity_type: RelatedEntityType,
    pub related_entity_id: String,
    pub initiated_by: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub sent_to: String,
    pub notification_type: NotificationType,
    pub related_entity_type: RelatedEntityType,
    pub related_entity_id: String,
    pub initiated_by: String,
    pub title: String,
    pub message: String,
}
