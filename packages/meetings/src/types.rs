// ABOUTME: Meeting type definitions
// ABOUTME: Structures for meetings, their status, and scheduling input

use chrono::{DateTime, Utc};
use opsdesk_core::IdSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub client_id: String,
    pub requirement_id: Option<String>,
    pub title: String,
    pub agenda: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub organizer_id: String,
    pub attendees: IdSet,
    pub meeting_link: Option<String>,
    pub status: MeetingStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingCreateInput {
    pub client_id: String,
    pub requirement_id: Option<String>,
    pub title: String,
    pub agenda: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub attendees: IdSet,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MeetingFilter {
    pub client_id: Option<String>,
    pub client_sales_person_id: Option<String>,
    pub requirement_id: Option<String>,
    pub attendee_id: Option<String>,
}
