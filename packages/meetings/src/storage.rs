// ABOUTME: Meeting storage layer using SQLite
// ABOUTME: Handles scheduling, cancellation, and scoped listing of meetings

use chrono::Utc;
use opsdesk_core::{generate_id, validate_duration, validate_required};
use opsdesk_storage::{decode_id_set, StorageError, StorageResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use super::types::{Meeting, MeetingCreateInput, MeetingFilter, MeetingStatus};

pub struct MeetingStorage {
    pool: SqlitePool,
}

impl MeetingStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Schedule a meeting. The organizer is always an attendee.
    pub async fn create_meeting(
        &self,
        input: MeetingCreateInput,
        organizer_id: &str,
    ) -> StorageResult<Meeting> {
        validate_required("title", &input.title)?;
        validate_duration(input.duration_minutes)?;

        let client_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM clients WHERE id = ? AND is_deleted = 0")
                .bind(&input.client_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;
        if client_exists.is_none() {
            return Err(StorageError::not_found("Client", &input.client_id));
        }

        let meeting_id = generate_id("mtg");
        let now = Utc::now();
        let mut attendees = input.attendees;
        attendees.insert(organizer_id);

        debug!(
            "Creating meeting: {} for client: {}",
            meeting_id, input.client_id
        );

        sqlx::query(
            r#"
            INSERT INTO meetings (
                id, client_id, requirement_id, title, agenda, scheduled_at,
                duration_minutes, organizer_id, attendees, meeting_link, status,
                is_deleted, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&meeting_id)
        .bind(&input.client_id)
        .bind(&input.requirement_id)
        .bind(input.title.trim())
        .bind(&input.agenda)
        .bind(input.scheduled_at)
        .bind(input.duration_minutes)
        .bind(organizer_id)
        .bind(attendees.to_json_column())
        .bind(&input.meeting_link)
        .bind(MeetingStatus::Scheduled)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_meeting(&meeting_id).await
    }

    pub async fn get_meeting(&self, meeting_id: &str) -> StorageResult<Meeting> {
        debug!("Fetching meeting: {}", meeting_id);

        let row = sqlx::query("SELECT * FROM meetings WHERE id = ? AND is_deleted = 0")
            .bind(meeting_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        match row {
            Some(row) => row_to_meeting(&row),
            None => Err(StorageError::not_found("Meeting", meeting_id)),
        }
    }

    pub async fn cancel_meeting(&self, meeting_id: &str) -> StorageResult<Meeting> {
        debug!("Cancelling meeting: {}", meeting_id);

        let result = sqlx::query(
            "UPDATE meetings SET status = ?, updated_at = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(MeetingStatus::Cancelled)
        .bind(Utc::now())
        .bind(meeting_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Meeting", meeting_id));
        }

        self.get_meeting(meeting_id).await
    }

    pub async fn list_meetings(&self, filter: &MeetingFilter) -> StorageResult<Vec<Meeting>> {
        debug!("Listing meetings with filter: {:?}", filter);

        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT m.* FROM meetings m WHERE m.is_deleted = 0");

        if let Some(client_id) = &filter.client_id {
            query.push(" AND m.client_id = ");
            query.push_bind(client_id.clone());
        }
        if let Some(sales_person_id) = &filter.client_sales_person_id {
            query.push(" AND m.client_id IN (SELECT c.id FROM clients c WHERE c.sales_person_id = ");
            query.push_bind(sales_person_id.clone());
            query.push(")");
        }
        if let Some(requirement_id) = &filter.requirement_id {
            query.push(" AND m.requirement_id = ");
            query.push_bind(requirement_id.clone());
        }
        if let Some(attendee_id) = &filter.attendee_id {
            query.push(" AND EXISTS (SELECT 1 FROM json_each(m.attendees) WHERE json_each.value = ");
            query.push_bind(attendee_id.clone());
            query.push(")");
        }

        query.push(" ORDER BY m.created_at DESC, m.id");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_meeting).collect()
    }
}

fn row_to_meeting(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Meeting> {
    let attendees: String = row.try_get("attendees")?;

    Ok(Meeting {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        requirement_id: row.try_get("requirement_id")?,
        title: row.try_get("title")?,
        agenda: row.try_get("agenda")?,
        scheduled_at: row.try_get("scheduled_at")?,
        duration_minutes: row.try_get("duration_minutes")?,
        organizer_id: row.try_get("organizer_id")?,
        attendees: decode_id_set(&attendees)?,
        meeting_link: row.try_get("meeting_link")?,
        status: row.try_get("status")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
