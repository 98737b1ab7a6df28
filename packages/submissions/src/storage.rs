// ABOUTME: Submission storage layer using SQLite
// ABOUTME: Numbered inserts, scoped listing, review writes, and soft delete

use chrono::Utc;
use opsdesk_core::generate_id;
use opsdesk_storage::{decode_json, StorageError, StorageResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::types::{NewSubmission, ReviewRecord, Submission, SubmissionFilter, SubmissionStatus};

pub struct SubmissionStorage {
    pool: SqlitePool,
}

impl SubmissionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a live (not soft-deleted) submission
    pub async fn get_submission(&self, submission_id: &str) -> StorageResult<Submission> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        fetch_live_submission(&mut conn, submission_id).await
    }

    /// Point lookup including soft-deleted records
    pub async fn find_submission(&self, submission_id: &str) -> StorageResult<Option<Submission>> {
        debug!("Fetching submission: {}", submission_id);

        let row = sqlx::query("SELECT * FROM submissions WHERE id = ?")
            .bind(submission_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_submission).transpose()
    }

    /// List live submissions matching every populated filter field
    pub async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
    ) -> StorageResult<Vec<Submission>> {
        debug!("Listing submissions with filter: {:?}", filter);

        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT s.* FROM submissions s WHERE s.is_deleted = 0");

        if let Some(client_id) = &filter.client_id {
            query.push(" AND s.client_id = ");
            query.push_bind(client_id.clone());
        }
        if let Some(sales_person_id) = &filter.client_sales_person_id {
            query.push(" AND s.client_id IN (SELECT c.id FROM clients c WHERE c.sales_person_id = ");
            query.push_bind(sales_person_id.clone());
            query.push(")");
        }
        if let Some(submitted_by) = &filter.submitted_by {
            query.push(" AND s.submitted_by = ");
            query.push_bind(submitted_by.clone());
        }
        if let Some(requirement_id) = &filter.requirement_id {
            query.push(" AND s.requirement_id = ");
            query.push_bind(requirement_id.clone());
        }
        if let Some(status) = filter.status {
            query.push(" AND s.status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY s.created_at DESC, s.id");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_submission).collect()
    }

    /// Move a pending submission to under-review. Returns `false` when the
    /// submission was not pending at the time of the write.
    pub async fn mark_under_review(&self, submission_id: &str) -> StorageResult<bool> {
        debug!("Starting review of submission: {}", submission_id);

        let result = sqlx::query(
            r#"
            UPDATE submissions SET status = ?, updated_at = ?
            WHERE id = ? AND status = ? AND is_deleted = 0
            "#,
        )
        .bind(SubmissionStatus::UnderReview)
        .bind(Utc::now())
        .bind(submission_id)
        .bind(SubmissionStatus::Pending)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete_submission(&self, submission_id: &str) -> StorageResult<()> {
        debug!("Soft deleting submission: {}", submission_id);

        let result = sqlx::query(
            "UPDATE submissions SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(Utc::now())
        .bind(submission_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Submission", submission_id));
        }

        Ok(())
    }

    /// The most recent live submission of every task, by submission number
    pub async fn latest_submission_per_task(&self) -> StorageResult<Vec<Submission>> {
        debug!("Loading latest submission per task");

        let rows = sqlx::query(
            r#"
            SELECT s.* FROM submissions s
            WHERE s.is_deleted = 0
            AND s.submission_number = (
                SELECT MAX(s2.submission_number) FROM submissions s2
                WHERE s2.task_id = s.task_id AND s2.is_deleted = 0
            )
            ORDER BY s.submission_number
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_submission).collect()
    }
}

/// Insert a submission, allocating the next submission number inside the
/// same statement. The UNIQUE index on `submission_number` rejects any
/// duplicate a concurrent writer could produce.
pub async fn insert_submission(
    conn: &mut SqliteConnection,
    input: &NewSubmission,
) -> StorageResult<Submission> {
    let submission_id = generate_id("sub");
    let now = Utc::now();
    let deliverables = serde_json::to_string(&input.deliverables)?;

    debug!(
        "Creating submission: {} for task: {}",
        submission_id, input.task_id
    );

    sqlx::query(
        r#"
        INSERT INTO submissions (
            id, task_id, requirement_id, client_id, submitted_by, submission_number,
            title, description, deliverables, status, version, previous_submission_id,
            is_deleted, created_at, updated_at
        )
        SELECT ?, ?, ?, ?, ?, COALESCE(MAX(submission_number), 0) + 1,
               ?, ?, ?, ?, ?, ?, 0, ?, ?
        FROM submissions
        "#,
    )
    .bind(&submission_id)
    .bind(&input.task_id)
    .bind(&input.requirement_id)
    .bind(&input.client_id)
    .bind(&input.submitted_by)
    .bind(input.title.trim())
    .bind(&input.description)
    .bind(&deliverables)
    .bind(SubmissionStatus::Pending)
    .bind(input.version)
    .bind(&input.previous_submission_id)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    fetch_live_submission(conn, &submission_id).await
}

/// Overwrite the review fields of a live submission
pub async fn record_review(
    conn: &mut SqliteConnection,
    submission_id: &str,
    review: &ReviewRecord,
) -> StorageResult<Submission> {
    debug!(
        "Recording {:?} on submission: {}",
        review.decision, submission_id
    );

    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE submissions
        SET status = ?, reviewed_by = ?, reviewed_at = ?, review_notes = ?,
            requested_changes = ?, updated_at = ?
        WHERE id = ? AND is_deleted = 0
        "#,
    )
    .bind(review.decision.status())
    .bind(&review.reviewer_id)
    .bind(now)
    .bind(&review.notes)
    .bind(&review.requested_changes)
    .bind(now)
    .bind(submission_id)
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Submission", submission_id));
    }

    fetch_live_submission(conn, submission_id).await
}

pub async fn fetch_live_submission(
    conn: &mut SqliteConnection,
    submission_id: &str,
) -> StorageResult<Submission> {
    let row = sqlx::query("SELECT * FROM submissions WHERE id = ? AND is_deleted = 0")
        .bind(submission_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    match row {
        Some(row) => row_to_submission(&row),
        None => Err(StorageError::not_found("Submission", submission_id)),
    }
}

fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Submission> {
    let deliverables: String = row.try_get("deliverables")?;

    Ok(Submission {
        id: row.try_get("id")?,
        task_id: row.try_get("task_id")?,
        requirement_id: row.try_get("requirement_id")?,
        client_id: row.try_get("client_id")?,
        submitted_by: row.try_get("submitted_by")?,
        submission_number: row.try_get("submission_number")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        deliverables: decode_json(&deliverables)?,
        status: row.try_get("status")?,
        version: row.try_get("version")?,
        previous_submission_id: row.try_get("previous_submission_id")?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        review_notes: row.try_get("review_notes")?,
        requested_changes: row.try_get("requested_changes")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
