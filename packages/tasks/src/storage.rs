// ABOUTME: Task storage layer using SQLite
// ABOUTME: Handles CRUD, request log appends, owner replacement, and in-transaction state writes

use chrono::Utc;
use opsdesk_core::{generate_id, validate_progress, validate_required, AssignmentChange};
use opsdesk_storage::{decode_id_set, IdSetColumn, StorageError, StorageResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::types::{Task, TaskCreateInput, TaskStateChange, TaskStatus, TaskUpdateInput};

const REQUESTED_BY: IdSetColumn = IdSetColumn {
    entity: "Task",
    table: "tasks",
    column: "requested_by",
    live_filter: "",
};

const MAX_ASSIGN_ATTEMPTS: usize = 16;

pub struct TaskStorage {
    pool: SqlitePool,
}

impl TaskStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_task(
        &self,
        requirement_id: &str,
        input: TaskCreateInput,
    ) -> StorageResult<Task> {
        validate_required("title", &input.title)?;

        let requirement_exists: Option<String> = sqlx::query_scalar(
            "SELECT id FROM requirements WHERE id = ? AND is_deleted = 0",
        )
        .bind(requirement_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if requirement_exists.is_none() {
            return Err(StorageError::not_found("Requirement", requirement_id));
        }

        let task_id = generate_id("task");
        let now = Utc::now();

        debug!("Creating task: {} for requirement: {}", task_id, requirement_id);

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, requirement_id, title, description, assigned_to, requested_by,
                status, progress, due_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, '[]', ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&task_id)
        .bind(requirement_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(&input.assigned_to)
        .bind(TaskStatus::Todo)
        .bind(input.due_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_task(&task_id).await
    }

    pub async fn get_task(&self, task_id: &str) -> StorageResult<Task> {
        self.find_task(task_id)
            .await?
            .ok_or_else(|| StorageError::not_found("Task", task_id))
    }

    pub async fn find_task(&self, task_id: &str) -> StorageResult<Option<Task>> {
        debug!("Fetching task: {}", task_id);

        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_task).transpose()
    }

    pub async fn list_tasks_for_requirement(&self, requirement_id: &str) -> StorageResult<Vec<Task>> {
        debug!("Listing tasks for requirement: {}", requirement_id);

        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE requirement_id = ? ORDER BY created_at DESC, id",
        )
        .bind(requirement_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_task).collect()
    }

    pub async fn update_task(&self, task_id: &str, input: TaskUpdateInput) -> StorageResult<Task> {
        debug!("Updating task: {}", task_id);

        if let Some(title) = &input.title {
            validate_required("title", title)?;
        }
        if let Some(progress) = input.progress {
            validate_progress(progress)?;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE tasks SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(title) = input.title {
            query.push(", title = ");
            query.push_bind(title.trim().to_string());
        }
        if let Some(description) = input.description {
            query.push(", description = ");
            query.push_bind(description);
        }
        if let Some(status) = input.status {
            query.push(", status = ");
            query.push_bind(status);
        }
        if let Some(progress) = input.progress {
            query.push(", progress = ");
            query.push_bind(progress);
        }
        if let Some(due_date) = input.due_date {
            query.push(", due_date = ");
            query.push_bind(due_date);
        }

        query.push(" WHERE id = ");
        query.push_bind(task_id.to_string());

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Task", task_id));
        }

        self.get_task(task_id).await
    }

    /// Record interest from `user_id`; a repeated request is a no-op
    pub async fn add_request(&self, task_id: &str, user_id: &str) -> StorageResult<AssignmentChange> {
        let added = REQUESTED_BY.append(&self.pool, task_id, user_id).await?;
        Ok(added.into())
    }

    /// Make `employee_id` the single owner, replacing any previous owner.
    ///
    /// Each attempt is one conditional UPDATE keyed on the owner just read, so
    /// concurrent assigners never hold a read lock across the write. A lost
    /// race re-reads and tries again.
    pub async fn set_assignee(
        &self,
        task_id: &str,
        employee_id: &str,
    ) -> StorageResult<AssignmentChange> {
        debug!("Assigning task {} to {}", task_id, employee_id);

        for _ in 0..MAX_ASSIGN_ATTEMPTS {
            let previous: Option<Option<String>> =
                sqlx::query_scalar("SELECT assigned_to FROM tasks WHERE id = ?")
                    .bind(task_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(StorageError::Sqlx)?;

            let Some(previous) = previous else {
                return Err(StorageError::not_found("Task", task_id));
            };

            if previous.as_deref() == Some(employee_id) {
                return Ok(AssignmentChange::Unchanged);
            }

            let result = sqlx::query(
                "UPDATE tasks SET assigned_to = ?, updated_at = ? WHERE id = ? AND assigned_to IS ?",
            )
            .bind(employee_id)
            .bind(Utc::now())
            .bind(task_id)
            .bind(previous.as_deref())
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

            if result.rows_affected() == 1 {
                return Ok(match previous {
                    None => AssignmentChange::Added,
                    Some(previous) => AssignmentChange::Replaced {
                        previous: Some(previous),
                    },
                });
            }

            debug!("Owner of task {} changed underneath, retrying", task_id);
        }

        Err(StorageError::Database(format!(
            "task {} owner kept changing during assignment",
            task_id
        )))
    }
}

/// Write a task's status (and optionally progress) on an open connection,
/// typically inside a transaction that also writes a submission.
pub async fn apply_state_change(
    conn: &mut SqliteConnection,
    task_id: &str,
    change: TaskStateChange,
) -> StorageResult<()> {
    debug!(
        "Setting task {} to {:?} (progress {:?})",
        task_id, change.status, change.progress
    );

    if let Some(progress) = change.progress {
        validate_progress(progress)?;
    }

    let result = sqlx::query(
        "UPDATE tasks SET status = ?, progress = COALESCE(?, progress), updated_at = ? WHERE id = ?",
    )
    .bind(change.status)
    .bind(change.progress)
    .bind(Utc::now())
    .bind(task_id)
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Task", task_id));
    }

    Ok(())
}

/// Write a task's status only if it still holds the observed status and
/// progress. Returns `false` when another writer got there first.
pub async fn apply_state_change_if_unchanged(
    conn: &mut SqliteConnection,
    task_id: &str,
    observed_status: TaskStatus,
    observed_progress: i32,
    change: TaskStateChange,
) -> StorageResult<bool> {
    if let Some(progress) = change.progress {
        validate_progress(progress)?;
    }

    let result = sqlx::query(
        "UPDATE tasks SET status = ?, progress = COALESCE(?, progress), updated_at = ? \
         WHERE id = ? AND status = ? AND progress = ?",
    )
    .bind(change.status)
    .bind(change.progress)
    .bind(Utc::now())
    .bind(task_id)
    .bind(observed_status)
    .bind(observed_progress)
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    Ok(result.rows_affected() == 1)
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Task> {
    let requested_by: String = row.try_get("requested_by")?;

    Ok(Task {
        id: row.try_get("id")?,
        requirement_id: row.try_get("requirement_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        assigned_to: row.try_get("assigned_to")?,
        requested_by: decode_id_set(&requested_by)?,
        status: row.try_get("status")?,
        progress: row.try_get("progress")?,
        due_date: row.try_get("due_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
