// ABOUTME: HTTP request handlers for task operations
// ABOUTME: Task updates and assignment, scoped through the parent requirement

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use opsdesk_core::Role;
use opsdesk_storage::StorageError;
use opsdesk_tasks::{Task, TaskUpdateInput};
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::DbState;
use crate::error::ApiResult;
use crate::requirements_handlers::{requester, AssignBody, RequestAssignmentBody};
use crate::response::ok;

/// Load a task the caller can see. A task outside the caller's scope is
/// reported as missing, same as its parent requirement.
pub(crate) async fn task_in_scope(
    db: &DbState,
    user: &CurrentUser,
    task_id: &str,
) -> ApiResult<Task> {
    let task = db.task_storage.get_task(task_id).await?;
    db.resolver
        .get_requirement(&user.caller, &task.requirement_id)
        .await
        .map_err(|err| match err {
            StorageError::NotFound { .. } => StorageError::not_found("Task", task_id),
            other => other,
        })?;
    Ok(task)
}

/// Update a task. The caller must be able to see the parent requirement.
pub async fn update_task(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
    Json(input): Json<TaskUpdateInput>,
) -> ApiResult<impl IntoResponse> {
    user.require_user()?;
    info!("Updating task: {}", task_id);

    task_in_scope(&db, &user, &task_id).await?;

    let task = db.task_storage.update_task(&task_id, input).await?;
    Ok(ok(task))
}

pub async fn request_assignment(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
    Json(body): Json<RequestAssignmentBody>,
) -> ApiResult<impl IntoResponse> {
    let requester = requester(&user, body)?;
    task_in_scope(&db, &user, &task_id).await?;

    let change = db
        .task_assignments
        .request_assignment(&task_id, &requester)
        .await?;
    Ok(ok(change))
}

pub async fn assign_task(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
    Json(body): Json<AssignBody>,
) -> ApiResult<impl IntoResponse> {
    let assigned_by = user.require_role(Role::can_assign, "assign tasks")?;
    task_in_scope(&db, &user, &task_id).await?;

    let change = db
        .task_assignments
        .assign(&task_id, &body.employee_id, assigned_by)
        .await?;
    Ok(ok(change))
}
