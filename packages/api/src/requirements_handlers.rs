// ABOUTME: HTTP request handlers for requirement operations
// ABOUTME: Every read and write is confined to the caller's visibility scope

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use opsdesk_access::RequirementQuery;
use opsdesk_core::Role;
use opsdesk_requirements::{RequirementCreateInput, RequirementUpdateInput};
use opsdesk_tasks::TaskCreateInput;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::DbState;
use crate::error::ApiResult;
use crate::response::{created, ok};

/// Body for `POST /requirements/{id}/request` and `POST /tasks/{id}/request`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAssignmentBody {
    pub user_id: Option<String>,
}

/// Body for `POST /requirements/{id}/assign` and `POST /tasks/{id}/assign`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    pub employee_id: String,
}

/// Resolve who an assignment request is for. Requesting on behalf of
/// someone else needs assignment authority.
pub(crate) fn requester(user: &CurrentUser, body: RequestAssignmentBody) -> ApiResult<String> {
    let caller_id = user.require_user()?;
    match body.user_id {
        Some(target) if target != caller_id => {
            user.require_role(Role::can_assign, "request assignment for another user")?;
            Ok(target)
        }
        _ => Ok(caller_id.to_string()),
    }
}

pub async fn list_requirements(
    State(db): State<DbState>,
    user: CurrentUser,
    Query(query): Query<RequirementQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("Listing requirements for {:?} ({:?})", user.caller, query);

    let requirements = db.resolver.list_requirements(&user.caller, &query).await?;
    Ok(ok(requirements))
}

pub async fn get_requirement(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Getting requirement: {}", requirement_id);

    let requirement = db
        .resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;
    Ok(ok(requirement))
}

pub async fn create_requirement(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<RequirementCreateInput>,
) -> ApiResult<impl IntoResponse> {
    let created_by = user.require_role(Role::can_manage_requirements, "create requirements")?;
    info!("Creating requirement '{}' for client {}", input.title, input.client_id);

    let requirement = db
        .requirement_storage
        .create_requirement(input, created_by)
        .await?;
    Ok(created(requirement))
}

pub async fn update_requirement(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
    Json(input): Json<RequirementUpdateInput>,
) -> ApiResult<impl IntoResponse> {
    user.require_role(Role::can_manage_requirements, "update requirements")?;
    info!("Updating requirement: {}", requirement_id);

    db.resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;
    let requirement = db
        .requirement_storage
        .update_requirement(&requirement_id, input)
        .await?;
    Ok(ok(requirement))
}

pub async fn delete_requirement(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    user.require_role(Role::can_manage_requirements, "delete requirements")?;
    info!("Deleting requirement: {}", requirement_id);

    db.resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;
    db.requirement_storage
        .soft_delete_requirement(&requirement_id)
        .await?;
    Ok(ok(requirement_id))
}

pub async fn request_assignment(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
    Json(body): Json<RequestAssignmentBody>,
) -> ApiResult<impl IntoResponse> {
    let requester = requester(&user, body)?;
    db.resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;

    let change = db
        .requirement_assignments
        .request_assignment(&requirement_id, &requester)
        .await?;
    Ok(ok(change))
}

pub async fn assign_requirement(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
    Json(body): Json<AssignBody>,
) -> ApiResult<impl IntoResponse> {
    let assigned_by = user.require_role(Role::can_assign, "assign requirements")?;
    db.resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;

    let change = db
        .requirement_assignments
        .assign(&requirement_id, &body.employee_id, assigned_by)
        .await?;
    Ok(ok(change))
}

pub async fn list_tasks(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Listing tasks for requirement: {}", requirement_id);

    db.resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;
    let tasks = db
        .task_storage
        .list_tasks_for_requirement(&requirement_id)
        .await?;
    Ok(ok(tasks))
}

pub async fn create_task(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(requirement_id): Path<String>,
    Json(input): Json<TaskCreateInput>,
) -> ApiResult<impl IntoResponse> {
    user.require_role(Role::can_manage_requirements, "create tasks")?;
    info!("Creating task '{}' under {}", input.title, requirement_id);

    db.resolver
        .get_requirement(&user.caller, &requirement_id)
        .await?;
    let task = db.task_storage.create_task(&requirement_id, input).await?;
    Ok(created(task))
}
