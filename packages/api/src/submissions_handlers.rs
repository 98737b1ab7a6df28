// ABOUTME: HTTP request handlers for submissions and reviews
// ABOUTME: Reads, creation, and review transitions, all confined to the caller's scope

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use opsdesk_access::SubmissionQuery;
use opsdesk_core::Role;
use opsdesk_submissions::ReviewDecision;
use opsdesk_workflow::SubmissionCreateInput;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::DbState;
use crate::error::ApiResult;
use crate::response::{created, ok};
use crate::tasks_handlers::task_in_scope;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub decision: ReviewDecision,
    pub notes: Option<String>,
    pub requested_changes: Option<String>,
}

pub async fn list_submissions(
    State(db): State<DbState>,
    user: CurrentUser,
    Query(query): Query<SubmissionQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("Listing submissions for {:?} ({:?})", user.caller, query);

    let submissions = db.resolver.list_submissions(&user.caller, &query).await?;
    Ok(ok(submissions))
}

pub async fn get_submission(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(submission_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    info!("Getting submission: {}", submission_id);

    let submission = db
        .resolver
        .get_submission(&user.caller, &submission_id)
        .await?;
    Ok(ok(submission))
}

pub async fn create_submission(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<SubmissionCreateInput>,
) -> ApiResult<impl IntoResponse> {
    let submitted_by = user.require_role(Role::can_submit_work, "create submissions")?;
    info!("Creating submission for task {} by {}", input.task_id, submitted_by);
    task_in_scope(&db, &user, &input.task_id).await?;

    let submission = db
        .submission_workflow
        .create_submission(input, submitted_by)
        .await?;
    Ok(created(submission))
}

pub async fn start_review(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(submission_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let reviewer = user.require_role(Role::can_review, "review submissions")?;
    db.resolver
        .get_submission(&user.caller, &submission_id)
        .await?;

    let submission = db
        .review_workflow
        .start_review(&submission_id, reviewer)
        .await?;
    Ok(ok(submission))
}

pub async fn review_submission(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(submission_id): Path<String>,
    Json(body): Json<ReviewBody>,
) -> ApiResult<impl IntoResponse> {
    let reviewer = user.require_role(Role::can_review, "review submissions")?;
    info!(
        "Reviewing submission {} as {:?} by {}",
        submission_id, body.decision, reviewer
    );
    db.resolver
        .get_submission(&user.caller, &submission_id)
        .await?;

    let outcome = db
        .review_workflow
        .review_submission(
            &submission_id,
            body.decision,
            reviewer,
            body.notes,
            body.requested_changes,
        )
        .await?;
    Ok(ok(outcome))
}
