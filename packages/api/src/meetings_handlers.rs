// ABOUTME: HTTP request handlers for meetings
// ABOUTME: Scoped listing, scheduling, and cancellation

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use opsdesk_access::MeetingQuery;
use opsdesk_core::Role;
use opsdesk_meetings::MeetingCreateInput;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::DbState;
use crate::error::ApiResult;
use crate::response::{created, ok};

pub async fn list_meetings(
    State(db): State<DbState>,
    user: CurrentUser,
    Query(query): Query<MeetingQuery>,
) -> ApiResult<impl IntoResponse> {
    info!("Listing meetings for {:?} ({:?})", user.caller, query);

    let meetings = db.resolver.list_meetings(&user.caller, &query).await?;
    Ok(ok(meetings))
}

pub async fn get_meeting(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(meeting_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let meeting = db.resolver.get_meeting(&user.caller, &meeting_id).await?;
    Ok(ok(meeting))
}

pub async fn create_meeting(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<MeetingCreateInput>,
) -> ApiResult<impl IntoResponse> {
    let organizer = user.require_role(Role::can_assign, "schedule meetings")?;
    info!("Scheduling meeting '{}' with client {}", input.title, input.client_id);

    let meeting = db.meeting_storage.create_meeting(input, organizer).await?;
    Ok(created(meeting))
}

pub async fn cancel_meeting(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(meeting_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    user.require_role(Role::can_assign, "cancel meetings")?;
    info!("Cancelling meeting: {}", meeting_id);
    db.resolver.get_meeting(&user.caller, &meeting_id).await?;

    let meeting = db.meeting_storage.cancel_meeting(&meeting_id).await?;
    Ok(ok(meeting))
}
