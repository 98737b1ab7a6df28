// ABOUTME: HTTP request handlers for the caller's notifications
// ABOUTME: Listing and read-marking, always restricted to the recipient

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::db::DbState;
use crate::error::ApiResult;
use crate::response::ok;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

pub async fn list_notifications(
    State(db): State<DbState>,
    user: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<impl IntoResponse> {
    let user_id = user.require_user()?;

    let notifications = db
        .notification_storage
        .list_for_user(user_id, query.unread_only)
        .await?;
    Ok(ok(notifications))
}

pub async fn mark_read(
    State(db): State<DbState>,
    user: CurrentUser,
    Path(notification_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user_id = user.require_user()?;

    db.notification_storage
        .mark_read(&notification_id, user_id)
        .await?;
    Ok(ok(notification_id))
}
