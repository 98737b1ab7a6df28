// ABOUTME: HTTP request handlers for account provisioning
// ABOUTME: Admin-only creation of users and agency clients

use axum::{extract::State, response::IntoResponse, Json};
use opsdesk_accounts::{ClientCreateInput, UserCreateInput};
use opsdesk_core::Role;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::DbState;
use crate::error::ApiResult;
use crate::response::created;

pub async fn create_user(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<UserCreateInput>,
) -> ApiResult<impl IntoResponse> {
    user.require_role(Role::is_administrative, "provision users")?;
    info!("Provisioning {} user {}", input.role, input.email);

    let created_user = db.user_storage.create_user(input).await?;
    Ok(created(created_user))
}

pub async fn create_client(
    State(db): State<DbState>,
    user: CurrentUser,
    Json(input): Json<ClientCreateInput>,
) -> ApiResult<impl IntoResponse> {
    user.require_role(Role::is_administrative, "provision clients")?;
    info!("Provisioning client '{}' for user {}", input.name, input.user_id);

    let client = db.client_storage.create_client(input).await?;
    Ok(created(client))
}
