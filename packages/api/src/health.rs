// ABOUTME: Health check endpoint
// ABOUTME: Reports service status after a database round trip

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use crate::db::DbState;
use crate::error::{ApiResult, AppError};
use crate::response::ok;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check(State(db): State<DbState>) -> ApiResult<impl IntoResponse> {
    sqlx::query("SELECT 1")
        .execute(&db.pool)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
