// ABOUTME: HTTP API layer for OpsDesk providing REST endpoints and routing
// ABOUTME: Integration layer that maps domain packages onto axum routes

use axum::{
    routing::{get, post, put},
    Router,
};

pub mod accounts_handlers;
pub mod auth;
pub mod db;
pub mod error;
pub mod health;
pub mod meetings_handlers;
pub mod notifications_handlers;
pub mod requirements_handlers;
pub mod response;
pub mod submissions_handlers;
pub mod tasks_handlers;

pub use auth::{CurrentUser, USER_ID_HEADER, USER_ROLE_HEADER};
pub use db::DbState;
pub use error::{ApiResult, AppError};
pub use response::ApiResponse;

/// Creates the requirements API router, including nested task routes
pub fn create_requirements_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(requirements_handlers::list_requirements)
                .post(requirements_handlers::create_requirement),
        )
        .route(
            "/{requirement_id}",
            get(requirements_handlers::get_requirement)
                .put(requirements_handlers::update_requirement)
                .delete(requirements_handlers::delete_requirement),
        )
        .route(
            "/{requirement_id}/request",
            post(requirements_handlers::request_assignment),
        )
        .route(
            "/{requirement_id}/assign",
            post(requirements_handlers::assign_requirement),
        )
        .route(
            "/{requirement_id}/tasks",
            get(requirements_handlers::list_tasks).post(requirements_handlers::create_task),
        )
}

/// Creates the tasks API router
pub fn create_tasks_router() -> Router<DbState> {
    Router::new()
        .route("/{task_id}", put(tasks_handlers::update_task))
        .route("/{task_id}/request", post(tasks_handlers::request_assignment))
        .route("/{task_id}/assign", post(tasks_handlers::assign_task))
}

/// Creates the submissions API router
pub fn create_submissions_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(submissions_handlers::list_submissions)
                .post(submissions_handlers::create_submission),
        )
        .route("/{submission_id}", get(submissions_handlers::get_submission))
        .route(
            "/{submission_id}/start-review",
            post(submissions_handlers::start_review),
        )
        .route(
            "/{submission_id}/review",
            post(submissions_handlers::review_submission),
        )
}

/// Creates the meetings API router
pub fn create_meetings_router() -> Router<DbState> {
    Router::new()
        .route(
            "/",
            get(meetings_handlers::list_meetings).post(meetings_handlers::create_meeting),
        )
        .route("/{meeting_id}", get(meetings_handlers::get_meeting))
        .route("/{meeting_id}/cancel", post(meetings_handlers::cancel_meeting))
}

/// Creates the notifications API router
pub fn create_notifications_router() -> Router<DbState> {
    Router::new()
        .route("/", get(notifications_handlers::list_notifications))
        .route(
            "/{notification_id}/read",
            post(notifications_handlers::mark_read),
        )
}

/// Assemble every router under `/api` with shared state
pub fn create_router(state: DbState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/users", post(accounts_handlers::create_user))
        .route("/api/clients", post(accounts_handlers::create_client))
        .nest("/api/requirements", create_requirements_router())
        .nest("/api/tasks", create_tasks_router())
        .nest("/api/submissions", create_submissions_router())
        .nest("/api/meetings", create_meetings_router())
        .nest("/api/notifications", create_notifications_router())
        .with_state(state)
}
