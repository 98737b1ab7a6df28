// ABOUTME: Shared application state for HTTP handlers
// ABOUTME: Bundles the pool, storages, visibility resolver, and workflows behind Arcs

use std::sync::Arc;

use opsdesk_access::VisibilityResolver;
use opsdesk_accounts::{ClientStorage, UserStorage};
use opsdesk_meetings::MeetingStorage;
use opsdesk_notifications::{NotificationEmitter, NotificationStorage};
use opsdesk_requirements::RequirementStorage;
use opsdesk_tasks::TaskStorage;
use opsdesk_workflow::{AssignmentWorkflow, ReviewWorkflow, SubmissionWorkflow};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub user_storage: Arc<UserStorage>,
    pub client_storage: Arc<ClientStorage>,
    pub requirement_storage: Arc<RequirementStorage>,
    pub task_storage: Arc<TaskStorage>,
    pub meeting_storage: Arc<MeetingStorage>,
    pub notification_storage: Arc<NotificationStorage>,
    pub resolver: Arc<VisibilityResolver>,
    pub requirement_assignments: Arc<AssignmentWorkflow<RequirementStorage>>,
    pub task_assignments: Arc<AssignmentWorkflow<TaskStorage>>,
    pub submission_workflow: Arc<SubmissionWorkflow>,
    pub review_workflow: Arc<ReviewWorkflow>,
}

impl DbState {
    /// Create application state from a migrated SQLite pool
    pub fn new(pool: SqlitePool) -> Self {
        let notification_storage = Arc::new(NotificationStorage::new(pool.clone()));
        let emitter = NotificationEmitter::new(notification_storage.clone());

        Self::with_emitter(pool, notification_storage, emitter)
    }

    /// Create application state with a custom notification emitter
    pub fn with_emitter(
        pool: SqlitePool,
        notification_storage: Arc<NotificationStorage>,
        emitter: NotificationEmitter,
    ) -> Self {
        Self {
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            client_storage: Arc::new(ClientStorage::new(pool.clone())),
            requirement_storage: Arc::new(RequirementStorage::new(pool.clone())),
            task_storage: Arc::new(TaskStorage::new(pool.clone())),
            meeting_storage: Arc::new(MeetingStorage::new(pool.clone())),
            notification_storage,
            resolver: Arc::new(VisibilityResolver::new(pool.clone())),
            requirement_assignments: Arc::new(AssignmentWorkflow::new(
                RequirementStorage::new(pool.clone()),
                emitter.clone(),
            )),
            task_assignments: Arc::new(AssignmentWorkflow::new(
                TaskStorage::new(pool.clone()),
                emitter.clone(),
            )),
            submission_workflow: Arc::new(SubmissionWorkflow::new(pool.clone(), emitter.clone())),
            review_workflow: Arc::new(ReviewWorkflow::new(pool.clone(), emitter)),
            pool,
        }
    }
}
