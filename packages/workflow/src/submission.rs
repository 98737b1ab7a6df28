// ABOUTME: Submission creation workflow
// ABOUTME: Validates task/requirement/client consistency, inserts, flips the task to review, notifies the client

use opsdesk_accounts::ClientStorage;
use opsdesk_core::{display_submission_number, validate_required, ValidationError};
use opsdesk_notifications::{
    NewNotification, NotificationEmitter, NotificationType, RelatedEntityType,
};
use opsdesk_requirements::RequirementStorage;
use opsdesk_storage::{StorageError, StorageResult};
use opsdesk_submissions::{insert_submission, Deliverable, NewSubmission, Submission, SubmissionStorage};
use opsdesk_tasks::{apply_state_change, TaskStateChange, TaskStatus, TaskStorage};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCreateInput {
    pub task_id: String,
    pub requirement_id: String,
    pub client_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
    pub previous_submission_id: Option<String>,
}

pub struct SubmissionWorkflow {
    pool: SqlitePool,
    clients: ClientStorage,
    requirements: RequirementStorage,
    tasks: TaskStorage,
    submissions: SubmissionStorage,
    emitter: NotificationEmitter,
}

impl SubmissionWorkflow {
    pub fn new(pool: SqlitePool, emitter: NotificationEmitter) -> Self {
        Self {
            clients: ClientStorage::new(pool.clone()),
            requirements: RequirementStorage::new(pool.clone()),
            tasks: TaskStorage::new(pool.clone()),
            submissions: SubmissionStorage::new(pool.clone()),
            pool,
            emitter,
        }
    }

    /// Create a submission for a task. Not idempotent: every call allocates a
    /// new submission number.
    pub async fn create_submission(
        &self,
        input: SubmissionCreateInput,
        submitted_by: &str,
    ) -> StorageResult<Submission> {
        validate_required("title", &input.title)?;

        let task = self.tasks.get_task(&input.task_id).await?;
        let requirement = self.requirements.get_requirement(&input.requirement_id).await?;
        let client = self.clients.get_client(&input.client_id).await?;

        if client.is_deleted {
            return Err(StorageError::not_found("Client", &input.client_id));
        }
        if task.requirement_id != requirement.id {
            return Err(ValidationError::Inconsistent(format!(
                "Task {} does not belong to requirement {}",
                task.id, requirement.id
            ))
            .into());
        }
        if requirement.client_id != client.id {
            return Err(ValidationError::Inconsistent(format!(
                "Requirement {} does not belong to client {}",
                requirement.id, client.id
            ))
            .into());
        }

        let version = match input.previous_submission_id.as_deref() {
            Some(previous_id) => {
                let previous = self.submissions.get_submission(previous_id).await?;
                if previous.task_id != task.id {
                    return Err(ValidationError::Inconsistent(format!(
                        "Previous submission {} belongs to a different task",
                        previous_id
                    ))
                    .into());
                }
                previous.version + 1
            }
            None => 1,
        };

        let new_submission = NewSubmission {
            task_id: task.id.clone(),
            requirement_id: requirement.id.clone(),
            client_id: client.id.clone(),
            submitted_by: submitted_by.to_string(),
            title: input.title,
            description: input.description,
            deliverables: input.deliverables,
            version,
            previous_submission_id: input.previous_submission_id,
        };

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;
        let submission = insert_submission(&mut tx, &new_submission).await?;
        apply_state_change(
            &mut tx,
            &task.id,
            TaskStateChange {
                status: TaskStatus::Review,
                progress: None,
            },
        )
        .await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;

        let display_number = display_submission_number(submission.submission_number);
        info!(
            "Submission {} ({}) created for task {} by {}",
            submission.id, display_number, task.id, submitted_by
        );

        self.emitter
            .emit_best_effort(NewNotification {
                sent_to: client.user_id,
                notification_type: NotificationType::SubmissionCreated,
                related_entity_type: RelatedEntityType::Submission,
                related_entity_id: submission.id.clone(),
                initiated_by: submitted_by.to_string(),
                title: "New submission ready for review".to_string(),
                message: format!("{} \"{}\" was submitted", display_number, submission.title),
            })
            .await;

        Ok(submission)
    }
}
