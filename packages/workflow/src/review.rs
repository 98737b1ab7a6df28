// ABOUTME: Submission review state machine
// ABOUTME: Records decisions, cascades them onto the parent task in one transaction, then notifies

use opsdesk_core::{display_submission_number, ValidationError};
use opsdesk_notifications::{
    NewNotification, NotificationEmitter, NotificationType, RelatedEntityType,
};
use opsdesk_storage::{StorageError, StorageResult};
use opsdesk_submissions::{
    record_review, ReviewDecision, ReviewRecord, Submission, SubmissionStatus, SubmissionStorage,
};
use opsdesk_tasks::{apply_state_change, Task, TaskStateChange, TaskStatus, TaskStorage};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Task state implied by a review decision
pub struct TaskCascade;

impl TaskCascade {
    pub fn for_decision(decision: ReviewDecision) -> TaskStateChange {
        match decision {
            ReviewDecision::Approved => TaskStateChange {
                status: TaskStatus::Done,
                progress: Some(100),
            },
            ReviewDecision::Rejected => TaskStateChange {
                status: TaskStatus::Todo,
                progress: Some(0),
            },
            ReviewDecision::ChangesRequested => TaskStateChange {
                status: TaskStatus::InProgress,
                progress: None,
            },
        }
    }

    /// Whether `task` already reflects `change`
    pub fn is_applied(task: &Task, change: &TaskStateChange) -> bool {
        task.status == change.status
            && change.progress.map_or(true, |progress| task.progress == progress)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum ReviewStep {
    SubmissionReviewed {
        status: SubmissionStatus,
    },
    #[serde(rename_all = "camelCase")]
    TaskCascaded {
        task_id: String,
        status: TaskStatus,
    },
    #[serde(rename_all = "camelCase")]
    NotificationEmitted {
        notification_id: String,
    },
    NotificationSkipped,
}

/// Log of the review steps that completed, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSaga {
    steps: Vec<ReviewStep>,
}

impl ReviewSaga {
    pub fn record(&mut self, step: ReviewStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[ReviewStep] {
        &self.steps
    }

    pub fn notification_skipped(&self) -> bool {
        self.steps.contains(&ReviewStep::NotificationSkipped)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub submission: Submission,
    pub task: Task,
    pub saga: ReviewSaga,
}

pub struct ReviewWorkflow {
    pool: SqlitePool,
    submissions: SubmissionStorage,
    tasks: TaskStorage,
    emitter: NotificationEmitter,
}

fn decision_notification(decision: ReviewDecision) -> (NotificationType, &'static str) {
    match decision {
        ReviewDecision::Approved => (NotificationType::SubmissionApproved, "approved"),
        ReviewDecision::Rejected => (NotificationType::SubmissionRejected, "rejected"),
        ReviewDecision::ChangesRequested => (
            NotificationType::ChangesRequested,
            "returned with requested changes",
        ),
    }
}

impl ReviewWorkflow {
    pub fn new(pool: SqlitePool, emitter: NotificationEmitter) -> Self {
        Self {
            submissions: SubmissionStorage::new(pool.clone()),
            tasks: TaskStorage::new(pool.clone()),
            pool,
            emitter,
        }
    }

    /// Move a pending submission under review. Already under review is a
    /// no-op; a decided submission is rejected.
    pub async fn start_review(
        &self,
        submission_id: &str,
        reviewer_id: &str,
    ) -> StorageResult<Submission> {
        let submission = self.submissions.get_submission(submission_id).await?;

        match submission.status {
            SubmissionStatus::UnderReview => Ok(submission),
            SubmissionStatus::Pending => {
                if self.submissions.mark_under_review(submission_id).await? {
                    info!("Submission {} under review by {}", submission_id, reviewer_id);
                }
                let current = self.submissions.get_submission(submission_id).await?;
                if current.status.is_decided() {
                    return Err(ValidationError::AlreadyReviewed(
                        current.status.as_str().to_string(),
                    )
                    .into());
                }
                Ok(current)
            }
            SubmissionStatus::Approved
            | SubmissionStatus::Rejected
            | SubmissionStatus::ChangesRequested => {
                Err(ValidationError::AlreadyReviewed(submission.status.as_str().to_string()).into())
            }
        }
    }

    /// Record a decision and cascade it to the parent task.
    ///
    /// The submission and task writes commit together. The notification to
    /// the submitter is sent afterwards and may be skipped on failure.
    /// Repeated reviews are accepted and re-apply the cascade.
    pub async fn review_submission(
        &self,
        submission_id: &str,
        decision: ReviewDecision,
        reviewer_id: &str,
        notes: Option<String>,
        requested_changes: Option<String>,
    ) -> StorageResult<ReviewOutcome> {
        let mut saga = ReviewSaga::default();
        let cascade = TaskCascade::for_decision(decision);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;
        let submission = record_review(
            &mut tx,
            submission_id,
            &ReviewRecord {
                decision,
                reviewer_id: reviewer_id.to_string(),
                notes,
                requested_changes,
            },
        )
        .await?;
        saga.record(ReviewStep::SubmissionReviewed {
            status: submission.status,
        });

        apply_state_change(&mut tx, &submission.task_id, cascade).await?;
        tx.commit().await.map_err(StorageError::Sqlx)?;
        saga.record(ReviewStep::TaskCascaded {
            task_id: submission.task_id.clone(),
            status: cascade.status,
        });

        info!(
            "Submission {} {:?} by {}; task {} -> {:?}",
            submission.id, decision, reviewer_id, submission.task_id, cascade.status
        );

        let (notification_type, verb) = decision_notification(decision);
        let display_number = display_submission_number(submission.submission_number);
        let emitted = self
            .emitter
            .emit_best_effort(NewNotification {
                sent_to: submission.submitted_by.clone(),
                notification_type,
                related_entity_type: RelatedEntityType::Submission,
                related_entity_id: submission.id.clone(),
                initiated_by: reviewer_id.to_string(),
                title: format!("Submission {}", verb),
                message: format!("{} \"{}\" was {}", display_number, submission.title, verb),
            })
            .await;

        match emitted {
            Some(notification_id) => {
                saga.record(ReviewStep::NotificationEmitted { notification_id })
            }
            None => {
                warn!(
                    "Review of {} committed without notifying {}",
                    submission.id, submission.submitted_by
                );
                saga.record(ReviewStep::NotificationSkipped);
            }
        }

        let task = self.tasks.get_task(&submission.task_id).await?;

        Ok(ReviewOutcome {
            submission,
            task,
            saga,
        })
    }
}
