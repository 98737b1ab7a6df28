// ABOUTME: Repair job for tasks whose state disagrees with their latest reviewed submission
// ABOUTME: Run on demand from the CLI; tasks edited after the review are left alone

use opsdesk_storage::{StorageError, StorageResult};
use opsdesk_submissions::{ReviewDecision, SubmissionStorage};
use opsdesk_tasks::{apply_state_change_if_unchanged, TaskStatus, TaskStorage};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::review::TaskCascade;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRepair {
    pub task_id: String,
    pub submission_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub examined: usize,
    pub repaired: Vec<TaskRepair>,
}

pub struct Reconciler {
    pool: SqlitePool,
    submissions: SubmissionStorage,
    tasks: TaskStorage,
}

impl Reconciler {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            submissions: SubmissionStorage::new(pool.clone()),
            tasks: TaskStorage::new(pool.clone()),
            pool,
        }
    }

    pub async fn reconcile(&self) -> StorageResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for submission in self.submissions.latest_submission_per_task().await? {
            let Some(decision) = ReviewDecision::from_status(submission.status) else {
                continue;
            };
            report.examined += 1;

            let Some(task) = self.tasks.find_task(&submission.task_id).await? else {
                warn!(
                    "Submission {} references missing task {}",
                    submission.id, submission.task_id
                );
                continue;
            };

            let expected = TaskCascade::for_decision(decision);
            if TaskCascade::is_applied(&task, &expected) {
                continue;
            }

            // A write after the review is newer intent than the decision
            if submission
                .reviewed_at
                .is_some_and(|reviewed_at| task.updated_at > reviewed_at)
            {
                debug!(
                    "Task {} changed after submission {} was reviewed, not repairing",
                    task.id, submission.id
                );
                continue;
            }

            let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
            let applied = apply_state_change_if_unchanged(
                &mut conn,
                &task.id,
                task.status,
                task.progress,
                expected,
            )
            .await?;
            if !applied {
                debug!("Task {} changed while reconciling, not repairing", task.id);
                continue;
            }

            info!(
                "Repaired task {}: {:?} -> {:?} to match submission {}",
                task.id, task.status, expected.status, submission.id
            );
            report.repaired.push(TaskRepair {
                task_id: task.id,
                submission_id: submission.id,
                from: task.status,
                to: expected.status,
            });
        }

        Ok(report)
    }
}
