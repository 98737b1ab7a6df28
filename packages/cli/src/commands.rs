// ABOUTME: Maintenance commands run outside the HTTP server
// ABOUTME: Schema migration and the review-cascade reconcile job with a tabular report

use comfy_table::{presets::UTF8_FULL, Table};
use opsdesk_storage::{connect, StorageResult};
use opsdesk_workflow::{ReconcileReport, Reconciler};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::Config;

/// Open the database; `connect` applies pending migrations
pub async fn open_database(config: &Config) -> StorageResult<SqlitePool> {
    info!("Opening database at {}", config.database_path.display());
    connect(&config.database_options()).await
}

pub async fn reconcile(pool: SqlitePool) -> StorageResult<ReconcileReport> {
    let report = Reconciler::new(pool).reconcile().await?;
    info!(
        "Reconcile examined {} submissions, repaired {} tasks",
        report.examined,
        report.repaired.len()
    );
    Ok(report)
}

/// Render repaired tasks as a table for terminal output
pub fn render_report(report: &ReconcileReport) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Task", "Submission", "From", "To"]);

    for repair in &report.repaired {
        table.add_row(vec![
            repair.task_id.clone(),
            repair.submission_id.clone(),
            format!("{:?}", repair.from),
            format!("{:?}", repair.to),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_tasks::TaskStatus;
    use opsdesk_workflow::TaskRepair;

    #[tokio::test]
    async fn test_reconcile_on_empty_database() {
        let pool = opsdesk_storage::connect_in_memory().await.unwrap();

        let report = reconcile(pool).await.unwrap();

        assert_eq!(report.examined, 0);
        assert!(report.repaired.is_empty());
    }

    #[test]
    fn test_render_report_lists_repairs() {
        let report = ReconcileReport {
            examined: 3,
            repaired: vec![TaskRepair {
                task_id: "task-1".to_string(),
                submission_id: "sub-9".to_string(),
                from: TaskStatus::Review,
                to: TaskStatus::Done,
            }],
        };

        let rendered = render_report(&report);

        assert!(rendered.contains("Submission"));
        assert!(rendered.contains("task-1"));
        assert!(rendered.contains("sub-9"));
        assert!(rendered.contains("Done"));
    }
}
