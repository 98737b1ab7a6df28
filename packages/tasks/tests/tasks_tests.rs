// ABOUTME: Integration tests for task storage
// ABOUTME: Tests creation, progress validation, single-owner assignment, and cascade writes

use opsdesk_accounts::{ClientCreateInput, ClientStorage, UserCreateInput, UserStorage};
use opsdesk_core::{AssignmentChange, Role};
use opsdesk_requirements::{RequirementCreateInput, RequirementStorage};
use opsdesk_storage::StorageError;
use opsdesk_tasks::{
    apply_state_change, TaskCreateInput, TaskStateChange, TaskStatus, TaskStorage,
    TaskUpdateInput,
};
use sqlx::SqlitePool;

async fn seed_requirement(pool: &SqlitePool) -> String {
    let user = UserStorage::new(pool.clone())
        .create_user(UserCreateInput {
            role: Role::Client,
            name: "Acme".to_string(),
            email: "acme@agency.test".to_string(),
        })
        .await
        .unwrap();
    let client = ClientStorage::new(pool.clone())
        .create_client(ClientCreateInput {
            user_id: user.id,
            sales_person_id: None,
            name: "Acme".to_string(),
            contact_email: None,
        })
        .await
        .unwrap();
    RequirementStorage::new(pool.clone())
        .create_requirement(
            RequirementCreateInput {
                client_id: client.id,
                sales_person_id: None,
                title: "Brand refresh".to_string(),
                description: None,
                status: None,
                mrp: 100.0,
                deal_price: None,
            },
            "usr-admin",
        )
        .await
        .unwrap()
        .id
}

fn task_input(title: &str) -> TaskCreateInput {
    TaskCreateInput {
        title: title.to_string(),
        ..Default::default()
    }
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_create_and_list_tasks(pool: SqlitePool) {
    let requirement_id = seed_requirement(&pool).await;
    let storage = TaskStorage::new(pool);

    let first = storage
        .create_task(&requirement_id, task_input("Logo"))
        .await
        .unwrap();
    let second = storage
        .create_task(&requirement_id, task_input("Palette"))
        .await
        .unwrap();

    assert!(first.id.starts_with("task-"));
    assert_eq!(first.status, TaskStatus::Todo);
    assert_eq!(first.progress, 0);
    assert!(first.assigned_to.is_none());

    let tasks = storage
        .list_tasks_for_requirement(&requirement_id)
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2);
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert!(ids.contains(&first.id.as_str()));
    assert!(ids.contains(&second.id.as_str()));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_create_task_for_missing_requirement(pool: SqlitePool) {
    let storage = TaskStorage::new(pool);

    let err = storage
        .create_task("req-missing", task_input("Logo"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound { entity: "Requirement", .. }));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_update_task_validates_progress(pool: SqlitePool) {
    let requirement_id = seed_requirement(&pool).await;
    let storage = TaskStorage::new(pool);
    let task = storage
        .create_task(&requirement_id, task_input("Logo"))
        .await
        .unwrap();

    let err = storage
        .update_task(
            &task.id,
            TaskUpdateInput {
                progress: Some(101),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Validation(_)));

    let updated = storage
        .update_task(
            &task.id,
            TaskUpdateInput {
                status: Some(TaskStatus::InProgress),
                progress: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.progress, 40);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_single_owner_assignment_replaces_previous(pool: SqlitePool) {
    let requirement_id = seed_requirement(&pool).await;
    let storage = TaskStorage::new(pool);
    let task = storage
        .create_task(&requirement_id, task_input("Logo"))
        .await
        .unwrap();

    assert_eq!(
        storage.set_assignee(&task.id, "usr-a").await.unwrap(),
        AssignmentChange::Added
    );
    assert_eq!(
        storage.set_assignee(&task.id, "usr-a").await.unwrap(),
        AssignmentChange::Unchanged
    );
    assert_eq!(
        storage.set_assignee(&task.id, "usr-b").await.unwrap(),
        AssignmentChange::Replaced {
            previous: Some("usr-a".to_string())
        }
    );

    let stored = storage.get_task(&task.id).await.unwrap();
    assert_eq!(stored.assigned_to.as_deref(), Some("usr-b"));
    assert!(storage.set_assignee("task-missing", "usr-a").await.unwrap_err().is_not_found());
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_concurrent_assignments_form_a_replacement_chain(pool: SqlitePool) {
    let requirement_id = seed_requirement(&pool).await;
    let storage = TaskStorage::new(pool);
    let task = storage
        .create_task(&requirement_id, task_input("Logo"))
        .await
        .unwrap();

    let (a, b, c, d) = tokio::join!(
        storage.set_assignee(&task.id, "usr-a"),
        storage.set_assignee(&task.id, "usr-b"),
        storage.set_assignee(&task.id, "usr-c"),
        storage.set_assignee(&task.id, "usr-d"),
    );
    let changes = vec![a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];

    // Every writer lands exactly once; each replaces the owner it observed
    let added = changes
        .iter()
        .filter(|change| **change == AssignmentChange::Added)
        .count();
    assert_eq!(added, 1);

    let mut owners: Vec<String> = changes
        .into_iter()
        .filter_map(|change| match change {
            AssignmentChange::Replaced { previous } => previous,
            _ => None,
        })
        .collect();
    let stored = storage.get_task(&task.id).await.unwrap();
    owners.push(stored.assigned_to.unwrap());
    owners.sort();
    assert_eq!(owners, vec!["usr-a", "usr-b", "usr-c", "usr-d"]);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_task_requests_are_deduplicated(pool: SqlitePool) {
    let requirement_id = seed_requirement(&pool).await;
    let storage = TaskStorage::new(pool);
    let task = storage
        .create_task(&requirement_id, task_input("Logo"))
        .await
        .unwrap();

    storage.add_request(&task.id, "usr-a").await.unwrap();
    assert_eq!(
        storage.add_request(&task.id, "usr-a").await.unwrap(),
        AssignmentChange::Unchanged
    );

    let stored = storage.get_task(&task.id).await.unwrap();
    assert_eq!(stored.requested_by.len(), 1);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_apply_state_change_keeps_progress_when_absent(pool: SqlitePool) {
    let requirement_id = seed_requirement(&pool).await;
    let storage = TaskStorage::new(pool.clone());
    let task = storage
        .create_task(&requirement_id, task_input("Logo"))
        .await
        .unwrap();
    storage
        .update_task(
            &task.id,
            TaskUpdateInput {
                progress: Some(60),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut conn = pool.acquire().await.unwrap();
    apply_state_change(
        &mut conn,
        &task.id,
        TaskStateChange {
            status: TaskStatus::InProgress,
            progress: None,
        },
    )
    .await
    .unwrap();
    drop(conn);

    let stored = storage.get_task(&task.id).await.unwrap();
    assert_eq!(stored.status, TaskStatus::InProgress);
    assert_eq!(stored.progress, 60);
}
