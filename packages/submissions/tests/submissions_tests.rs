// ABOUTME: Integration tests for submission storage
// ABOUTME: Tests number allocation, review writes, start-review guard, and scoped listing

use opsdesk_accounts::{ClientCreateInput, ClientStorage, UserCreateInput, UserStorage};
use opsdesk_core::{display_submission_number, Role};
use opsdesk_requirements::{RequirementCreateInput, RequirementStorage};
use opsdesk_submissions::{
    insert_submission, record_review, Deliverable, NewSubmission, ReviewDecision, ReviewRecord,
    SubmissionFilter, SubmissionStatus, SubmissionStorage,
};
use opsdesk_tasks::{TaskCreateInput, TaskStorage};
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

struct Fixture {
    client_id: String,
    requirement_id: String,
    task_id: String,
}

async fn seed(pool: &SqlitePool, sales_person_id: Option<&str>) -> Fixture {
    let user = UserStorage::new(pool.clone())
        .create_user(UserCreateInput {
            role: Role::Client,
            name: "Acme".to_string(),
            email: format!("acme-{}@agency.test", sales_person_id.unwrap_or("none")),
        })
        .await
        .unwrap();
    let client = ClientStorage::new(pool.clone())
        .create_client(ClientCreateInput {
            user_id: user.id,
            sales_person_id: sales_person_id.map(str::to_string),
            name: "Acme".to_string(),
            contact_email: None,
        })
        .await
        .unwrap();
    let requirement = RequirementStorage::new(pool.clone())
        .create_requirement(
            RequirementCreateInput {
                client_id: client.id.clone(),
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
        .unwrap();
    let task = TaskStorage::new(pool.clone())
        .create_task(
            &requirement.id,
            TaskCreateInput {
                title: "Logo".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    Fixture {
        client_id: client.id,
        requirement_id: requirement.id,
        task_id: task.id,
    }
}

fn new_submission(fixture: &Fixture, submitted_by: &str) -> NewSubmission {
    NewSubmission {
        task_id: fixture.task_id.clone(),
        requirement_id: fixture.requirement_id.clone(),
        client_id: fixture.client_id.clone(),
        submitted_by: submitted_by.to_string(),
        title: "Logo drafts".to_string(),
        description: None,
        deliverables: vec![Deliverable {
            name: "logo.png".to_string(),
            storage_key: "objects/logo.png".to_string(),
            content_type: Some("image/png".to_string()),
        }],
        version: 1,
        previous_submission_id: None,
    }
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_submission_numbers_increase_by_one(pool: SqlitePool) {
    let fixture = seed(&pool, None).await;
    let mut conn = pool.acquire().await.unwrap();

    let first = insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();
    let second = insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();

    assert_eq!(first.submission_number, 1);
    assert_eq!(second.submission_number, 2);
    assert_eq!(display_submission_number(second.submission_number), "SUB-0002");
    assert_eq!(first.status, SubmissionStatus::Pending);
    assert_eq!(first.deliverables.len(), 1);
    assert_eq!(first.deliverables[0].content_type.as_deref(), Some("image/png"));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_record_review_overwrites_review_fields(pool: SqlitePool) {
    let fixture = seed(&pool, None).await;
    let mut conn = pool.acquire().await.unwrap();
    let submission = insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();

    let reviewed = record_review(
        &mut conn,
        &submission.id,
        &ReviewRecord {
            decision: ReviewDecision::ChangesRequested,
            reviewer_id: "usr-admin".to_string(),
            notes: Some("Close".to_string()),
            requested_changes: Some("Bigger font".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(reviewed.status, SubmissionStatus::ChangesRequested);
    assert_eq!(reviewed.reviewed_by.as_deref(), Some("usr-admin"));
    assert!(reviewed.reviewed_at.is_some());
    assert_eq!(reviewed.requested_changes.as_deref(), Some("Bigger font"));

    let err = record_review(
        &mut conn,
        "sub-missing",
        &ReviewRecord {
            decision: ReviewDecision::Approved,
            reviewer_id: "usr-admin".to_string(),
            notes: None,
            requested_changes: None,
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_mark_under_review_only_moves_pending(pool: SqlitePool) {
    let fixture = seed(&pool, None).await;
    let storage = SubmissionStorage::new(pool.clone());
    let mut conn = pool.acquire().await.unwrap();
    let submission = insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();
    drop(conn);

    assert!(storage.mark_under_review(&submission.id).await.unwrap());
    assert!(!storage.mark_under_review(&submission.id).await.unwrap());

    let stored = storage.get_submission(&submission.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::UnderReview);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_list_filters_and_soft_delete(pool: SqlitePool) {
    let fixture = seed(&pool, Some("usr-sales")).await;
    let storage = SubmissionStorage::new(pool.clone());
    let mut conn = pool.acquire().await.unwrap();
    let mine = insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();
    let theirs = insert_submission(&mut conn, &new_submission(&fixture, "usr-other"))
        .await
        .unwrap();
    drop(conn);

    let by_author = storage
        .list_submissions(&SubmissionFilter {
            submitted_by: Some("usr-emp".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].id, mine.id);

    let by_sales = storage
        .list_submissions(&SubmissionFilter {
            client_sales_person_id: Some("usr-sales".to_string()),
            status: Some(SubmissionStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_sales.len(), 2);

    let other_sales = storage
        .list_submissions(&SubmissionFilter {
            client_sales_person_id: Some("usr-nobody".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(other_sales.is_empty());

    storage.soft_delete_submission(&theirs.id).await.unwrap();
    let remaining = storage
        .list_submissions(&SubmissionFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(storage.get_submission(&theirs.id).await.unwrap_err().is_not_found());
    assert!(storage.find_submission(&theirs.id).await.unwrap().unwrap().is_deleted);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_latest_submission_per_task(pool: SqlitePool) {
    let fixture = seed(&pool, None).await;
    let storage = SubmissionStorage::new(pool.clone());
    let mut conn = pool.acquire().await.unwrap();
    insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();
    let latest = insert_submission(&mut conn, &new_submission(&fixture, "usr-emp"))
        .await
        .unwrap();
    drop(conn);

    let found = storage.latest_submission_per_task().await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, latest.id);
}
