// ABOUTME: HTTP-level tests for the OpsDesk API router
// ABOUTME: Covers identity headers, role gating, write scoping, the error envelope, and an end-to-end review

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use opsdesk_accounts::{ClientCreateInput, ClientStorage, UserCreateInput, UserStorage};
use opsdesk_api::{create_router, DbState};
use opsdesk_core::Role;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

struct Seed {
    admin: String,
    sales: String,
    employee: String,
    client_user: String,
    client_id: String,
}

async fn seed(pool: &SqlitePool) -> Seed {
    let users = UserStorage::new(pool.clone());
    let mut ids = Vec::new();
    for (role, name) in [
        (Role::Admin, "ada"),
        (Role::Sales, "sam"),
        (Role::Employee, "emma"),
        (Role::Client, "acme"),
    ] {
        let user = users
            .create_user(UserCreateInput {
                role,
                name: name.to_string(),
                email: format!("{}@agency.test", name),
            })
            .await
            .unwrap();
        ids.push(user.id);
    }

    let client_id = ClientStorage::new(pool.clone())
        .create_client(ClientCreateInput {
            user_id: ids[3].clone(),
            sales_person_id: Some(ids[1].clone()),
            name: "Acme".to_string(),
            contact_email: None,
        })
        .await
        .unwrap()
        .id;

    Seed {
        admin: ids[0].clone(),
        sales: ids[1].clone(),
        employee: ids[2].clone(),
        client_user: ids[3].clone(),
        client_id,
    }
}

fn app(pool: SqlitePool) -> Router {
    create_router(DbState::new(pool))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = caller {
        builder = builder
            .header("X-User-Id", user_id)
            .header("X-User-Role", role);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn requirement_body(client_id: &str, mrp: f64, deal_price: f64) -> Value {
    json!({
        "clientId": client_id,
        "title": "Website redesign",
        "mrp": mrp,
        "dealPrice": deal_price,
    })
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_health_check(pool: SqlitePool) {
    let app = app(pool);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("ok"));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_missing_identity_reads_empty(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);
    let (status, _) = send(
        &app,
        "POST",
        "/api/requirements",
        Some((&seed.sales, "sales")),
        Some(requirement_body(&seed.client_id, 1000.0, 1200.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/requirements", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(
        &app,
        "GET",
        "/api/requirements",
        Some((&seed.admin, "manager")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_write_without_identity_is_unauthorized(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/requirements",
        None,
        Some(requirement_body(&seed.client_id, 1000.0, 1000.0)),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_role_gating_on_requirement_create(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);

    for (user_id, role) in [(&seed.employee, "employee"), (&seed.client_user, "client")] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/requirements",
            Some((user_id, role)),
            Some(requirement_body(&seed.client_id, 1000.0, 1000.0)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "role {}", role);
        assert_eq!(body["error"]["code"], json!("FORBIDDEN"));
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/requirements",
        Some((&seed.admin, "admin")),
        Some(requirement_body(&seed.client_id, 1000.0, 1000.0)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["salesPersonId"], json!(seed.sales));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_validation_error_envelope(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/requirements",
        Some((&seed.sales, "sales")),
        Some(requirement_body(&seed.client_id, 1000.0, 900.0)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(
        body["error"]["message"],
        json!("Deal price 900 must be greater than or equal to MRP 1000")
    );
    assert!(body["requestId"].as_str().is_some());
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_out_of_scope_requirement_is_not_found(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);
    let (_, created) = send(
        &app,
        "POST",
        "/api/requirements",
        Some((&seed.sales, "sales")),
        Some(requirement_body(&seed.client_id, 500.0, 500.0)),
    )
    .await;
    let requirement_id = created["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/requirements/{}", requirement_id);

    let (status, body) = send(&app, "GET", &uri, Some((&seed.client_user, "client")), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["clientName"], json!("Acme"));

    let (status, body) = send(&app, "GET", &uri, Some(("usr-stranger", "client")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    let (status, _) = send(
        &app,
        "GET",
        "/api/requirements/req-missing",
        Some((&seed.admin, "admin")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_writes_outside_scope_are_not_found(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let rival = UserStorage::new(pool.clone())
        .create_user(UserCreateInput {
            role: Role::Sales,
            name: "rita".to_string(),
            email: "rita@agency.test".to_string(),
        })
        .await
        .unwrap()
        .id;
    let app = app(pool);
    let sales = Some((seed.sales.as_str(), "sales"));
    let rival = Some((rival.as_str(), "sales"));

    let (_, created) = send(
        &app,
        "POST",
        "/api/requirements",
        sales,
        Some(requirement_body(&seed.client_id, 1000.0, 1000.0)),
    )
    .await;
    let requirement_id = created["data"]["id"].as_str().unwrap().to_string();
    let (_, task) = send(
        &app,
        "POST",
        &format!("/api/requirements/{}/tasks", requirement_id),
        sales,
        Some(json!({ "title": "Landing page" })),
    )
    .await;
    let task_id = task["data"]["id"].as_str().unwrap().to_string();
    let (_, submission) = send(
        &app,
        "POST",
        "/api/submissions",
        Some((&seed.employee, "employee")),
        Some(json!({
            "taskId": task_id,
            "requirementId": requirement_id,
            "clientId": seed.client_id,
            "title": "First draft",
        })),
    )
    .await;
    let submission_id = submission["data"]["id"].as_str().unwrap().to_string();

    let assign = json!({ "employeeId": seed.employee });
    let attempts = [
        (
            "PUT",
            format!("/api/requirements/{}", requirement_id),
            Some(json!({ "title": "Hijacked" })),
        ),
        ("DELETE", format!("/api/requirements/{}", requirement_id), None),
        (
            "POST",
            format!("/api/requirements/{}/assign", requirement_id),
            Some(assign.clone()),
        ),
        (
            "POST",
            format!("/api/requirements/{}/tasks", requirement_id),
            Some(json!({ "title": "Extra" })),
        ),
        (
            "PUT",
            format!("/api/tasks/{}", task_id),
            Some(json!({ "progress": 90 })),
        ),
        ("POST", format!("/api/tasks/{}/assign", task_id), Some(assign)),
        (
            "POST",
            format!("/api/submissions/{}/start-review", submission_id),
            None,
        ),
        (
            "POST",
            format!("/api/submissions/{}/review", submission_id),
            Some(json!({ "decision": "approved" })),
        ),
    ];
    for (method, uri, body) in attempts {
        let (status, response) = send(&app, method, &uri, rival, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(response["error"]["code"], json!("NOT_FOUND"));
    }

    // Nothing moved: the owner still sees the original record and a pending submission
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/requirements/{}", requirement_id),
        sales,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], json!("Website redesign"));
    assert_eq!(body["data"]["assignedEmployees"], json!([]));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/submissions/{}", submission_id),
        sales,
        None,
    )
    .await;
    assert_eq!(body["data"]["status"], json!("pending"));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_request_and_assign_over_http(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);
    let (_, created) = send(
        &app,
        "POST",
        "/api/requirements",
        Some((&seed.sales, "sales")),
        Some(requirement_body(&seed.client_id, 1000.0, 1000.0)),
    )
    .await;
    let requirement_id = created["data"]["id"].as_str().unwrap().to_string();

    let request_uri = format!("/api/requirements/{}/request", requirement_id);
    let employee = Some((seed.employee.as_str(), "employee"));
    let (status, body) = send(&app, "POST", &request_uri, employee, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["change"], json!("added"));
    let (_, body) = send(&app, "POST", &request_uri, employee, Some(json!({}))).await;
    assert_eq!(body["data"]["change"], json!("unchanged"));

    let assign_uri = format!("/api/requirements/{}/assign", requirement_id);
    let assign_body = json!({ "employeeId": seed.employee });
    let (status, _) = send(&app, "POST", &assign_uri, employee, Some(assign_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &assign_uri,
        Some((&seed.sales, "sales")),
        Some(assign_body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["change"], json!("added"));

    let (_, body) = send(
        &app,
        "GET",
        "/api/requirements?assignedOnly=true",
        employee,
        None,
    )
    .await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["assignedEmployeeNames"], json!(["emma"]));
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_submission_review_over_http(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);
    let sales = Some((seed.sales.as_str(), "sales"));
    let employee = Some((seed.employee.as_str(), "employee"));

    let (_, created) = send(
        &app,
        "POST",
        "/api/requirements",
        sales,
        Some(requirement_body(&seed.client_id, 1000.0, 1000.0)),
    )
    .await;
    let requirement_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, task) = send(
        &app,
        "POST",
        &format!("/api/requirements/{}/tasks", requirement_id),
        sales,
        Some(json!({ "title": "Landing page" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = task["data"]["id"].as_str().unwrap().to_string();

    let submission_body = json!({
        "taskId": task_id,
        "requirementId": requirement_id,
        "clientId": seed.client_id,
        "title": "First draft",
    });
    let (status, _) = send(
        &app,
        "POST",
        "/api/submissions",
        Some((&seed.client_user, "client")),
        Some(submission_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, submission) =
        send(&app, "POST", "/api/submissions", employee, Some(submission_body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = submission["data"]["id"].as_str().unwrap().to_string();

    let review_uri = format!("/api/submissions/{}/review", submission_id);
    let (status, _) = send(
        &app,
        "POST",
        &review_uri,
        employee,
        Some(json!({ "decision": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/submissions/{}/start-review", submission_id),
        sales,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("under-review"));

    let (status, body) = send(
        &app,
        "POST",
        &review_uri,
        sales,
        Some(json!({ "decision": "approved", "notes": "Ship it" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["submission"]["status"], json!("approved"));
    assert_eq!(body["data"]["task"]["status"], json!("done"));
    assert_eq!(body["data"]["task"]["progress"], json!(100));

    let (status, body) = send(
        &app,
        "GET",
        "/api/notifications?unreadOnly=true",
        employee,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notifications = body["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], json!("submission-approved"));

    let (status, _) = send(&app, "GET", "/api/notifications", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrator = "opsdesk_storage::MIGRATOR")]
async fn test_provisioning_is_admin_only(pool: SqlitePool) {
    let seed = seed(&pool).await;
    let app = app(pool);
    let body = json!({ "role": "employee", "name": "Ned", "email": "ned@agency.test" });

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some((&seed.sales, "sales")),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        &app,
        "POST",
        "/api/users",
        Some((&seed.admin, "superadmin")),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["role"], json!("employee"));
}
