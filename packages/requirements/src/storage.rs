// ABOUTME: Requirement storage layer using SQLite
// ABOUTME: Handles CRUD, soft delete, scoped listing, and atomic request/assignment appends

use chrono::Utc;
use opsdesk_core::{generate_id, validate_pricing, validate_required, AssignmentChange};
use opsdesk_storage::{decode_id_set, IdSetColumn, StorageError, StorageResult};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use super::types::{
    Requirement, RequirementCreateInput, RequirementFilter, RequirementStatus,
    RequirementUpdateInput,
};

const REQUESTED_BY: IdSetColumn = IdSetColumn {
    entity: "Requirement",
    table: "requirements",
    column: "requested_by",
    live_filter: "AND is_deleted = 0",
};

const ASSIGNED_EMPLOYEES: IdSetColumn = IdSetColumn {
    entity: "Requirement",
    table: "requirements",
    column: "assigned_employees",
    live_filter: "AND is_deleted = 0",
};

pub struct RequirementStorage {
    pool: SqlitePool,
}

impl RequirementStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a requirement after enforcing the pricing invariant
    pub async fn create_requirement(
        &self,
        input: RequirementCreateInput,
        created_by: &str,
    ) -> StorageResult<Requirement> {
        validate_required("title", &input.title)?;
        validate_pricing(input.mrp, input.deal_price)?;

        let client_sales_person: Option<Option<String>> = sqlx::query_scalar(
            "SELECT sales_person_id FROM clients WHERE id = ? AND is_deleted = 0",
        )
        .bind(&input.client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let Some(client_sales_person) = client_sales_person else {
            return Err(StorageError::not_found("Client", &input.client_id));
        };

        let requirement_id = generate_id("req");
        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        let sales_person_id = input.sales_person_id.or(client_sales_person);

        debug!(
            "Creating requirement: {} for client: {}",
            requirement_id, input.client_id
        );

        sqlx::query(
            r#"
            INSERT INTO requirements (
                id, client_id, sales_person_id, title, description, status,
                assigned_employees, requested_by, mrp, deal_price,
                created_by, is_deleted, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, '[]', '[]', ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&requirement_id)
        .bind(&input.client_id)
        .bind(&sales_person_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(status)
        .bind(input.mrp)
        .bind(input.deal_price)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_requirement(&requirement_id).await
    }

    /// Get a live (not soft-deleted) requirement
    pub async fn get_requirement(&self, requirement_id: &str) -> StorageResult<Requirement> {
        match self.find_requirement(requirement_id).await? {
            Some(requirement) if !requirement.is_deleted => Ok(requirement),
            _ => Err(StorageError::not_found("Requirement", requirement_id)),
        }
    }

    /// Point lookup including soft-deleted records
    pub async fn find_requirement(
        &self,
        requirement_id: &str,
    ) -> StorageResult<Option<Requirement>> {
        debug!("Fetching requirement: {}", requirement_id);

        let row = sqlx::query("SELECT * FROM requirements WHERE id = ?")
            .bind(requirement_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_requirement).transpose()
    }

    /// List live requirements matching every populated filter field
    pub async fn list_requirements(
        &self,
        filter: &RequirementFilter,
    ) -> StorageResult<Vec<Requirement>> {
        debug!("Listing requirements with filter: {:?}", filter);

        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT r.* FROM requirements r WHERE r.is_deleted = 0");

        if let Some(client_id) = &filter.client_id {
            query.push(" AND r.client_id = ");
            query.push_bind(client_id.clone());
        }
        if let Some(sales_person_id) = &filter.client_sales_person_id {
            query.push(" AND r.client_id IN (SELECT c.id FROM clients c WHERE c.sales_person_id = ");
            query.push_bind(sales_person_id.clone());
            query.push(")");
        }
        if let Some(employee_id) = &filter.assigned_employee_id {
            query.push(
                " AND EXISTS (SELECT 1 FROM json_each(r.assigned_employees) WHERE json_each.value = ",
            );
            query.push_bind(employee_id.clone());
            query.push(")");
        }

        query.push(" ORDER BY r.created_at DESC, r.id");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_requirement).collect()
    }

    /// Apply a partial update; the pricing invariant is checked against the merged values
    pub async fn update_requirement(
        &self,
        requirement_id: &str,
        input: RequirementUpdateInput,
    ) -> StorageResult<Requirement> {
        debug!("Updating requirement: {}", requirement_id);

        let current = self.get_requirement(requirement_id).await?;

        if let Some(title) = &input.title {
            validate_required("title", title)?;
        }
        let mrp = input.mrp.unwrap_or(current.mrp);
        let deal_price = input.deal_price.unwrap_or(current.deal_price);
        validate_pricing(mrp, deal_price)?;

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE requirements SET updated_at = ");
        query.push_bind(Utc::now());

        if let Some(title) = input.title {
            query.push(", title = ");
            query.push_bind(title.trim().to_string());
        }
        if let Some(description) = input.description {
            query.push(", description = ");
            query.push_bind(description);
        }
        if let Some(status) = input.status {
            query.push(", status = ");
            query.push_bind(status);
        }
        if let Some(sales_person_id) = input.sales_person_id {
            query.push(", sales_person_id = ");
            query.push_bind(sales_person_id);
        }
        if input.mrp.is_some() || input.deal_price.is_some() {
            query.push(", mrp = ");
            query.push_bind(mrp);
            query.push(", deal_price = ");
            query.push_bind(deal_price);
        }

        query.push(" WHERE id = ");
        query.push_bind(requirement_id.to_string());
        query.push(" AND is_deleted = 0");

        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Requirement", requirement_id));
        }

        self.get_requirement(requirement_id).await
    }

    /// Soft delete; requirements are never removed from the store
    pub async fn soft_delete_requirement(&self, requirement_id: &str) -> StorageResult<()> {
        debug!("Soft deleting requirement: {}", requirement_id);

        let result = sqlx::query(
            "UPDATE requirements SET is_deleted = 1, updated_at = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(Utc::now())
        .bind(requirement_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Requirement", requirement_id));
        }

        Ok(())
    }

    /// Record interest from `user_id`; a repeated request is a no-op
    pub async fn add_request(
        &self,
        requirement_id: &str,
        user_id: &str,
    ) -> StorageResult<AssignmentChange> {
        let added = REQUESTED_BY.append(&self.pool, requirement_id, user_id).await?;
        Ok(added.into())
    }

    /// Add `employee_id` to the owners; a repeated assignment is a no-op
    pub async fn add_assigned_employee(
        &self,
        requirement_id: &str,
        employee_id: &str,
    ) -> StorageResult<AssignmentChange> {
        let added = ASSIGNED_EMPLOYEES
            .append(&self.pool, requirement_id, employee_id)
            .await?;
        Ok(added.into())
    }
}

fn row_to_requirement(row: &sqlx::sqlite::SqliteRow) -> StorageResult<Requirement> {
    let assigned_employees: String = row.try_get("assigned_employees")?;
    let requested_by: String = row.try_get("requested_by")?;

    Ok(Requirement {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        sales_person_id: row.try_get("sales_person_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: row.try_get::<RequirementStatus, _>("status")?,
        assigned_employees: decode_id_set(&assigned_employees)?,
        requested_by: decode_id_set(&requested_by)?,
        mrp: row.try_get("mrp")?,
        deal_price: row.try_get("deal_price")?,
        created_by: row.try_get("created_by")?,
        is_deleted: row.try_get("is_deleted")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

