// ABOUTME: Requirement type definitions
// ABOUTME: Structures for requirements, their lifecycle status, and create/update inputs

use chrono::{DateTime, Utc};
use opsdesk_core::IdSet;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RequirementStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    InProgress,
    Completed,
}

impl Default for RequirementStatus {
    fn default() -> Self {
        RequirementStatus::Draft
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub client_id: String,
    pub sales_person_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: RequirementStatus,

    // Ownership sets
    pub assigned_employees: IdSet,
    pub requested_by: IdSet,

    // Pricing
    pub mrp: f64,
    pub deal_price: Option<f64>,

    // Metadata
    pub created_by: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementCreateInput {
    pub client_id: String,
    /// Defaults to the client's sales person when omitted
    pub sales_person_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<RequirementStatus>,
    pub mrp: f64,
    pub deal_price: Option<f64>,
}

/// Partial update. Ownership sets are only changed through the assignment operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementUpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<RequirementStatus>,
    pub sales_person_id: Option<String>,
    pub mrp: Option<f64>,
    /// Absent leaves the deal price alone; an explicit `null` clears it
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub deal_price: Option<Option<f64>>,
}

/// Distinguish a field sent as `null` from one that was omitted
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Storage-level narrowing applied by the visibility rules.
/// Every populated field is an additional AND condition.
#[derive(Debug, Clone, Default)]
pub struct RequirementFilter {
    pub client_id: Option<String>,
    /// Requirements whose client is owned by this sales person
    pub client_sales_person_id: Option<String>,
    /// Requirements with this user in `assigned_employees`
    pub assigned_employee_id: Option<String>,
}
