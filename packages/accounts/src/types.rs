// ABOUTME: Account type definitions
// ABOUTME: Structures for users, agency clients, and their creation inputs

use chrono::{DateTime, Utc};
use opsdesk_core::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateInput {
    pub role: Role,
    pub name: String,
    pub email: String,
}

/// An agency client, linked 1:1 to a user account of role `client`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub sales_person_id: Option<String>,
    pub name: String,
    pub contact_email: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreateInput {
    pub user_id: String,
    pub sales_person_id: Option<String>,
    pub name: String,
    pub contact_email: Option<String>,
}
