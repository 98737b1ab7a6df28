// ABOUTME: Closed set of caller roles
// ABOUTME: Parsing, display, and the role groups that gate workflow operations

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried by every user account.
///
/// The set is closed: adding a variant forces every `match` on `Role`
/// (most importantly the visibility rules) to decide what the new role sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Sales,
    Employee,
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Superadmin,
        Role::Admin,
        Role::Sales,
        Role::Employee,
        Role::Client,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Employee => "employee",
            Role::Client => "client",
        }
    }

    /// Admin and superadmin see every record unfiltered by ownership
    pub fn is_administrative(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin)
    }

    /// Roles allowed to assign employees to requirements and tasks
    pub fn can_assign(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Sales)
    }

    /// Roles that hold review authority over submissions
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Sales)
    }

    /// Roles that may create and edit requirements
    pub fn can_manage_requirements(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Sales)
    }

    /// Roles that may deliver work as submissions
    pub fn can_submit_work(&self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "sales" => Ok(Role::Sales),
            "employee" => Ok(Role::Employee),
            "client" => Ok(Role::Client),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}
