// ABOUTME: Visibility scopes and their translation into storage filters
// ABOUTME: Role rules are matched exhaustively so every role decides what it sees

use opsdesk_core::Role;
use opsdesk_meetings::{Meeting, MeetingFilter};
use opsdesk_requirements::{Requirement, RequirementFilter};
use opsdesk_submissions::{Submission, SubmissionFilter, SubmissionStatus};
use serde::Deserialize;

use crate::caller::Caller;

/// The set of records a caller may read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Every non-deleted record
    All,
    /// Records whose client is owned by this sales person
    SalesPerson(String),
    /// Records this user owns (assignee, author, or attendee)
    AssignedTo(String),
    /// Records of this client
    Client(String),
    /// Nothing at all
    Nothing,
}

/// Entitlement derived from role alone; client users still need their
/// client record resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRule {
    Scope(VisibilityScope),
    ClientUser(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementQuery {
    #[serde(default)]
    pub assigned_only: bool,
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionQuery {
    pub client_id: Option<String>,
    pub requirement_id: Option<String>,
    pub status: Option<SubmissionStatus>,
    #[serde(default)]
    pub assigned_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingQuery {
    pub client_id: Option<String>,
    pub requirement_id: Option<String>,
    #[serde(default)]
    pub assigned_only: bool,
}

/// Apply the role rules in precedence order. A missing user id or role
/// yields `Nothing`.
pub fn role_rule(caller: &Caller, assigned_only: bool) -> RoleRule {
    let (Some(user_id), Some(role)) = (caller.user_id.as_deref(), caller.role) else {
        return RoleRule::Scope(VisibilityScope::Nothing);
    };

    match role {
        Role::Superadmin | Role::Admin => RoleRule::Scope(VisibilityScope::All),
        Role::Sales => RoleRule::Scope(VisibilityScope::SalesPerson(user_id.to_string())),
        Role::Employee if assigned_only => {
            RoleRule::Scope(VisibilityScope::AssignedTo(user_id.to_string()))
        }
        Role::Employee => RoleRule::Scope(VisibilityScope::All),
        Role::Client => RoleRule::ClientUser(user_id.to_string()),
    }
}

/// Combine the scope's client constraint with a requested client filter.
/// `None` means the two are disjoint and nothing can match.
fn intersect_client(scoped: Option<&str>, requested: Option<&str>) -> Option<Option<String>> {
    match (scoped, requested) {
        (Some(scoped), Some(requested)) if scoped != requested => None,
        (Some(scoped), _) => Some(Some(scoped.to_string())),
        (None, requested) => Some(requested.map(str::to_string)),
    }
}

impl VisibilityScope {
    fn scoped_client(&self) -> Option<&str> {
        match self {
            VisibilityScope::Client(client_id) => Some(client_id),
            _ => None,
        }
    }

    fn sales_person(&self) -> Option<String> {
        match self {
            VisibilityScope::SalesPerson(user_id) => Some(user_id.clone()),
            _ => None,
        }
    }

    fn assigned_to(&self) -> Option<String> {
        match self {
            VisibilityScope::AssignedTo(user_id) => Some(user_id.clone()),
            _ => None,
        }
    }

    /// Storage filter for a requirement list, or `None` when nothing is visible
    pub fn requirement_filter(&self, query: &RequirementQuery) -> Option<RequirementFilter> {
        if *self == VisibilityScope::Nothing {
            return None;
        }
        let client_id = intersect_client(self.scoped_client(), query.client_id.as_deref())?;

        Some(RequirementFilter {
            client_id,
            client_sales_person_id: self.sales_person(),
            assigned_employee_id: self.assigned_to(),
        })
    }

    pub fn submission_filter(&self, query: &SubmissionQuery) -> Option<SubmissionFilter> {
        if *self == VisibilityScope::Nothing {
            return None;
        }
        let client_id = intersect_client(self.scoped_client(), query.client_id.as_deref())?;

        Some(SubmissionFilter {
            client_id,
            client_sales_person_id: self.sales_person(),
            submitted_by: self.assigned_to(),
            requirement_id: query.requirement_id.clone(),
            status: query.status,
        })
    }

    pub fn meeting_filter(&self, query: &MeetingQuery) -> Option<MeetingFilter> {
        if *self == VisibilityScope::Nothing {
            return None;
        }
        let client_id = intersect_client(self.scoped_client(), query.client_id.as_deref())?;

        Some(MeetingFilter {
            client_id,
            client_sales_person_id: self.sales_person(),
            requirement_id: query.requirement_id.clone(),
            attendee_id: self.assigned_to(),
        })
    }

    /// Whether a single requirement falls inside this scope.
    /// `client_sales_person` is the sales person of the requirement's client.
    pub fn admits_requirement(
        &self,
        requirement: &Requirement,
        client_sales_person: Option<&str>,
    ) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::SalesPerson(user_id) => client_sales_person == Some(user_id.as_str()),
            VisibilityScope::AssignedTo(user_id) => requirement.assigned_employees.contains(user_id),
            VisibilityScope::Client(client_id) => requirement.client_id == *client_id,
            VisibilityScope::Nothing => false,
        }
    }

    pub fn admits_submission(
        &self,
        submission: &Submission,
        client_sales_person: Option<&str>,
    ) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::SalesPerson(user_id) => client_sales_person == Some(user_id.as_str()),
            VisibilityScope::AssignedTo(user_id) => submission.submitted_by == *user_id,
            VisibilityScope::Client(client_id) => submission.client_id == *client_id,
            VisibilityScope::Nothing => false,
        }
    }

    pub fn admits_meeting(&self, meeting: &Meeting, client_sales_person: Option<&str>) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::SalesPerson(user_id) => client_sales_person == Some(user_id.as_str()),
            VisibilityScope::AssignedTo(user_id) => meeting.attendees.contains(user_id),
            VisibilityScope::Client(client_id) => meeting.client_id == *client_id,
            VisibilityScope::Nothing => false,
        }
    }
}
