// ABOUTME: Read-only enrichment of records with human-readable names
// ABOUTME: Point lookups behind a per-call cache; dangling references become placeholders

use std::collections::HashMap;

use opsdesk_accounts::{ClientStorage, UserStorage};
use opsdesk_core::display_submission_number;
use opsdesk_meetings::Meeting;
use opsdesk_requirements::{Requirement, RequirementStorage};
use opsdesk_storage::StorageResult;
use opsdesk_submissions::Submission;
use opsdesk_tasks::TaskStorage;
use serde::Serialize;
use tracing::warn;

pub const UNKNOWN_CLIENT: &str = "Unknown client";
pub const UNKNOWN_USER: &str = "Unknown user";
pub const UNKNOWN_TASK: &str = "Unknown task";
pub const UNKNOWN_REQUIREMENT: &str = "Unknown requirement";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRequirement {
    #[serde(flatten)]
    pub requirement: Requirement,
    pub client_name: String,
    pub sales_person_name: Option<String>,
    pub assigned_employee_names: Vec<String>,
    pub requested_by_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub display_number: String,
    pub client_name: String,
    pub submitted_by_name: String,
    pub reviewed_by_name: Option<String>,
    pub task_title: String,
    pub requirement_title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMeeting {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub client_name: String,
    pub organizer_name: String,
    pub attendee_names: Vec<String>,
}

/// Name lookups for a single list call
pub(crate) struct Enricher<'a> {
    users: &'a UserStorage,
    clients: &'a ClientStorage,
    requirements: &'a RequirementStorage,
    tasks: &'a TaskStorage,
    user_names: HashMap<String, String>,
    client_names: HashMap<String, String>,
    requirement_titles: HashMap<String, String>,
    task_titles: HashMap<String, String>,
}

fn placeholder(kind: &str, id: &str, label: &str) -> String {
    warn!("Dangling {} reference {}, showing '{}'", kind, id, label);
    label.to_string()
}

impl<'a> Enricher<'a> {
    pub(crate) fn new(
        users: &'a UserStorage,
        clients: &'a ClientStorage,
        requirements: &'a RequirementStorage,
        tasks: &'a TaskStorage,
    ) -> Self {
        Self {
            users,
            clients,
            requirements,
            tasks,
            user_names: HashMap::new(),
            client_names: HashMap::new(),
            requirement_titles: HashMap::new(),
            task_titles: HashMap::new(),
        }
    }

    async fn user_name(&mut self, user_id: &str) -> StorageResult<String> {
        if let Some(name) = self.user_names.get(user_id) {
            return Ok(name.clone());
        }
        let name = match self.users.find_user(user_id).await? {
            Some(user) => user.name,
            None => placeholder("user", user_id, UNKNOWN_USER),
        };
        self.user_names.insert(user_id.to_string(), name.clone());
        Ok(name)
    }

    async fn user_names<'i>(
        &mut self,
        user_ids: impl Iterator<Item = &'i str>,
    ) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for user_id in user_ids {
            names.push(self.user_name(user_id).await?);
        }
        Ok(names)
    }

    async fn client_name(&mut self, client_id: &str) -> StorageResult<String> {
        if let Some(name) = self.client_names.get(client_id) {
            return Ok(name.clone());
        }
        let name = match self.clients.find_client(client_id).await? {
            Some(client) => client.name,
            None => placeholder("client", client_id, UNKNOWN_CLIENT),
        };
        self.client_names.insert(client_id.to_string(), name.clone());
        Ok(name)
    }

    async fn requirement_title(&mut self, requirement_id: &str) -> StorageResult<String> {
        if let Some(title) = self.requirement_titles.get(requirement_id) {
            return Ok(title.clone());
        }
        let title = match self.requirements.find_requirement(requirement_id).await? {
            Some(requirement) => requirement.title,
            None => placeholder("requirement", requirement_id, UNKNOWN_REQUIREMENT),
        };
        self.requirement_titles
            .insert(requirement_id.to_string(), title.clone());
        Ok(title)
    }

    async fn task_title(&mut self, task_id: &str) -> StorageResult<String> {
        if let Some(title) = self.task_titles.get(task_id) {
            return Ok(title.clone());
        }
        let title = match self.tasks.find_task(task_id).await? {
            Some(task) => task.title,
            None => placeholder("task", task_id, UNKNOWN_TASK),
        };
        self.task_titles.insert(task_id.to_string(), title.clone());
        Ok(title)
    }

    pub(crate) async fn requirement(
        &mut self,
        requirement: Requirement,
    ) -> StorageResult<EnrichedRequirement> {
        let client_name = self.client_name(&requirement.client_id).await?;
        let sales_person_name = match requirement.sales_person_id.as_deref() {
            Some(user_id) => Some(self.user_name(user_id).await?),
            None => None,
        };
        let assigned_employee_names = self
            .user_names(requirement.assigned_employees.iter())
            .await?;
        let requested_by_names = self.user_names(requirement.requested_by.iter()).await?;

        Ok(EnrichedRequirement {
            requirement,
            client_name,
            sales_person_name,
            assigned_employee_names,
            requested_by_names,
        })
    }

    pub(crate) async fn submission(
        &mut self,
        submission: Submission,
    ) -> StorageResult<EnrichedSubmission> {
        let client_name = self.client_name(&submission.client_id).await?;
        let submitted_by_name = self.user_name(&submission.submitted_by).await?;
        let reviewed_by_name = match submission.reviewed_by.as_deref() {
            Some(user_id) => Some(self.user_name(user_id).await?),
            None => None,
        };
        let task_title = self.task_title(&submission.task_id).await?;
        let requirement_title = self.requirement_title(&submission.requirement_id).await?;

        Ok(EnrichedSubmission {
            display_number: display_submission_number(submission.submission_number),
            submission,
            client_name,
            submitted_by_name,
            reviewed_by_name,
            task_title,
            requirement_title,
        })
    }

    pub(crate) async fn meeting(&mut self, meeting: Meeting) -> StorageResult<EnrichedMeeting> {
        let client_name = self.client_name(&meeting.client_id).await?;
        let organizer_name = self.user_name(&meeting.organizer_id).await?;
        let attendee_names = self.user_names(meeting.attendees.iter()).await?;

        Ok(EnrichedMeeting {
            meeting,
            client_name,
            organizer_name,
            attendee_names,
        })
    }
}
