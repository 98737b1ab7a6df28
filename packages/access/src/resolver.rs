// ABOUTME: Visibility resolver for requirement, submission, and meeting reads
// ABOUTME: Resolves caller scope, queries storage with the scoped filter, and enriches results

use opsdesk_accounts::{ClientStorage, UserStorage};
use opsdesk_meetings::MeetingStorage;
use opsdesk_requirements::RequirementStorage;
use opsdesk_storage::{StorageError, StorageResult};
use opsdesk_submissions::SubmissionStorage;
use opsdesk_tasks::TaskStorage;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::caller::Caller;
use crate::enrich::{EnrichedMeeting, EnrichedRequirement, EnrichedSubmission, Enricher};
use crate::scope::{
    role_rule, MeetingQuery, RequirementQuery, RoleRule, SubmissionQuery, VisibilityScope,
};

pub struct VisibilityResolver {
    users: UserStorage,
    clients: ClientStorage,
    requirements: RequirementStorage,
    tasks: TaskStorage,
    submissions: SubmissionStorage,
    meetings: MeetingStorage,
}

impl VisibilityResolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserStorage::new(pool.clone()),
            clients: ClientStorage::new(pool.clone()),
            requirements: RequirementStorage::new(pool.clone()),
            tasks: TaskStorage::new(pool.clone()),
            submissions: SubmissionStorage::new(pool.clone()),
            meetings: MeetingStorage::new(pool),
        }
    }

    /// Resolve the caller's scope, including the client lookup for
    /// client-role users
    pub async fn resolve_scope(
        &self,
        caller: &Caller,
        assigned_only: bool,
    ) -> StorageResult<VisibilityScope> {
        let scope = match role_rule(caller, assigned_only) {
            RoleRule::Scope(scope) => scope,
            RoleRule::ClientUser(user_id) => match self.clients.find_client_by_user(&user_id).await? {
                Some(client) => VisibilityScope::Client(client.id),
                None => VisibilityScope::Nothing,
            },
        };

        if scope == VisibilityScope::Nothing {
            warn!(
                audit = true,
                user_id = caller.user_id.as_deref().unwrap_or("-"),
                role = caller.role.map(|r| r.as_str()).unwrap_or("-"),
                "Caller resolved to an empty visibility scope"
            );
        }

        debug!("Resolved scope {:?} for {:?}", scope, caller);
        Ok(scope)
    }

    fn enricher(&self) -> Enricher<'_> {
        Enricher::new(&self.users, &self.clients, &self.requirements, &self.tasks)
    }

    async fn client_sales_person(&self, client_id: &str) -> StorageResult<Option<String>> {
        Ok(self
            .clients
            .find_client(client_id)
            .await?
            .and_then(|client| client.sales_person_id))
    }

    pub async fn list_requirements(
        &self,
        caller: &Caller,
        query: &RequirementQuery,
    ) -> StorageResult<Vec<EnrichedRequirement>> {
        let scope = self.resolve_scope(caller, query.assigned_only).await?;
        let Some(filter) = scope.requirement_filter(query) else {
            return Ok(Vec::new());
        };

        let records = self.requirements.list_requirements(&filter).await?;
        let mut enricher = self.enricher();
        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(enricher.requirement(record).await?);
        }
        Ok(enriched)
    }

    pub async fn list_submissions(
        &self,
        caller: &Caller,
        query: &SubmissionQuery,
    ) -> StorageResult<Vec<EnrichedSubmission>> {
        let scope = self.resolve_scope(caller, query.assigned_only).await?;
        let Some(filter) = scope.submission_filter(query) else {
            return Ok(Vec::new());
        };

        let records = self.submissions.list_submissions(&filter).await?;
        let mut enricher = self.enricher();
        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(enricher.submission(record).await?);
        }
        Ok(enriched)
    }

    pub async fn list_meetings(
        &self,
        caller: &Caller,
        query: &MeetingQuery,
    ) -> StorageResult<Vec<EnrichedMeeting>> {
        let scope = self.resolve_scope(caller, query.assigned_only).await?;
        let Some(filter) = scope.meeting_filter(query) else {
            return Ok(Vec::new());
        };

        let records = self.meetings.list_meetings(&filter).await?;
        let mut enricher = self.enricher();
        let mut enriched = Vec::with_capacity(records.len());
        for record in records {
            enriched.push(enricher.meeting(record).await?);
        }
        Ok(enriched)
    }

    /// Single requirement, `NotFound` when it lies outside the caller's scope
    pub async fn get_requirement(
        &self,
        caller: &Caller,
        requirement_id: &str,
    ) -> StorageResult<EnrichedRequirement> {
        let scope = self.resolve_scope(caller, false).await?;
        let requirement = self.requirements.get_requirement(requirement_id).await?;
        let sales_person = self.client_sales_person(&requirement.client_id).await?;

        if !scope.admits_requirement(&requirement, sales_person.as_deref()) {
            return Err(StorageError::not_found("Requirement", requirement_id));
        }

        self.enricher().requirement(requirement).await
    }

    /// Single submission, `NotFound` when it lies outside the caller's scope
    pub async fn get_submission(
        &self,
        caller: &Caller,
        submission_id: &str,
    ) -> StorageResult<EnrichedSubmission> {
        let scope = self.resolve_scope(caller, false).await?;
        let submission = self.submissions.get_submission(submission_id).await?;
        let sales_person = self.client_sales_person(&submission.client_id).await?;

        if !scope.admits_submission(&submission, sales_person.as_deref()) {
            return Err(StorageError::not_found("Submission", submission_id));
        }

        self.enricher().submission(submission).await
    }

    /// Single meeting, `NotFound` when it lies outside the caller's scope
    pub async fn get_meeting(
        &self,
        caller: &Caller,
        meeting_id: &str,
    ) -> StorageResult<EnrichedMeeting> {
        let scope = self.resolve_scope(caller, false).await?;
        let meeting = self.meetings.get_meeting(meeting_id).await?;
        let sales_person = self.client_sales_person(&meeting.client_id).await?;

        if !scope.admits_meeting(&meeting, sales_person.as_deref()) {
            return Err(StorageError::not_found("Meeting", meeting_id));
        }

        self.enricher().meeting(meeting).await
    }
}
