// ABOUTME: Request/assign cycle for requirements and tasks
// ABOUTME: One algorithm over an AssignmentTarget trait, with notifications on real changes

use async_trait::async_trait;
use opsdesk_core::AssignmentChange;
use opsdesk_notifications::{
    NewNotification, NotificationEmitter, NotificationType, RelatedEntityType,
};
use opsdesk_requirements::RequirementStorage;
use opsdesk_storage::StorageResult;
use opsdesk_tasks::TaskStorage;
use tracing::info;

/// Display data used to word assignment notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    pub title: String,
    /// Who hears about new assignment requests
    pub request_watcher: Option<String>,
}

/// A record that collects assignment requests and owners
#[async_trait]
pub trait AssignmentTarget: Send + Sync {
    const ENTITY: RelatedEntityType;
    const ASSIGNED: NotificationType;
    const LABEL: &'static str;

    async fn record_request(&self, entity_id: &str, user_id: &str)
        -> StorageResult<AssignmentChange>;

    async fn record_assignment(
        &self,
        entity_id: &str,
        employee_id: &str,
    ) -> StorageResult<AssignmentChange>;

    async fn describe(&self, entity_id: &str) -> StorageResult<TargetInfo>;
}

#[async_trait]
impl AssignmentTarget for RequirementStorage {
    const ENTITY: RelatedEntityType = RelatedEntityType::Requirement;
    const ASSIGNED: NotificationType = NotificationType::RequirementAssigned;
    const LABEL: &'static str = "requirement";

    async fn record_request(
        &self,
        entity_id: &str,
        user_id: &str,
    ) -> StorageResult<AssignmentChange> {
        self.add_request(entity_id, user_id).await
    }

    async fn record_assignment(
        &self,
        entity_id: &str,
        employee_id: &str,
    ) -> StorageResult<AssignmentChange> {
        self.add_assigned_employee(entity_id, employee_id).await
    }

    async fn describe(&self, entity_id: &str) -> StorageResult<TargetInfo> {
        let requirement = self.get_requirement(entity_id).await?;
        Ok(TargetInfo {
            title: requirement.title,
            request_watcher: requirement.sales_person_id,
        })
    }
}

#[async_trait]
impl AssignmentTarget for TaskStorage {
    const ENTITY: RelatedEntityType = RelatedEntityType::Task;
    const ASSIGNED: NotificationType = NotificationType::TaskAssigned;
    const LABEL: &'static str = "task";

    async fn record_request(
        &self,
        entity_id: &str,
        user_id: &str,
    ) -> StorageResult<AssignmentChange> {
        self.add_request(entity_id, user_id).await
    }

    async fn record_assignment(
        &self,
        entity_id: &str,
        employee_id: &str,
    ) -> StorageResult<AssignmentChange> {
        self.set_assignee(entity_id, employee_id).await
    }

    async fn describe(&self, entity_id: &str) -> StorageResult<TargetInfo> {
        let task = self.get_task(entity_id).await?;
        Ok(TargetInfo {
            title: task.title,
            request_watcher: None,
        })
    }
}

pub struct AssignmentWorkflow<T: AssignmentTarget> {
    target: T,
    emitter: NotificationEmitter,
}

impl<T: AssignmentTarget> AssignmentWorkflow<T> {
    pub fn new(target: T, emitter: NotificationEmitter) -> Self {
        Self { target, emitter }
    }

    /// Record that `user_id` wants to work on the entity. Repeats are no-ops.
    pub async fn request_assignment(
        &self,
        entity_id: &str,
        user_id: &str,
    ) -> StorageResult<AssignmentChange> {
        let change = self.target.record_request(entity_id, user_id).await?;
        if !change.is_change() {
            return Ok(change);
        }

        info!("{} {} requested by {}", T::LABEL, entity_id, user_id);

        let target = self.target.describe(entity_id).await?;
        if let Some(watcher) = target.request_watcher.filter(|w| w != user_id) {
            self.emitter
                .emit_best_effort(NewNotification {
                    sent_to: watcher,
                    notification_type: NotificationType::AssignmentRequested,
                    related_entity_type: T::ENTITY,
                    related_entity_id: entity_id.to_string(),
                    initiated_by: user_id.to_string(),
                    title: "Assignment requested".to_string(),
                    message: format!("A team member asked to work on \"{}\"", target.title),
                })
                .await;
        }

        Ok(change)
    }

    /// Make `employee_id` an owner of the entity. Role checks belong to the caller.
    pub async fn assign(
        &self,
        entity_id: &str,
        employee_id: &str,
        assigned_by: &str,
    ) -> StorageResult<AssignmentChange> {
        let change = self.target.record_assignment(entity_id, employee_id).await?;
        if !change.is_change() {
            return Ok(change);
        }

        info!(
            "{} {} assigned to {} by {} ({:?})",
            T::LABEL,
            entity_id,
            employee_id,
            assigned_by,
            change
        );

        let target = self.target.describe(entity_id).await?;
        self.emitter
            .emit_best_effort(NewNotification {
                sent_to: employee_id.to_string(),
                notification_type: T::ASSIGNED,
                related_entity_type: T::ENTITY,
                related_entity_id: entity_id.to_string(),
                initiated_by: assigned_by.to_string(),
                title: format!("New {} assignment", T::LABEL),
                message: format!("You have been assigned to \"{}\"", target.title),
            })
            .await;

        Ok(change)
    }
}
