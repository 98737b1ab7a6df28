// ABOUTME: Submission type definitions
// ABOUTME: Structures for submissions, deliverables, review status, and review decisions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    ChangesRequested,
}

impl SubmissionStatus {
    /// Whether a reviewer has already recorded a decision
    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Approved
                | SubmissionStatus::Rejected
                | SubmissionStatus::ChangesRequested
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::UnderReview => "under-review",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::ChangesRequested => "changes-requested",
        }
    }
}

/// The closed set of outcomes a reviewer can record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    ChangesRequested,
}

impl ReviewDecision {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            ReviewDecision::Approved => SubmissionStatus::Approved,
            ReviewDecision::Rejected => SubmissionStatus::Rejected,
            ReviewDecision::ChangesRequested => SubmissionStatus::ChangesRequested,
        }
    }

    pub fn from_status(status: SubmissionStatus) -> Option<Self> {
        match status {
            SubmissionStatus::Approved => Some(ReviewDecision::Approved),
            SubmissionStatus::Rejected => Some(ReviewDecision::Rejected),
            SubmissionStatus::ChangesRequested => Some(ReviewDecision::ChangesRequested),
            SubmissionStatus::Pending | SubmissionStatus::UnderReview => None,
        }
    }
}

/// A delivered file; the bytes live in external object storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub name: String,
    pub storage_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub task_id: String,
    pub requirement_id: String,
    pub client_id: String,
    pub submitted_by: String,
    pub submission_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub deliverables: Vec<Deliverable>,
    pub status: SubmissionStatus,
    pub version: i32,
    pub previous_submission_id: Option<String>,

    // Review
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub requested_changes: Option<String>,

    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully validated submission ready to be written
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub task_id: String,
    pub requirement_id: String,
    pub client_id: String,
    pub submitted_by: String,
    pub title: String,
    pub description: Option<String>,
    pub deliverables: Vec<Deliverable>,
    pub version: i32,
    pub previous_submission_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub decision: ReviewDecision,
    pub reviewer_id: String,
    pub notes: Option<String>,
    pub requested_changes: Option<String>,
}

/// Storage-level narrowing applied by the visibility rules.
/// Every populated field is an additional AND condition.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub client_id: Option<String>,
    pub client_sales_person_id: Option<String>,
    pub submitted_by: Option<String>,
    pub requirement_id: Option<String>,
    pub status: Option<SubmissionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_maps_to_terminal_status() {
        for decision in [
            ReviewDecision::Approved,
            ReviewDecision::Rejected,
            ReviewDecision::ChangesRequested,
        ] {
            let status = decision.status();
            assert!(status.is_decided());
            assert_eq!(ReviewDecision::from_status(status), Some(decision));
        }
        assert!(!SubmissionStatus::Pending.is_decided());
        assert!(!SubmissionStatus::UnderReview.is_decided());
    }

    #[test]
    fn test_unknown_decision_is_rejected() {
        let parsed: Result<ReviewDecision, _> = serde_json::from_str("\"maybe\"");
        assert!(parsed.is_err());

        let parsed: ReviewDecision = serde_json::from_str("\"changes-requested\"").unwrap();
        assert_eq!(parsed, ReviewDecision::ChangesRequested);
    }

    #[test]
    fn test_deliverable_content_type_is_optional() {
        let deliverable: Deliverable =
            serde_json::from_str(r#"{"name":"logo.png","storageKey":"obj/123"}"#).unwrap();
        assert_eq!(deliverable.content_type, None);
        assert_eq!(deliverable.storage_key, "obj/123");
    }
}
