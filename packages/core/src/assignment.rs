// ABOUTME: Outcome of assignment operations
// ABOUTME: Reports whether an idempotent write changed the stored record

use serde::{Deserialize, Serialize};

/// Result of an idempotent assignment or request write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "kebab-case")]
pub enum AssignmentChange {
    /// The id was newly added to the set
    Added,
    /// The id was already present; nothing was written
    Unchanged,
    /// A single-owner field moved to a new owner
    #[serde(rename_all = "camelCase")]
    Replaced { previous: Option<String> },
}

impl AssignmentChange {
    pub fn is_change(&self) -> bool {
        !matches!(self, AssignmentChange::Unchanged)
    }
}

impl From<bool> for AssignmentChange {
    fn from(added: bool) -> Self {
        if added {
            AssignmentChange::Added
        } else {
            AssignmentChange::Unchanged
        }
    }
}
