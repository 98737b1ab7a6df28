// ABOUTME: Write-side workflows for OpsDesk
// ABOUTME: Assignment requests, submission creation, review cascades, and reconciliation

pub mod assignment;
pub mod reconcile;
pub mod review;
pub mod submission;

pub use assignment::{AssignmentTarget, AssignmentWorkflow, TargetInfo};
pub use reconcile::{ReconcileReport, Reconciler, TaskRepair};
pub use review::{ReviewOutcome, ReviewSaga, ReviewStep, ReviewWorkflow, TaskCascade};
pub use submission::{SubmissionCreateInput, SubmissionWorkflow};
