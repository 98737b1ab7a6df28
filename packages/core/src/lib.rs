// ABOUTME: Core types, traits, and utilities for OpsDesk
// ABOUTME: Foundational package providing roles, id sets, and validation rules shared by all packages

pub mod assignment;
pub mod constants;
pub mod id_set;
pub mod role;
pub mod utils;
pub mod validation;

// Re-export main types
pub use assignment::AssignmentChange;
pub use id_set::IdSet;
pub use role::{ParseRoleError, Role};

// Re-export constants
pub use constants::{default_database_path, opsdesk_dir};

// Re-export utilities
pub use utils::{display_submission_number, generate_id};

// Re-export validation
pub use validation::{
    validate_duration, validate_pricing, validate_progress, validate_required, ValidationError,
};
