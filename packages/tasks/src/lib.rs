// ABOUTME: Delivery tasks belonging to requirements
// ABOUTME: Provides CRUD, single-owner assignment, and review cascade writes

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
