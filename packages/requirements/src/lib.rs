// ABOUTME: Client requirements with pricing and multi-employee assignment
// ABOUTME: Provides types and storage for requirements and their request/assignment sets

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
