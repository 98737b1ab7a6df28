// ABOUTME: Work submissions and their review status
// ABOUTME: Provides numbered inserts, scoped listing, and review writes

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
