// ABOUTME: Client meetings
// ABOUTME: Provides scheduling records, cancellation, and scoped listing

pub mod storage;
pub mod types;

pub use storage::*;
pub use types::*;
