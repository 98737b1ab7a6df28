// ABOUTME: Notification records and emission
// ABOUTME: Persists notifications through a sink and exposes per-recipient reads

pub mod emitter;
pub mod storage;
pub mod types;

pub use emitter::{NotificationEmitter, NotificationSink};
pub use storage::NotificationStorage;
pub use types::*;
