// ABOUTME: User and client account records for OpsDesk
// ABOUTME: Provides the point lookups the visibility resolver and workflows depend on

pub mod clients;
pub mod types;
pub mod users;

pub use clients::ClientStorage;
pub use types::{Client, ClientCreateInput, User, UserCreateInput};
pub use users::UserStorage;
