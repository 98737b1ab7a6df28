// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across OpsDesk

// Server
pub const OPSDESK_API_HOST: &str = "OPSDESK_API_HOST";
pub const OPSDESK_API_PORT: &str = "OPSDESK_API_PORT";
pub const PORT: &str = "PORT"; // Legacy

// CORS
pub const OPSDESK_CORS_ORIGIN: &str = "OPSDESK_CORS_ORIGIN";

// Database
pub const OPSDESK_DATABASE_PATH: &str = "OPSDESK_DATABASE_PATH";
pub const OPSDESK_DB_MAX_CONNECTIONS: &str = "OPSDESK_DB_MAX_CONNECTIONS";
pub const OPSDESK_DB_BUSY_TIMEOUT_SECS: &str = "OPSDESK_DB_BUSY_TIMEOUT_SECS";

// Logging
pub const OPSDESK_LOG: &str = "OPSDESK_LOG";
pub const RUST_LOG: &str = "RUST_LOG";

// System
pub const HOME: &str = "HOME";
