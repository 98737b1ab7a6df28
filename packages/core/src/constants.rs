// ABOUTME: Filesystem locations used by OpsDesk
// ABOUTME: Resolves the data directory and the default database path

use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside the data directory
pub const DATABASE_FILE_NAME: &str = "opsdesk.db";

/// Get the path to the OpsDesk directory (~/.opsdesk)
pub fn opsdesk_dir() -> PathBuf {
    // HOME first so tests can redirect the data directory
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home).join(".opsdesk");
    }

    dirs::home_dir()
        .unwrap_or_else(env::temp_dir)
        .join(".opsdesk")
}

/// Get the default database path (~/.opsdesk/opsdesk.db)
pub fn default_database_path() -> PathBuf {
    opsdesk_dir().join(DATABASE_FILE_NAME)
}
