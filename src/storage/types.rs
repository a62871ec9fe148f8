use thiserror::Error;

use crate::board::{Category, Task};

// ============================================================================
// Error Types
// ============================================================================

/// Storage errors with user-friendly messages
#[derive(Debug, Error)]
pub enum StorageError {
    /// Another instance of the application has locked the database
    #[error("Another instance of taskboard appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// A stored slot could not be decoded
    #[error("Stored '{slot}' data is corrupt: {source}")]
    Corrupt {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage
    #[error("Failed to encode '{slot}' for storage: {source}")]
    Encode {
        slot: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StorageError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let message = err.to_string();

        // SQLITE_CANTOPEN (14) also shows up when another process holds the file.
        if is_lock_message(&message)
            || message.to_lowercase().contains("unable to open database file")
        {
            return StorageError::InstanceLocked;
        }

        StorageError::Other(err)
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), as reported in error text.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
}

// ============================================================================
// Loaded State
// ============================================================================

/// Everything read from storage at startup.
#[derive(Debug, Default)]
pub struct LoadedBoard {
    pub categories: Vec<Category>,
    pub tasks: Vec<Task>,
}
