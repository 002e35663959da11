//! Error types for `ticket_desk`.
//!
//! [`TicketError`] is the single error type returned by storage, config and
//! command code. [`ErrorCode`] gives each failure a stable machine-readable
//! code and process exit status; [`StructuredError`] is the JSON envelope
//! written to stderr in `--json` mode.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TicketError>;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: i64 },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("No .tickets directory found (run `tkt init` first)")]
    NotInitialized,

    #[error("Attachment source not found: {}", path.display())]
    UploadSourceMissing { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TicketError {
    /// Build a validation error for a named field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TicketNotFound { .. } => ErrorCode::TicketNotFound,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::UploadSourceMissing { .. } => ErrorCode::UploadSourceMissing,
            Self::Config(_) | Self::Yaml(_) => ErrorCode::ConfigError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TicketNotFound { .. })
    }

    /// Store-level failures may succeed on retry; not-found and validation never do.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            Self::TicketNotFound { .. } => Some("Run `tkt list` to see existing ticket ids".to_string()),
            Self::NotInitialized => Some("Run `tkt init` in the project root".to_string()),
            Self::Validation { field, .. } => Some(format!("Check the value passed for {field}")),
            _ => None,
        }
    }
}

/// Stable error codes for machine consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TicketNotFound,
    ValidationFailed,
    NotInitialized,
    UploadSourceMissing,
    ConfigError,
    DatabaseError,
    IoError,
    SerializationError,
}

impl ErrorCode {
    /// Process exit status for this error class.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ValidationFailed | Self::UploadSourceMissing => 2,
            Self::TicketNotFound => 3,
            _ => 1,
        }
    }
}

/// JSON error envelope: `{"error": {...}}`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    pub error: StructuredErrorBody,
}

#[derive(Debug, Serialize)]
pub struct StructuredErrorBody {
    pub code: ErrorCode,
    pub message: String,
    pub hint: Option<String>,
    pub retryable: bool,
}

impl From<&TicketError> for StructuredError {
    fn from(err: &TicketError) -> Self {
        Self {
            error: StructuredErrorBody {
                code: err.code(),
                message: err.to_string(),
                hint: err.hint(),
                retryable: err.is_retryable(),
            },
        }
    }
}
