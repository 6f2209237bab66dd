//! Error types for the attendance and payroll engine.
//!
//! Every fallible operation in the crate returns [`EngineError`]. Callers that
//! need to branch on the failure use [`EngineError::kind`], which is stable
//! across releases, instead of the display text.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AttendanceEvent, WorkerId};

/// The main error type for the engine.
///
/// # Example
///
/// ```
/// use attendance_payroll::error::{EngineError, ErrorKind};
///
/// let error = EngineError::Validation {
///     field: "description".to_string(),
///     message: "must not be empty".to_string(),
/// };
/// assert_eq!(error.kind(), ErrorKind::Validation);
/// assert_eq!(error.to_string(), "Invalid field 'description': must not be empty");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input failed shape or range validation.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// The entry or exit for this day has already been recorded.
    #[error("{event} already marked for worker {worker_id} on {date}")]
    AlreadyMarked {
        /// The worker.
        worker_id: WorkerId,
        /// The attendance day.
        date: NaiveDate,
        /// Which event was repeated.
        event: AttendanceEvent,
    },

    /// An exit was attempted before any entry for the day.
    #[error("No entry marked for worker {worker_id} on {date}")]
    EntryMissing {
        /// The worker.
        worker_id: WorkerId,
        /// The attendance day.
        date: NaiveDate,
    },

    /// The day is completed and accepts no further transitions.
    #[error("Attendance record for worker {worker_id} on {date} is closed")]
    RecordClosed {
        /// The worker.
        worker_id: WorkerId,
        /// The attendance day.
        date: NaiveDate,
    },

    /// The exit timestamp precedes the entry timestamp.
    #[error("Exit time {exit_time} is earlier than entry time {entry_time}")]
    InvalidTimeRange {
        /// The recorded entry.
        entry_time: NaiveDateTime,
        /// The rejected exit.
        exit_time: NaiveDateTime,
    },

    /// A lookup found nothing.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// The kind of entity looked up (e.g. "worker").
        entity: String,
        /// The key that was used.
        key: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The storage collaborator failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

/// Stable, machine-readable classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input shape or range.
    Validation,
    /// Repeated entry.
    AlreadyMarked,
    /// Exit without entry.
    EntryMissing,
    /// Transition on a completed day.
    RecordClosed,
    /// Exit before entry.
    InvalidTimeRange,
    /// Unknown worker, record or payment.
    NotFound,
    /// Missing or malformed configuration.
    Config,
    /// Storage failure.
    Storage,
}

impl ErrorKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::AlreadyMarked => "already_marked",
            ErrorKind::EntryMissing => "entry_missing",
            ErrorKind::RecordClosed => "record_closed",
            ErrorKind::InvalidTimeRange => "invalid_time_range",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Config => "config",
            ErrorKind::Storage => "storage",
        }
    }
}

impl EngineError {
    /// Returns the stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Validation { .. } => ErrorKind::Validation,
            EngineError::AlreadyMarked { .. } => ErrorKind::AlreadyMarked,
            EngineError::EntryMissing { .. } => ErrorKind::EntryMissing,
            EngineError::RecordClosed { .. } => ErrorKind::RecordClosed,
            EngineError::InvalidTimeRange { .. } => ErrorKind::InvalidTimeRange,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::Config
            }
            EngineError::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &str, key: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub(crate) fn storage(message: impl Into<String>) -> Self {
        EngineError::Storage {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
