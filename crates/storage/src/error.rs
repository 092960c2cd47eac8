// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::{JobId, TransitionError};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Storage failures.
///
/// [`StoreError::is_transient`] separates operational blips (the store is
/// unreachable or contended, a retry may succeed) from programming and
/// integrity errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("database busy: {0}")]
    Busy(#[source] rusqlite::Error),
    #[error("sqlite: {0}")]
    Sqlite(#[source] rusqlite::Error),
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job {0} already exists")]
    Duplicate(JobId),
    #[error("rejected write to job {id}: {source}")]
    Transition {
        id: JobId,
        #[source]
        source: TransitionError,
    },
    #[error("corrupt row for job {id}: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("unsupported schema version {found:?}, expected {expected}")]
    SchemaVersion { found: String, expected: &'static str },
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Busy(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::CannotOpen
                | ErrorCode::DiskFull
                | ErrorCode::OutOfMemory,
            ) => StoreError::Busy(err),
            _ => StoreError::Sqlite(err),
        }
    }
}
