// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::{JobId, JobType};
use pulse_storage::StoreError;
use thiserror::Error;

/// Errors and stop signals crossing the `execute()` boundary.
///
/// `Killed` and `Shutdown` are signals rather than failures: a variant's
/// work returns them (usually by propagating a heartbeat result with `?`)
/// and the runner decides what gets recorded.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job was told to stop through its stored record.
    #[error("job was killed")]
    Killed,
    /// Cooperative shutdown, recorded as SUCCESS.
    #[error("shutdown requested")]
    Shutdown,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("work failed: {0}")]
    Work(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("execute panicked: {0}")]
    Panicked(String),
    #[error("job {0} has already been started")]
    AlreadyStarted(JobId),
    #[error("variant runs {found} jobs but the job is a {expected}")]
    WrongVariant { expected: JobType, found: JobType },
}

impl JobError {
    /// Wrap a failure from a variant's own work.
    pub fn work(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        JobError::Work(err.into())
    }

    /// True for the stop signals, false for real failures.
    pub fn is_signal(&self) -> bool {
        matches!(self, JobError::Killed | JobError::Shutdown)
    }
}
