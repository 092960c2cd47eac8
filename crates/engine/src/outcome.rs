// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::JobError;
use pulse_core::{JobRecord, JobState};

/// What a `run()` that did not fail hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct Finished<T> {
    /// The record as finalized in the store.
    pub record: JobRecord,
    /// The work's return value. `None` after a graceful shutdown.
    pub output: Option<T>,
}

/// How a run's `execute()` ended.
#[derive(Debug)]
pub enum Outcome {
    Success,
    Shutdown,
    Failed(JobError),
    Killed,
}

impl Outcome {
    pub fn from_result(result: Result<(), JobError>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(JobError::Shutdown) => Outcome::Shutdown,
            Err(JobError::Killed) => Outcome::Killed,
            Err(err) => Outcome::Failed(err),
        }
    }

    /// State written at finalization. A graceful shutdown is not a failure.
    pub fn final_state(&self) -> JobState {
        match self {
            Outcome::Success | Outcome::Shutdown => JobState::Success,
            Outcome::Failed(_) | Outcome::Killed => JobState::Failed,
        }
    }

    /// What the caller of `run()` observes.
    pub fn into_result(self) -> Result<(), JobError> {
        match self {
            Outcome::Success | Outcome::Shutdown => Ok(()),
            Outcome::Failed(err) => Err(err),
            Outcome::Killed => Err(JobError::Killed),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => f.write_str("success"),
            Outcome::Shutdown => f.write_str("shutdown"),
            Outcome::Failed(err) => write!(f, "failed: {err}"),
            Outcome::Killed => f.write_str("killed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_storage::StoreError;

    #[yare::parameterized(
        ok = { Ok(()), JobState::Success },
        shutdown = { Err(JobError::Shutdown), JobState::Success },
        killed = { Err(JobError::Killed), JobState::Failed },
        work = { Err(JobError::work("boom")), JobState::Failed },
        store = { Err(JobError::Store(StoreError::Unavailable("down".into()))), JobState::Failed },
        panicked = { Err(JobError::Panicked("oops".into())), JobState::Failed },
    )]
    fn final_state_follows_the_result(result: Result<(), JobError>, expected: JobState) {
        assert_eq!(Outcome::from_result(result).final_state(), expected);
    }

    #[test]
    fn shutdown_is_not_reraised() {
        assert!(Outcome::from_result(Err(JobError::Shutdown)).into_result().is_ok());
    }

    #[test]
    fn failure_is_reraised_unchanged() {
        let err = Outcome::from_result(Err(JobError::work("disk full"))).into_result().unwrap_err();
        assert_eq!(err.to_string(), "work failed: disk full");
    }

    #[test]
    fn killed_is_reraised_as_signal() {
        let err = Outcome::Killed.into_result().unwrap_err();
        assert!(matches!(err, JobError::Killed));
        assert!(err.is_signal());
    }
}
