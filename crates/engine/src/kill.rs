// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band termination through the stored record.

use crate::{JobError, JobHooks};
use pulse_core::{Clock, JobId, JobRecord, JobState};
use pulse_storage::{JobStore, StoreError, StoreSession};
use std::panic::{self, AssertUnwindSafe};

/// Stops a job by id. Usable from any process that can reach the store,
/// including the job's own.
#[derive(Debug, Clone)]
pub struct KillSwitch<S, C> {
    store: S,
    clock: C,
    id: JobId,
}

impl<S: JobStore, C: Clock> KillSwitch<S, C> {
    pub fn new(store: S, clock: C, id: JobId) -> Self {
        Self { store, clock, id }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Record the kill and return the termination signal.
    ///
    /// `end_date` is set (if not already) and committed before `on_kill`
    /// runs, and `on_kill` runs outside any store session. Its errors and
    /// panics are logged. The result is [`JobError::Killed`] unless the
    /// store write fails, in which case the store error is returned.
    pub fn kill(&self, hooks: &mut dyn JobHooks) -> JobError {
        let now = self.clock.epoch_ms();
        let result = self.store.with_session(|session| -> Result<JobRecord, StoreError> {
            let mut row = session.get(&self.id)?;
            if row.end_date_ms.is_none() {
                row.end_date_ms = Some(now);
                session.merge(&row)?;
            }
            Ok(row)
        });

        run_on_kill(&self.id, hooks);

        match result {
            Ok(row) => {
                tracing::info!(job_id = %self.id, state = %row.state, "job killed");
                JobError::Killed
            }
            Err(err) => {
                tracing::error!(job_id = %self.id, error = %err, "failed to record kill");
                JobError::Store(err)
            }
        }
    }

    /// Ask the owning process to stop by flipping the row to SHUTDOWN. It
    /// notices on its next heartbeat.
    ///
    /// Returns `false` if the row was already terminal.
    pub fn request_shutdown(&self) -> Result<bool, StoreError> {
        self.store.with_session(|session| -> Result<bool, StoreError> {
            let mut row = session.get(&self.id)?;
            if row.state.is_terminal() {
                return Ok(false);
            }
            let previous = row.state;
            row.state = JobState::Shutdown;
            session.merge(&row)?;
            tracing::info!(job_id = %self.id, from = %previous, "shutdown requested");
            Ok(true)
        })
    }
}

fn run_on_kill(id: &JobId, hooks: &mut dyn JobHooks) {
    match panic::catch_unwind(AssertUnwindSafe(|| hooks.on_kill())) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => tracing::warn!(job_id = %id, error = %err, "on_kill hook failed"),
        Err(payload) => {
            tracing::warn!(job_id = %id, panic = %panic_message(&*payload), "on_kill hook panicked")
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "kill_tests.rs"]
mod tests;
