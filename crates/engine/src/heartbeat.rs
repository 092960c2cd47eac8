// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat protocol: reload, check for a stop request, pace, then write.

use crate::{Job, JobError, JobHooks};
use pulse_core::{counter_name, pacing_delay, Clock, JobRecord, MetricEvent};
use pulse_storage::{JobStore, StoreSession};
use std::time::Duration;

impl<S: JobStore, C: Clock> Job<S, C> {
    /// Prove liveness to the store.
    ///
    /// With `only_if_necessary`, returns at once without touching the store
    /// while the last heartbeat is younger than the heartrate.
    ///
    /// Otherwise reloads the stored row. If another process has asked the
    /// job to stop, the kill is recorded and `Err(JobError::Killed)` is
    /// returned; `execute()` must propagate it. If not, sleeps out the rest
    /// of the heartrate and commits a new heartbeat together with
    /// [`JobHooks::heartbeat_callback`].
    ///
    /// Transient store failures are absorbed: the in-memory heartbeat goes
    /// back to its value before the call and `<job_type>_heartbeat_failure`
    /// is incremented. Other store errors are returned.
    pub fn heartbeat(&mut self, hooks: &mut dyn JobHooks, only_if_necessary: bool) -> Result<(), JobError> {
        if only_if_necessary && pacing_delay(&self.record, self.clock.epoch_ms()) > Duration::ZERO {
            return Ok(());
        }

        let previous = self.record.latest_heartbeat_ms;
        match self.beat(hooks) {
            Err(JobError::Store(err)) if err.is_transient() => {
                self.record.latest_heartbeat_ms = previous;
                self.metrics.incr(&counter_name(self.record.job_type, MetricEvent::HeartbeatFailure));
                tracing::warn!(
                    job_id = %self.record.id,
                    job_type = %self.record.job_type,
                    error = %err,
                    "heartbeat failed, retrying on next beat"
                );
                Ok(())
            }
            result => result,
        }
    }

    fn beat(&mut self, hooks: &mut dyn JobHooks) -> Result<(), JobError> {
        let stored = self.store.with_session(|session| session.get(&self.record.id))?;
        self.adopt(&stored);

        if self.record.state.is_terminating() || self.record.state.is_terminal() {
            tracing::info!(job_id = %self.record.id, state = %self.record.state, "stop requested through store");
            return Err(self.kill_switch().kill(hooks));
        }

        // Pace against the reloaded heartbeat, not the one we held before.
        let delay = pacing_delay(&self.record, self.clock.epoch_ms());
        self.clock.sleep(delay);

        let id = &self.record.id;
        let clock = &self.clock;
        let beat_ms = self.store.with_session(|session| -> Result<u64, JobError> {
            let mut row = session.get(id)?;
            row.latest_heartbeat_ms = row.latest_heartbeat_ms.max(clock.epoch_ms());
            session.merge(&row)?;
            hooks.heartbeat_callback(session)?;
            Ok(row.latest_heartbeat_ms)
        })?;

        self.record.latest_heartbeat_ms = beat_ms;
        tracing::debug!(job_id = %self.record.id, latest_heartbeat_ms = beat_ms, "heartbeat");
        Ok(())
    }

    /// Take the fields other processes may have changed.
    fn adopt(&mut self, stored: &JobRecord) {
        self.record.state = stored.state;
        self.record.end_date_ms = stored.end_date_ms;
        self.record.latest_heartbeat_ms = self.record.latest_heartbeat_ms.max(stored.latest_heartbeat_ms);
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
