// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run bracketing: one RUNNING insert, one terminal write.

use crate::kill::panic_message;
use crate::{Finished, Job, JobError, JobVariant, Outcome};
use pulse_core::{counter_name, Clock, JobRecord, JobState, MetricEvent};
use pulse_storage::{JobStore, StoreError, StoreSession};
use std::panic::{self, AssertUnwindSafe};

impl<S: JobStore, C: Clock> Job<S, C> {
    /// Persist the job as RUNNING, execute `variant`, and record the outcome.
    ///
    /// Finalization happens on every exit path, including a panic in
    /// `execute()` (resumed afterwards). A terminal state already in the
    /// store is kept; `end_date` is only written if unset.
    ///
    /// Returns the finalized record and the work's output on success or
    /// graceful shutdown, and the work's error (or [`JobError::Killed`])
    /// otherwise.
    pub fn run<V: JobVariant<S, C>>(&mut self, variant: &mut V) -> Result<Finished<V::Output>, JobError> {
        let job_type = self.record.job_type;
        if variant.job_type() != job_type {
            return Err(JobError::WrongVariant { expected: job_type, found: variant.job_type() });
        }
        if self.record.state != JobState::Queued {
            return Err(JobError::AlreadyStarted(self.record.id.clone()));
        }

        let mut started = self.record.clone();
        started.state = JobState::Running;
        self.store.with_session(|session| session.insert(&started))?;
        self.record = started;
        self.metrics.incr(&counter_name(job_type, MetricEvent::Start));
        tracing::info!(job_id = %self.record.id, job_type = %job_type, "job started");

        let (outcome, output, panicked) = match panic::catch_unwind(AssertUnwindSafe(|| variant.execute(self))) {
            Ok(Ok(output)) => (Outcome::Success, Some(output), None),
            Ok(Err(err)) => (Outcome::from_result(Err(err)), None, None),
            Err(payload) => {
                let message = panic_message(&*payload);
                (Outcome::Failed(JobError::Panicked(message)), None, Some(payload))
            }
        };

        self.listeners.before_stopping(&self.record);
        let finalized = self.finalize(outcome.final_state());
        self.metrics.incr(&counter_name(job_type, MetricEvent::End));

        if let Err(err) = &finalized {
            tracing::error!(job_id = %self.record.id, outcome = %outcome, error = %err, "failed to finalize job");
        }
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        match outcome.into_result() {
            Ok(()) => Ok(Finished { record: finalized?, output }),
            Err(err) => Err(err),
        }
    }

    fn finalize(&mut self, state: JobState) -> Result<JobRecord, StoreError> {
        let now = self.clock.epoch_ms();
        let id = &self.record.id;
        let record = self.store.with_session(|session| -> Result<JobRecord, StoreError> {
            let mut row = session.get(id)?;
            if !row.state.is_terminal() {
                row.state = state;
            }
            if row.end_date_ms.is_none() {
                row.end_date_ms = Some(now);
            }
            session.merge(&row)?;
            Ok(row)
        })?;

        self.record = record.clone();
        tracing::info!(job_id = %record.id, state = %record.state, "job finished");
        Ok(record)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
