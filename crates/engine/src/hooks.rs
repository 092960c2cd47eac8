// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extension points around a job run.

use crate::{Job, JobError};
use pulse_core::{Clock, JobRecord, JobType};
use pulse_storage::{JobStore, StoreError, StoreSession};
use std::sync::Arc;

/// Error type returned from cleanup hooks. Always logged, never propagated.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Per-variant overrides called by the heartbeat and kill paths.
pub trait JobHooks {
    /// Cleanup when the job is killed. Runs after `end_date` is committed
    /// and outside any store session, so it may use the store. Errors and
    /// panics are logged and swallowed.
    fn on_kill(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    /// Bookkeeping committed atomically with each heartbeat write. Runs
    /// inside the heartbeat's session and must not open another one on the
    /// same store.
    fn heartbeat_callback(&mut self, _session: &mut dyn StoreSession) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl JobHooks for NoHooks {}

/// A concrete kind of job: its tag plus the work it performs.
///
/// `execute` is expected to call [`Job::heartbeat`] on its own cadence and
/// propagate the error it returns.
pub trait JobVariant<S: JobStore, C: Clock>: JobHooks {
    /// Value handed back by a run that completes its work, such as an exit
    /// code or the number of loops performed.
    type Output;

    fn job_type(&self) -> JobType;

    fn execute(&mut self, job: &mut Job<S, C>) -> Result<Self::Output, JobError>;
}

/// Observer notified when a job is built and just before it finalizes.
pub trait JobListener: Send + Sync {
    fn on_starting(&self, _record: &JobRecord) {}

    fn before_stopping(&self, _record: &JobRecord) {}
}

/// Registered listeners, called in registration order.
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Vec<Arc<dyn JobListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: Arc<dyn JobListener>) -> Self {
        self.inner.push(listener);
        self
    }

    pub fn push(&mut self, listener: Arc<dyn JobListener>) {
        self.inner.push(listener);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn on_starting(&self, record: &JobRecord) {
        for listener in &self.inner {
            listener.on_starting(record);
        }
    }

    pub(crate) fn before_stopping(&self, record: &JobRecord) {
        for listener in &self.inner {
            listener.before_stopping(record);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.inner.len()).finish()
    }
}
