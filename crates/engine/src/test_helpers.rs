// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the engine's unit tests.

use crate::{HookError, Job, JobError, JobHooks, JobListener, JobVariant};
use parking_lot::Mutex;
use pulse_core::{CountingMetrics, FakeClock, JobRecord, JobSettings, JobState, JobType};
use pulse_storage::{MemoryStore, StoreError, StoreSession};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const T0: u64 = 10_000_000;
pub(crate) const HEARTRATE: Duration = Duration::from_secs(5);

pub(crate) type TestJob = Job<MemoryStore, FakeClock>;

/// Store, clock and metrics wired into every job it builds.
pub(crate) struct Harness {
    pub store: MemoryStore,
    pub clock: FakeClock,
    pub metrics: CountingMetrics,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        Self { store: MemoryStore::new(), clock: FakeClock::at(T0), metrics: CountingMetrics::new() }
    }

    pub fn settings() -> JobSettings {
        JobSettings { heartrate: HEARTRATE, ..JobSettings::default() }
    }

    /// A built job, not yet persisted.
    pub fn job(&self, job_type: JobType) -> TestJob {
        Job::builder(job_type, self.store.clone())
            .clock(self.clock.clone())
            .settings(Self::settings())
            .metrics(self.metrics.clone())
            .build()
            .unwrap()
    }

    /// A job whose RUNNING record is already stored, as if `run()` had
    /// started it.
    pub fn started(&self, job_type: JobType) -> TestJob {
        let mut job = self.job(job_type);
        job.record.state = JobState::Running;
        self.store.put(job.record.clone());
        job
    }

    pub fn stored(&self, job: &TestJob) -> JobRecord {
        self.store.snapshot(job.id()).unwrap()
    }

    /// Overwrite fields of the stored row, as another process would.
    pub fn edit_stored(&self, job: &TestJob, f: impl FnOnce(&mut JobRecord)) {
        let mut row = self.stored(job);
        f(&mut row);
        self.store.put(row);
    }
}

/// Route `tracing` output through the test harness. `RUST_LOG` filters it.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Hooks that count calls and fail on request.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub kills: u32,
    pub callbacks: u32,
    pub fail_kill: bool,
    pub panic_kill: bool,
    pub fail_callback: bool,
}

impl JobHooks for Recorder {
    fn on_kill(&mut self) -> Result<(), HookError> {
        self.kills += 1;
        if self.panic_kill {
            panic!("cleanup exploded");
        }
        if self.fail_kill {
            return Err("cleanup failed".into());
        }
        Ok(())
    }

    fn heartbeat_callback(&mut self, _session: &mut dyn StoreSession) -> Result<(), StoreError> {
        self.callbacks += 1;
        if self.fail_callback {
            return Err(StoreError::Unavailable("callback lost connection".to_string()));
        }
        Ok(())
    }
}

type Work = Box<dyn FnMut(&mut TestJob, &mut Recorder) -> Result<(), JobError>>;

/// A variant whose work is a closure.
pub(crate) struct Scripted {
    pub job_type: JobType,
    pub hooks: Recorder,
    work: Work,
}

impl Scripted {
    pub fn new(
        job_type: JobType,
        work: impl FnMut(&mut TestJob, &mut Recorder) -> Result<(), JobError> + 'static,
    ) -> Self {
        Self { job_type, hooks: Recorder::default(), work: Box::new(work) }
    }
}

impl JobHooks for Scripted {
    fn on_kill(&mut self) -> Result<(), HookError> {
        self.hooks.on_kill()
    }

    fn heartbeat_callback(&mut self, session: &mut dyn StoreSession) -> Result<(), StoreError> {
        self.hooks.heartbeat_callback(session)
    }
}

impl JobVariant<MemoryStore, FakeClock> for Scripted {
    type Output = ();

    fn job_type(&self) -> JobType {
        self.job_type
    }

    fn execute(&mut self, job: &mut TestJob) -> Result<(), JobError> {
        (self.work)(job, &mut self.hooks)
    }
}

/// Listener that remembers which callbacks fired, and with which state.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl JobListener for CallLog {
    fn on_starting(&self, record: &JobRecord) {
        self.calls.lock().push(format!("on_starting:{}", record.state));
    }

    fn before_stopping(&self, record: &JobRecord) {
        self.calls.lock().push(format!("before_stopping:{}", record.state));
    }
}
