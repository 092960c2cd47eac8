// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for workspace specs.

pub use pulse_core::{Clock, JobRecord, JobSettings, JobState, JobType, SystemClock};
pub use pulse_engine::{
    find_alive_of_type, most_recent_of_type, Job, JobError, JobHooks, JobVariant, KillSwitch,
};
pub use pulse_storage::{JobStore, SqliteStore, StoreError, StoreSession};
pub use std::sync::Arc;
pub use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Upper bound for waiting on another thread's job.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Heartrate short enough that specs finish quickly on a real clock.
pub const FAST_HEARTRATE: Duration = Duration::from_millis(50);

/// A database file in a temp directory. Each [`Db::handle`] is an
/// independent connection, standing in for a separate process.
pub struct Db {
    dir: TempDir,
}

impl Db {
    pub fn new() -> Self {
        init_tracing();
        Self { dir: TempDir::new().unwrap() }
    }

    pub fn handle(&self) -> Arc<SqliteStore> {
        Arc::new(SqliteStore::open(self.dir.path().join("jobs.db")).unwrap())
    }
}

pub fn settings() -> JobSettings {
    JobSettings { heartrate: FAST_HEARTRATE, ..JobSettings::default() }
}

/// Build a job on a real clock with [`FAST_HEARTRATE`].
pub fn fast_job(job_type: JobType, store: Arc<SqliteStore>) -> Job<Arc<SqliteStore>> {
    Job::builder(job_type, store).settings(settings()).build().unwrap()
}

/// Poll `f` until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    f()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Work that only heartbeats: `limit` times, or until stopped.
pub struct Beater {
    pub job_type: JobType,
    pub limit: Option<u32>,
    pub beats: u32,
}

impl Beater {
    pub fn forever(job_type: JobType) -> Self {
        Self { job_type, limit: None, beats: 0 }
    }

    pub fn times(job_type: JobType, limit: u32) -> Self {
        Self { job_type, limit: Some(limit), beats: 0 }
    }
}

impl JobHooks for Beater {}

impl<S: JobStore, C: Clock> JobVariant<S, C> for Beater {
    type Output = u32;

    fn job_type(&self) -> JobType {
        self.job_type
    }

    fn execute(&mut self, job: &mut Job<S, C>) -> Result<u32, JobError> {
        while self.limit.map_or(true, |limit| self.beats < limit) {
            job.heartbeat(self, false)?;
            self.beats += 1;
        }
        Ok(self.beats)
    }
}

/// Read a record through a fresh handle.
pub fn load(db: &Db, id: &pulse_core::JobId) -> JobRecord {
    db.handle().with_session(|s| s.get(id)).unwrap()
}
