// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{Executor, JobListener, KillSwitch, Listeners};
use pulse_core::{
    host, is_alive_with_grace, Clock, ConfigError, JobId, JobRecord, JobSettings, JobState, JobType,
    Metrics, NoopMetrics, SystemClock, DEFAULT_GRACE_MULTIPLIER,
};
use pulse_storage::JobStore;
use std::sync::Arc;
use std::time::Duration;

/// One supervised run: the in-memory copy of its record plus everything
/// needed to persist it.
///
/// The record is detached. Nothing is written unless [`Job::run`],
/// [`Job::heartbeat`], or a [`KillSwitch`] writes it.
pub struct Job<S, C = SystemClock> {
    pub(crate) record: JobRecord,
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) settings: JobSettings,
    pub(crate) executor: Option<Arc<dyn Executor>>,
    pub(crate) metrics: Arc<dyn Metrics>,
    pub(crate) listeners: Listeners,
}

impl<S: JobStore> Job<S> {
    pub fn builder(job_type: JobType, store: S) -> JobBuilder<S> {
        JobBuilder {
            job_type,
            store,
            clock: SystemClock,
            settings: None,
            heartrate: None,
            dag_id: None,
            executor: None,
            metrics: None,
            listeners: Listeners::new(),
        }
    }
}

impl<S: JobStore, C: Clock> Job<S, C> {
    pub fn id(&self) -> &JobId {
        &self.record.id
    }

    pub fn job_type(&self) -> JobType {
        self.record.job_type
    }

    /// State as last seen by this process.
    pub fn state(&self) -> JobState {
        self.record.state
    }

    pub fn heartrate(&self) -> Duration {
        self.record.heartrate
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub fn executor(&self) -> Option<&dyn Executor> {
        self.executor.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Liveness of the in-memory copy, judged at the job's clock.
    pub fn is_alive(&self) -> bool {
        self.is_alive_with_grace(DEFAULT_GRACE_MULTIPLIER)
    }

    pub fn is_alive_with_grace(&self, grace_multiplier: f64) -> bool {
        is_alive_with_grace(&self.record, self.clock.epoch_ms(), grace_multiplier)
    }

    /// A kill switch for this job sharing the job's store and clock.
    pub fn kill_switch(&self) -> KillSwitch<&S, C> {
        KillSwitch::new(&self.store, self.clock.clone(), self.record.id.clone())
    }
}

/// Builder for [`Job`]. Settings are resolved once, in [`JobBuilder::build`].
pub struct JobBuilder<S, C = SystemClock> {
    job_type: JobType,
    store: S,
    clock: C,
    settings: Option<JobSettings>,
    heartrate: Option<Duration>,
    dag_id: Option<String>,
    executor: Option<Arc<dyn Executor>>,
    metrics: Option<Arc<dyn Metrics>>,
    listeners: Listeners,
}

impl<S: JobStore, C: Clock> JobBuilder<S, C> {
    pub fn clock<C2: Clock>(self, clock: C2) -> JobBuilder<S, C2> {
        JobBuilder {
            job_type: self.job_type,
            store: self.store,
            clock,
            settings: self.settings,
            heartrate: self.heartrate,
            dag_id: self.dag_id,
            executor: self.executor,
            metrics: self.metrics,
            listeners: self.listeners,
        }
    }

    pulse_core::setters! {
        set { listeners: Listeners }
        option {
            settings: JobSettings,
            heartrate: Duration,
            dag_id: String,
        }
    }

    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    pub fn metrics(mut self, metrics: impl Metrics + 'static) -> Self {
        self.metrics = Some(Arc::new(metrics));
        self
    }

    pub fn listener(mut self, listener: impl JobListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Resolve settings (loading them from the environment when none were
    /// given), fill in host metadata, and notify `on_starting` listeners.
    pub fn build(self) -> Result<Job<S, C>, ConfigError> {
        let settings = match self.settings {
            Some(settings) => settings,
            None => JobSettings::load(None)?,
        };
        let heartrate = self.heartrate.unwrap_or(settings.heartrate);
        let executor_class = match &self.executor {
            Some(executor) => executor.name().to_string(),
            None => settings.executor.clone(),
        };

        let mut record = JobRecord::new(self.job_type, heartrate, self.clock.epoch_ms());
        record.dag_id = self.dag_id;
        record.executor_class = executor_class;
        record.hostname = host::hostname();
        record.unixname = host::unixname();

        let job = Job {
            record,
            store: self.store,
            clock: self.clock,
            settings,
            executor: self.executor,
            metrics: self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics)),
            listeners: self.listeners,
        };
        tracing::debug!(
            job_id = %job.record.id,
            job_type = %job.record.job_type,
            heartrate_ms = heartrate.as_millis() as u64,
            "job created"
        );
        job.listeners.on_starting(&job.record);
        Ok(job)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
