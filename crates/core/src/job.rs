// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record, state machine, and the write rules every store enforces.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for one job run.
    ///
    /// Assigned when the job is constructed, before the record is first
    /// persisted, and never reused.
    pub struct JobId("job-");
}

/// Discriminator for the concrete job variant that owns a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "base_job")]
    Base,
    #[serde(rename = "scheduler_job")]
    Scheduler,
    #[serde(rename = "backfill_job")]
    Backfill,
    #[serde(rename = "local_task_job")]
    LocalTask,
    #[serde(rename = "triggerer_job")]
    Triggerer,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::Base,
        JobType::Scheduler,
        JobType::Backfill,
        JobType::LocalTask,
        JobType::Triggerer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Base => "base_job",
            JobType::Scheduler => "scheduler_job",
            JobType::Backfill => "backfill_job",
            JobType::LocalTask => "local_task_job",
            JobType::Triggerer => "triggerer_job",
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag read back from storage that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} tag: {tag:?}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub tag: String,
}

impl FromStr for JobType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag { kind: "job type", tag: s.to_string() })
    }
}

/// Lifecycle state of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Constructed or queued, not yet running
    #[default]
    Queued,
    Running,
    Success,
    Failed,
    /// Operator asked the job to stop so it can be started again
    Restarting,
    /// Operator asked the job to stop
    Shutdown,
}

impl JobState {
    pub const ALL: [JobState; 6] = [
        JobState::Queued,
        JobState::Running,
        JobState::Success,
        JobState::Failed,
        JobState::Restarting,
        JobState::Shutdown,
    ];

    /// No further transition is permitted once one of these is written.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failed | JobState::Shutdown)
    }

    /// States that tell the owning process to stop at its next heartbeat.
    pub fn is_terminating(&self) -> bool {
        matches!(self, JobState::Shutdown | JobState::Restarting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Success => "success",
            JobState::Failed => "failed",
            JobState::Restarting => "restarting",
            JobState::Shutdown => "shutdown",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobState {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownTag { kind: "job state", tag: s.to_string() })
    }
}

/// Durable representation of one job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub job_type: JobType,
    pub state: JobState,
    /// Higher-level unit of work this job executes, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag_id: Option<String>,
    pub start_date_ms: u64,
    /// Set once, when the run is finalized or killed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_ms: Option<u64>,
    pub latest_heartbeat_ms: u64,
    /// Target interval between heartbeats, also the staleness unit
    pub heartrate: Duration,
    pub executor_class: String,
    pub hostname: String,
    pub unixname: String,
}

impl JobRecord {
    /// Create an in-memory record that has not been persisted yet.
    pub fn new(job_type: JobType, heartrate: Duration, epoch_ms: u64) -> Self {
        Self {
            id: JobId::new(),
            job_type,
            state: JobState::Queued,
            dag_id: None,
            start_date_ms: epoch_ms,
            end_date_ms: None,
            latest_heartbeat_ms: epoch_ms,
            heartrate,
            executor_class: String::new(),
            hostname: String::new(),
            unixname: String::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Liveness with the default grace multiplier
    pub fn is_alive(&self, now_ms: u64) -> bool {
        crate::liveness::is_alive(self, now_ms)
    }

    /// Time since the last recorded heartbeat. Zero if the heartbeat is in the future.
    pub fn heartbeat_age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.latest_heartbeat_ms))
    }
}

/// A write that would break the record's invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{field} is write-once")]
    Immutable { field: &'static str },
    #[error("state {from} is terminal, cannot become {to}")]
    FromTerminal { from: JobState, to: JobState },
    #[error("running is only reachable from queued, not {from}")]
    NotFromQueued { from: JobState },
    #[error("end date already set to {existing}")]
    EndDateAlreadySet { existing: u64 },
    #[error("heartbeat would move backward from {current} to {proposed}")]
    HeartbeatRegressed { current: u64, proposed: u64 },
}

/// Validate replacing the stored `prev` with `next`.
///
/// Rewriting a row with identical values is always accepted.
pub fn check_transition(prev: &JobRecord, next: &JobRecord) -> Result<(), TransitionError> {
    if prev.id != next.id {
        return Err(TransitionError::Immutable { field: "id" });
    }
    if prev.job_type != next.job_type {
        return Err(TransitionError::Immutable { field: "job_type" });
    }
    if prev.start_date_ms != next.start_date_ms {
        return Err(TransitionError::Immutable { field: "start_date" });
    }
    if prev.executor_class != next.executor_class
        || prev.hostname != next.hostname
        || prev.unixname != next.unixname
    {
        return Err(TransitionError::Immutable { field: "host metadata" });
    }

    if prev.state != next.state {
        if prev.state.is_terminal() {
            return Err(TransitionError::FromTerminal { from: prev.state, to: next.state });
        }
        if next.state == JobState::Running && prev.state != JobState::Queued {
            return Err(TransitionError::NotFromQueued { from: prev.state });
        }
    }

    if let Some(existing) = prev.end_date_ms {
        if next.end_date_ms != Some(existing) {
            return Err(TransitionError::EndDateAlreadySet { existing });
        }
    }

    if next.latest_heartbeat_ms < prev.latest_heartbeat_ms {
        return Err(TransitionError::HeartbeatRegressed {
            current: prev.latest_heartbeat_ms,
            proposed: next.latest_heartbeat_ms,
        });
    }

    Ok(())
}

crate::builder! {
    pub struct JobRecordBuilder => JobRecord {
        into {
            id: JobId = "job-test-1",
            executor_class: String = "SequentialExecutor",
            hostname: String = "localhost",
            unixname: String = "tester",
        }
        set {
            job_type: JobType = JobType::Scheduler,
            state: JobState = JobState::Running,
            start_date_ms: u64 = 1_000_000,
            latest_heartbeat_ms: u64 = 1_000_000,
            heartrate: Duration = Duration::from_secs(5),
        }
        option {
            dag_id: String = None,
            end_date_ms: u64 = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
