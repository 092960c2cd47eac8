// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counter sink for lifecycle and heartbeat events.

use crate::job::JobType;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Fire-and-forget counter sink. Implementations must not block or fail.
pub trait Metrics: Send + Sync {
    fn incr(&self, name: &str);
}

/// Events counted per job type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricEvent {
    Start,
    End,
    HeartbeatFailure,
}

crate::simple_display! {
    MetricEvent {
        Start => "start",
        End => "end",
        HeartbeatFailure => "heartbeat_failure",
    }
}

/// Counter name for an event, e.g. `scheduler_job_heartbeat_failure`.
pub fn counter_name(job_type: JobType, event: MetricEvent) -> String {
    format!("{job_type}_{event}")
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn incr(&self, _name: &str) {}
}

/// In-process counters; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct CountingMetrics {
    counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl CountingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counts.lock().get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts.lock().clone()
    }
}

impl Metrics for CountingMetrics {
    fn incr(&self, name: &str) {
        *self.counts.lock().entry(name.to_string()).or_insert(0) += 1;
    }
}
