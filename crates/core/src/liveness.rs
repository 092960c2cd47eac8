// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness heuristics derived from a record snapshot and the current time.
//!
//! Nothing here performs I/O. A record counts as alive only while it is
//! RUNNING and its last heartbeat is younger than `heartrate * grace`.
//! This is how any observer detects a zombie without waiting for a terminal
//! state to be written.

use crate::job::{JobRecord, JobState};
use std::time::Duration;

/// Tolerance applied to `heartrate` before a heartbeat counts as stale.
///
/// Operators reason about staleness in these units; keep the value stable.
pub const DEFAULT_GRACE_MULTIPLIER: f64 = 2.1;

/// Liveness with [`DEFAULT_GRACE_MULTIPLIER`].
pub fn is_alive(record: &JobRecord, now_ms: u64) -> bool {
    is_alive_with_grace(record, now_ms, DEFAULT_GRACE_MULTIPLIER)
}

pub fn is_alive_with_grace(record: &JobRecord, now_ms: u64, grace_multiplier: f64) -> bool {
    record.state == JobState::Running
        && record.heartbeat_age(now_ms).as_secs_f64()
            < record.heartrate.as_secs_f64() * grace_multiplier
}

/// Seconds until the next heartbeat is due. Negative when overdue.
pub fn heartbeat_remaining(record: &JobRecord, now_ms: u64) -> f64 {
    record.heartrate.as_secs_f64() - record.heartbeat_age(now_ms).as_secs_f64()
}

/// How long to sleep so the next heartbeat lands `heartrate` after the last one.
pub fn pacing_delay(record: &JobRecord, now_ms: u64) -> Duration {
    record.heartrate.saturating_sub(record.heartbeat_age(now_ms))
}

#[cfg(test)]
#[path = "liveness_tests.rs"]
mod tests;
