// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::{JobRecord, JobState};
use std::cmp::Ordering;

/// Ordering behind "most recent job of type X".
///
/// RUNNING records sort before all others so a live instance is found
/// even when a stale finished row carries a newer heartbeat. Within each
/// group, newest heartbeat first; ties fall back to id for determinism.
pub fn recency_order(a: &JobRecord, b: &JobRecord) -> Ordering {
    let rank = |r: &JobRecord| if r.state == JobState::Running { 0 } else { 1 };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| b.latest_heartbeat_ms.cmp(&a.latest_heartbeat_ms))
        .then_with(|| a.id.cmp(&b.id))
}
