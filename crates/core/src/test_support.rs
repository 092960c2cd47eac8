// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for job records and their state machine.
pub mod strategies {
    use crate::job::{JobId, JobRecord, JobState, JobType};
    use proptest::prelude::*;
    use std::time::Duration;

    pub fn arb_job_state() -> impl Strategy<Value = JobState> {
        proptest::sample::select(JobState::ALL.to_vec())
    }

    pub fn arb_terminal_state() -> impl Strategy<Value = JobState> {
        prop_oneof![Just(JobState::Success), Just(JobState::Failed), Just(JobState::Shutdown)]
    }

    pub fn arb_job_type() -> impl Strategy<Value = JobType> {
        proptest::sample::select(JobType::ALL.to_vec())
    }

    pub fn arb_job_record() -> impl Strategy<Value = JobRecord> {
        (
            arb_job_type(),
            arb_job_state(),
            0u64..10_000_000,
            0u64..10_000_000,
            proptest::option::of(0u64..10_000_000),
            1u64..600_000,
        )
            .prop_map(|(job_type, state, start, beat, end, heartrate_ms)| JobRecord {
                id: JobId::new(),
                job_type,
                state,
                dag_id: None,
                start_date_ms: start,
                end_date_ms: end,
                latest_heartbeat_ms: beat,
                heartrate: Duration::from_millis(heartrate_ms),
                executor_class: "SequentialExecutor".to_string(),
                hostname: "localhost".to_string(),
                unixname: "tester".to_string(),
            })
    }
}

use crate::job::{JobId, JobRecord, JobState, JobType};

/// A RUNNING record of `job_type` whose last heartbeat is `latest_heartbeat_ms`.
pub fn running_record(id: &str, job_type: JobType, latest_heartbeat_ms: u64) -> JobRecord {
    JobRecord::builder()
        .id(JobId::from(id))
        .job_type(job_type)
        .state(JobState::Running)
        .latest_heartbeat_ms(latest_heartbeat_ms)
        .build()
}

/// A record already finalized in `state` with the given heartbeat.
pub fn finished_record(id: &str, job_type: JobType, state: JobState, latest_heartbeat_ms: u64) -> JobRecord {
    JobRecord::builder()
        .id(JobId::from(id))
        .job_type(job_type)
        .state(state)
        .latest_heartbeat_ms(latest_heartbeat_ms)
        .end_date_ms(latest_heartbeat_ms)
        .build()
}
