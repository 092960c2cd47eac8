// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::{is_alive, Clock, JobRecord, JobType};
use pulse_storage::{JobStore, StoreError, StoreSession};

/// The record of `job_type` most likely to be the live one.
pub fn most_recent_of_type(store: &impl JobStore, job_type: JobType) -> Result<Option<JobRecord>, StoreError> {
    store.with_session(|session| session.most_recent_of_type(job_type))
}

/// The live record of `job_type`, if one exists.
///
/// Used to answer "is an instance of this type already running" before
/// starting another.
pub fn find_alive_of_type(
    store: &impl JobStore,
    clock: &impl Clock,
    job_type: JobType,
) -> Result<Option<JobRecord>, StoreError> {
    let now = clock.epoch_ms();
    Ok(most_recent_of_type(store, job_type)?.filter(|record| is_alive(record, now)))
}
