// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::StoreError;
use pulse_core::{JobId, JobRecord, JobState, JobType};
use std::sync::Arc;

/// One open transaction against the job table.
///
/// Writes become visible to other sessions only when the enclosing
/// [`JobStore::with_session`] call commits.
pub trait StoreSession {
    fn load(&mut self, id: &JobId) -> Result<Option<JobRecord>, StoreError>;

    /// Persist a record that does not exist yet.
    fn insert(&mut self, record: &JobRecord) -> Result<(), StoreError>;

    /// Upsert a detached record. Rejects writes that break the record
    /// invariants (see [`pulse_core::check_transition`]).
    fn merge(&mut self, record: &JobRecord) -> Result<(), StoreError>;

    /// The record of `job_type` most likely to be the live one: RUNNING
    /// rows first, then by latest heartbeat, newest first.
    fn most_recent_of_type(&mut self, job_type: JobType) -> Result<Option<JobRecord>, StoreError>;

    /// All records currently in `state`, oldest start first.
    fn list_by_state(&mut self, state: JobState) -> Result<Vec<JobRecord>, StoreError>;
}

impl dyn StoreSession + '_ {
    /// Load a record that must exist.
    pub fn get(&mut self, id: &JobId) -> Result<JobRecord, StoreError> {
        self.load(id)?.ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

/// A handle to durable job storage.
///
/// Cloned or shared handles may be used from different threads; each behaves
/// like an independent process talking to the same database.
pub trait JobStore: Send + Sync {
    /// Run `f` inside a transaction. Commits when `f` returns `Ok`, rolls
    /// back when it returns `Err`. A commit failure is returned as `Err`.
    fn with_session<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
        E: From<StoreError>;
}

impl<S: JobStore> JobStore for Arc<S> {
    fn with_session<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).with_session(f)
    }
}

impl<S: JobStore> JobStore for &S {
    fn with_session<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).with_session(f)
    }
}
