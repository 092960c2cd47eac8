// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store. Clones share one table, so each clone stands in for a
//! separate process attached to the same database.

use crate::{recency_order, JobStore, StoreError, StoreSession};
use parking_lot::Mutex;
use pulse_core::{check_transition, JobId, JobRecord, JobState, JobType};
use std::collections::HashMap;
use std::sync::Arc;

/// Store operations, used to target injected faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Load,
    Insert,
    Merge,
    Query,
    Commit,
}

pulse_core::simple_display! {
    StoreOp {
        Load => "load",
        Insert => "insert",
        Merge => "merge",
        Query => "query",
        Commit => "commit",
    }
}

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub sessions: u64,
    pub loads: u64,
    pub commits: u64,
    /// Rows written by committed sessions
    pub rows_written: u64,
}

#[derive(Debug, Default)]
struct Shared {
    rows: HashMap<JobId, JobRecord>,
    faults: HashMap<StoreOp, u32>,
    stats: StoreStats,
}

impl Shared {
    fn trip(&mut self, op: StoreOp) -> Result<(), StoreError> {
        match self.faults.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(StoreError::Unavailable(format!("injected {op} failure")))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed copy of a record, read outside any session.
    pub fn snapshot(&self, id: &JobId) -> Option<JobRecord> {
        self.shared.lock().rows.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        self.shared.lock().stats
    }

    /// Make the next `times` calls of `op` fail with a transient error.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next(&self, op: StoreOp, times: u32) {
        *self.shared.lock().faults.entry(op).or_insert(0) += times;
    }

    /// Write a row directly, bypassing sessions and transition checks.
    #[cfg(any(test, feature = "test-support"))]
    pub fn put(&self, record: JobRecord) {
        self.shared.lock().rows.insert(record.id.clone(), record);
    }
}

struct MemorySession<'a> {
    shared: &'a mut Shared,
    staged: HashMap<JobId, JobRecord>,
}

impl MemorySession<'_> {
    fn current(&self, id: &JobId) -> Option<&JobRecord> {
        self.staged.get(id).or_else(|| self.shared.rows.get(id))
    }

    fn visible(&self) -> impl Iterator<Item = &JobRecord> {
        let committed = self.shared.rows.values().filter(|r| !self.staged.contains_key(&r.id));
        committed.chain(self.staged.values())
    }
}

impl StoreSession for MemorySession<'_> {
    fn load(&mut self, id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        self.shared.trip(StoreOp::Load)?;
        self.shared.stats.loads += 1;
        Ok(self.current(id).cloned())
    }

    fn insert(&mut self, record: &JobRecord) -> Result<(), StoreError> {
        self.shared.trip(StoreOp::Insert)?;
        if self.current(&record.id).is_some() {
            return Err(StoreError::Duplicate(record.id.clone()));
        }
        self.staged.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn merge(&mut self, record: &JobRecord) -> Result<(), StoreError> {
        self.shared.trip(StoreOp::Merge)?;
        if let Some(prev) = self.current(&record.id) {
            check_transition(prev, record)
                .map_err(|source| StoreError::Transition { id: record.id.clone(), source })?;
        }
        self.staged.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn most_recent_of_type(&mut self, job_type: JobType) -> Result<Option<JobRecord>, StoreError> {
        self.shared.trip(StoreOp::Query)?;
        Ok(self
            .visible()
            .filter(|r| r.job_type == job_type)
            .min_by(|a, b| recency_order(a, b))
            .cloned())
    }

    fn list_by_state(&mut self, state: JobState) -> Result<Vec<JobRecord>, StoreError> {
        self.shared.trip(StoreOp::Query)?;
        let mut rows: Vec<JobRecord> = self.visible().filter(|r| r.state == state).cloned().collect();
        rows.sort_by(|a, b| a.start_date_ms.cmp(&b.start_date_ms).then_with(|| a.id.cmp(&b.id)));
        Ok(rows)
    }
}

impl JobStore for MemoryStore {
    fn with_session<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreSession) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut shared = self.shared.lock();
        shared.stats.sessions += 1;
        let mut session = MemorySession { shared: &mut *shared, staged: HashMap::new() };
        let value = f(&mut session)?;
        let staged = session.staged;

        shared.trip(StoreOp::Commit)?;
        shared.stats.commits += 1;
        shared.stats.rows_written += staged.len() as u64;
        shared.rows.extend(staged);
        Ok(value)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
