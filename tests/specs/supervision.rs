// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervision specs
//!
//! Jobs running on their own threads, each with its own store handle,
//! coordinated only through the database.

use crate::prelude::*;
use std::thread;

fn alive(db: &Db, job_type: JobType) -> bool {
    find_alive_of_type(&db.handle(), &SystemClock, job_type).unwrap().is_some()
}

#[test]
fn operator_shutdown_stops_a_running_job() {
    let db = Db::new();
    let mut job = fast_job(JobType::Scheduler, db.handle());
    let id = job.id().clone();
    let worker = thread::spawn(move || {
        let result = job.run(&mut Beater::forever(JobType::Scheduler));
        (result, job)
    });

    assert!(wait_for(SPEC_WAIT_MAX_MS, || alive(&db, JobType::Scheduler)));
    let operator = KillSwitch::new(db.handle(), SystemClock, id.clone());
    assert!(operator.request_shutdown().unwrap());

    let (result, job) = worker.join().unwrap();
    assert!(matches!(result, Err(JobError::Killed)));
    assert_eq!(job.state(), JobState::Shutdown);

    let stored = load(&db, &id);
    assert_eq!(stored.state, JobState::Shutdown);
    assert!(stored.end_date_ms.is_some());
    assert!(!alive(&db, JobType::Scheduler));
}

#[test]
fn jobs_of_different_types_coexist() {
    let db = Db::new();
    let mut ids = Vec::new();
    let mut workers = Vec::new();
    for job_type in [JobType::Scheduler, JobType::Triggerer] {
        let mut job = fast_job(job_type, db.handle());
        ids.push(job.id().clone());
        workers.push(thread::spawn(move || job.run(&mut Beater::forever(job_type))));
    }

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        alive(&db, JobType::Scheduler) && alive(&db, JobType::Triggerer)
    }));
    assert!(!alive(&db, JobType::Backfill));

    for id in &ids {
        KillSwitch::new(db.handle(), SystemClock, id.clone()).request_shutdown().unwrap();
    }
    for worker in workers {
        assert!(matches!(worker.join().unwrap(), Err(JobError::Killed)));
    }
    for id in &ids {
        assert_eq!(load(&db, id).state, JobState::Shutdown);
    }
}

#[test]
fn live_instance_is_found_ahead_of_newer_finished_rows() {
    let db = Db::new();
    let mut live = fast_job(JobType::Scheduler, db.handle());
    let live_id = live.id().clone();
    let worker = thread::spawn(move || live.run(&mut Beater::forever(JobType::Scheduler)));
    assert!(wait_for(SPEC_WAIT_MAX_MS, || alive(&db, JobType::Scheduler)));

    // a short run that finishes after the live one was last seen beating
    let mut short = fast_job(JobType::Scheduler, db.handle());
    short.run(&mut Beater::times(JobType::Scheduler, 1)).unwrap();

    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        let found = find_alive_of_type(&db.handle(), &SystemClock, JobType::Scheduler).unwrap();
        found.map(|r| r.id).as_ref() == Some(&live_id)
    }));

    KillSwitch::new(db.handle(), SystemClock, live_id).request_shutdown().unwrap();
    assert!(worker.join().unwrap().is_err());
}

#[test]
fn crashed_job_is_detected_by_staleness() {
    let db = Db::new();
    let store = db.handle();
    let stale_ms = SystemClock.epoch_ms() - 60_000;
    let mut zombie = JobRecord::new(JobType::LocalTask, FAST_HEARTRATE, stale_ms);
    zombie.state = JobState::Running;
    store.with_session(|s| s.insert(&zombie)).unwrap();

    assert!(!alive(&db, JobType::LocalTask));
    let recent = most_recent_of_type(&db.handle(), JobType::LocalTask).unwrap().unwrap();
    assert_eq!(recent.state, JobState::Running);
    assert_eq!(recent.end_date_ms, None);
}

#[test]
fn external_kill_marks_end_date_without_stopping_work() {
    let db = Db::new();
    let mut job = fast_job(JobType::Scheduler, db.handle());
    let id = job.id().clone();
    let worker = thread::spawn(move || job.run(&mut Beater::times(JobType::Scheduler, 4)));
    assert!(wait_for(SPEC_WAIT_MAX_MS, || alive(&db, JobType::Scheduler)));

    struct Cleanup;
    impl JobHooks for Cleanup {
        fn on_kill(&mut self) -> Result<(), pulse_engine::HookError> {
            Err("nothing to clean".into())
        }
    }
    let signal = KillSwitch::new(db.handle(), SystemClock, id.clone()).kill(&mut Cleanup);
    assert!(matches!(signal, JobError::Killed));
    let killed_at = load(&db, &id).end_date_ms.unwrap();

    let record = worker.join().unwrap().unwrap().record;
    assert_eq!(record.state, JobState::Success);
    assert_eq!(record.end_date_ms, Some(killed_at));
}

#[test]
fn cleanup_hook_can_read_the_kill_from_another_handle() {
    struct ReadsBack {
        store: Arc<SqliteStore>,
        id: pulse_core::JobId,
        end_date_ms: Option<u64>,
    }
    impl JobHooks for ReadsBack {
        fn on_kill(&mut self) -> Result<(), pulse_engine::HookError> {
            let row = self
                .store
                .with_session(|s| -> Result<JobRecord, StoreError> { s.get(&self.id) })?;
            self.end_date_ms = row.end_date_ms;
            Ok(())
        }
    }

    let db = Db::new();
    let mut record = JobRecord::new(JobType::LocalTask, FAST_HEARTRATE, SystemClock.epoch_ms());
    record.state = JobState::Running;
    db.handle().with_session(|s| s.insert(&record)).unwrap();
    let mut hooks = ReadsBack { store: db.handle(), id: record.id.clone(), end_date_ms: None };

    let signal = KillSwitch::new(db.handle(), SystemClock, record.id.clone()).kill(&mut hooks);

    assert!(matches!(signal, JobError::Killed));
    assert!(hooks.end_date_ms.is_some());
    assert_eq!(load(&db, &record.id).end_date_ms, hooks.end_date_ms);
}
