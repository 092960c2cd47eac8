// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lifecycle specs
//!
//! A job on a real clock and a SQLite file, observed through other handles.

use crate::prelude::*;

#[test]
fn heartbeating_job_finishes_success() {
    let db = Db::new();
    let mut job = fast_job(JobType::Scheduler, db.handle());
    let mut work = Beater::times(JobType::Scheduler, 3);

    let finished = job.run(&mut work).unwrap();

    assert_eq!(finished.output, Some(3));
    let record = finished.record;
    assert_eq!(record.state, JobState::Success);
    let stored = load(&db, job.id());
    assert_eq!(stored, record);
    // paced beats land at least one heartrate apart
    assert!(stored.latest_heartbeat_ms >= stored.start_date_ms + 3 * FAST_HEARTRATE.as_millis() as u64);
    assert!(stored.end_date_ms.unwrap() >= stored.latest_heartbeat_ms);
}

#[test]
fn failing_job_is_recorded_and_reraised() {
    struct Broken;
    impl JobHooks for Broken {}
    impl<S: JobStore, C: Clock> JobVariant<S, C> for Broken {
        type Output = ();

        fn job_type(&self) -> JobType {
            JobType::Backfill
        }

        fn execute(&mut self, job: &mut Job<S, C>) -> Result<(), JobError> {
            job.heartbeat(self, true)?;
            Err(JobError::work("source table missing"))
        }
    }

    let db = Db::new();
    let mut job = fast_job(JobType::Backfill, db.handle());

    let err = job.run(&mut Broken).unwrap_err();

    assert!(matches!(err, JobError::Work(_)));
    let stored = load(&db, job.id());
    assert_eq!(stored.state, JobState::Failed);
    assert!(stored.end_date_ms.is_some());
}

#[test]
fn building_a_job_writes_nothing() {
    let db = Db::new();
    let _job = fast_job(JobType::Triggerer, db.handle());

    assert_eq!(most_recent_of_type(&db.handle(), JobType::Triggerer).unwrap(), None);
}

#[test]
fn finished_job_is_not_alive_but_still_most_recent() {
    let db = Db::new();
    let observer = db.handle();
    let mut job = fast_job(JobType::Scheduler, db.handle());
    job.run(&mut Beater::times(JobType::Scheduler, 1)).unwrap();

    let clock = SystemClock;
    assert_eq!(find_alive_of_type(&observer, &clock, JobType::Scheduler).unwrap(), None);
    let recent = most_recent_of_type(&observer, JobType::Scheduler).unwrap().unwrap();
    assert_eq!(&recent.id, job.id());
    assert_eq!(recent.state, JobState::Success);
}
