// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration specs

use crate::prelude::*;

#[test]
fn settings_file_drives_job_metadata() {
    let db = Db::new();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pulse.toml");
    std::fs::write(
        &path,
        r#"
[core]
executor = "LocalExecutor"

[scheduler]
job_heartbeat_sec = 0.05
max_tis_per_query = 64
"#,
    )
    .unwrap();

    let settings = JobSettings::from_file(&path).unwrap();
    let mut job = Job::builder(JobType::Scheduler, db.handle()).settings(settings).build().unwrap();
    assert_eq!(job.settings().max_tis_per_query, 64);

    job.run(&mut Beater::times(JobType::Scheduler, 1)).unwrap();

    let stored = load(&db, job.id());
    assert_eq!(stored.executor_class, "LocalExecutor");
    assert_eq!(stored.heartrate, Duration::from_millis(50));
}
