// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-engine: runs supervised jobs against a [`JobStore`](pulse_storage::JobStore).
//!
//! A [`Job`] brackets a variant's work between a durable RUNNING record and
//! exactly one terminal write. While the work runs it calls
//! [`Job::heartbeat`], which refreshes the stored heartbeat and notices when
//! another process has asked the job to stop. [`KillSwitch`] is the stop path
//! any process holding the job id can use.

mod error;
mod executor;
mod heartbeat;
mod hooks;
mod job;
mod kill;
mod lookup;
mod outcome;
mod runner;

pub use error::JobError;
pub use executor::{Executor, NamedExecutor};
pub use hooks::{HookError, JobHooks, JobListener, JobVariant, Listeners, NoHooks};
pub use job::{Job, JobBuilder};
pub use kill::KillSwitch;
pub use lookup::{find_alive_of_type, most_recent_of_type};
pub use outcome::{Finished, Outcome};

#[cfg(test)]
mod test_helpers;
