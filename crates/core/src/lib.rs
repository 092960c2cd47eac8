// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-core: job records, liveness rules, and shared plumbing for the
//! pulse job supervision protocol.

pub mod macros;

pub mod clock;
pub mod host;
pub mod id;
pub mod job;
pub mod liveness;
pub mod metrics;
pub mod settings;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobRecordBuilder;
pub use job::{check_transition, JobId, JobRecord, JobState, JobType, TransitionError, UnknownTag};
pub use liveness::{is_alive, is_alive_with_grace, pacing_delay, DEFAULT_GRACE_MULTIPLIER};
pub use metrics::{counter_name, CountingMetrics, Metrics, MetricEvent, NoopMetrics};
pub use settings::{ConfigError, JobSettings};
