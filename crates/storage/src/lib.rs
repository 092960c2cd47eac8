// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-storage: durable job records behind short-lived transactional sessions.
//!
//! Every mutation is load → mutate → commit inside one
//! [`JobStore::with_session`] call. There is no identity map; callers hold
//! plain [`JobRecord`](pulse_core::JobRecord) values between sessions.

mod error;
mod memory;
mod order;
mod session;
mod sqlite;

pub use error::StoreError;
pub use memory::{MemoryStore, StoreOp, StoreStats};
pub use order::recency_order;
pub use session::{JobStore, StoreSession};
pub use sqlite::{SqliteStore, SCHEMA_VERSION};
