// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// The executor a job hands its work to. Only its name is recorded.
pub trait Executor: Send + Sync {
    fn name(&self) -> &str;
}

/// An executor known only by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExecutor(String);

impl NamedExecutor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Executor for NamedExecutor {
    fn name(&self) -> &str {
        &self.0
    }
}
