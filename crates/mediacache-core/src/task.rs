// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The background-task facility the cache delegates its reads to.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use thiserror::Error;

/// A unit of background work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Returned by [`TaskPool::spawn`] when the pool can no longer accept work.
#[derive(Debug, Error)]
#[error("task pool is shut down")]
pub struct TaskPoolError;

/// A general-purpose executor for background work.
///
/// The cache never blocks on a spawned task. It only observes the task's
/// effects through the shared state the task writes before finishing.
pub trait TaskPool: Send + Sync {
    /// Schedules `task` for execution.
    fn spawn(&self, task: Task) -> Result<(), TaskPoolError>;
}

/// A cooperative cancellation signal shared by every task of one load group.
///
/// Cloning a flag yields another view of the same signal. Tasks check it at
/// their natural suspension points; nothing is ever interrupted preemptively.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates a new, un-cancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every holder of this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](CancellationFlag::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
