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

use mediacache_core::task::{Task, TaskPool, TaskPoolError};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
};

/// A pool that only runs tasks when the caller asks it to.
///
/// Tasks are queued on [`spawn`](TaskPool::spawn) and executed, on the
/// calling thread, by [`run_one`](Self::run_one) or
/// [`run_pending`](Self::run_pending). Useful on platforms without threads
/// and for stepping background work deterministically.
#[derive(Default)]
pub struct ManualTaskPool {
    queue: Mutex<VecDeque<Task>>,
    closed: AtomicBool,
}

impl ManualTaskPool {
    /// Creates an empty, open pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of queued tasks.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Runs the oldest queued task. Returns `false` if the queue was empty.
    pub fn run_one(&self) -> bool {
        // The lock is released before the task runs so it may spawn more.
        let task = self.lock().pop_front();
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Runs queued tasks until the queue is empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while self.run_one() {
            count += 1;
        }
        count
    }

    /// Drops every queued task without running it.
    pub fn discard_pending(&self) -> usize {
        let mut queue = self.lock();
        let count = queue.len();
        queue.clear();
        count
    }

    /// Rejects every later [`spawn`](TaskPool::spawn). Queued tasks stay.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Task>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskPool for ManualTaskPool {
    fn spawn(&self, task: Task) -> Result<(), TaskPoolError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TaskPoolError);
        }
        self.lock().push_back(task);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{atomic::AtomicUsize, Arc};

    #[test]
    fn tasks_run_in_spawn_order_on_demand() {
        let pool = ManualTaskPool::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = Arc::clone(&log);
            pool.spawn(Box::new(move || log.lock().unwrap().push(i)))
                .unwrap();
        }
        assert_eq!(pool.pending(), 3);
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(pool.run_pending(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert!(!pool.run_one());
    }

    #[test]
    fn discarded_tasks_never_run() {
        let pool = ManualTaskPool::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        pool.spawn(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        assert_eq!(pool.discard_pending(), 1);
        assert_eq!(pool.run_pending(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shutdown_rejects_new_tasks() {
        let pool = ManualTaskPool::new();
        pool.shutdown();
        assert!(pool.spawn(Box::new(|| {})).is_err());
    }
}
