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

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use mediacache_core::{
    task::{Task, TaskPool, TaskPoolError},
    CacheConfig,
};
use std::{
    panic::{self, AssertUnwindSafe},
    thread,
};

/// A fixed-size pool of OS threads fed through an unbounded channel.
///
/// Workers pull tasks until the pool is shut down; tasks already queued at
/// that point still run before the workers exit. A panicking task is logged
/// and does not take its worker down.
pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `threads` workers named `{name}-{index}`.
    pub fn new(threads: usize, name: &str) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded::<Task>();
        let workers = (0..threads.max(1))
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("{name}-{index}"))
                    .spawn(move || worker_loop(receiver))
                    .with_context(|| format!("Failed to spawn worker thread {name}-{index}"))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!("WorkerPool started with {} thread(s).", workers.len());
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Spawns a pool sized and named from `config`.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(config.worker_threads, &config.thread_name)
    }

    /// The number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops accepting tasks, lets queued tasks finish and joins every worker.
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("A worker thread terminated abnormally.");
            }
        }
        log::info!("WorkerPool shut down.");
    }
}

impl TaskPool for WorkerPool {
    fn spawn(&self, task: Task) -> Result<(), TaskPoolError> {
        let sender = self.sender.as_ref().ok_or(TaskPoolError)?;
        sender.send(task).map_err(|_| TaskPoolError)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(receiver: Receiver<Task>) {
    while let Ok(task) = receiver.recv() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            log::error!("A background task panicked.");
        }
    }
}
