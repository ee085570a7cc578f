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
use mediacache_core::{
    task::{Task, TaskPool, TaskPoolError},
    CacheConfig,
};
use tokio::runtime::{Builder, Handle, Runtime};

/// Runs tasks on tokio's blocking thread pool.
///
/// Either borrows a handle to a runtime the application already runs, or
/// owns a dedicated runtime built from the cache configuration. An owned
/// runtime must not be dropped from inside an async context.
pub struct TokioTaskPool {
    handle: Handle,
    _runtime: Option<Runtime>,
}

impl TokioTaskPool {
    /// Schedules onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            _runtime: None,
        }
    }

    /// Schedules onto the runtime the caller is currently running in.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().context("No tokio runtime is running")?;
        Ok(Self::new(handle))
    }

    /// Builds and owns a dedicated multi-threaded runtime.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(config.worker_threads.max(1))
            .thread_name(config.thread_name.clone())
            .build()
            .context("Failed to build tokio runtime for media loading")?;
        log::info!(
            "TokioTaskPool started with up to {} blocking thread(s).",
            config.worker_threads
        );
        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Some(runtime),
        })
    }
}

impl TaskPool for TokioTaskPool {
    fn spawn(&self, task: Task) -> Result<(), TaskPoolError> {
        // The join handle is dropped: completion is observed through the
        // load group, never by awaiting.
        drop(self.handle.spawn_blocking(task));
        Ok(())
    }
}
