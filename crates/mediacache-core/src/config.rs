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

//! Runtime configuration for the media cache and its default backends.

use crate::error::MediaError;
use serde::{Deserialize, Serialize};
use std::{fs, num::NonZeroUsize, path::Path, path::PathBuf, thread};

/// Settings shared by the cache and the concrete collaborators built for it.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides:
///
/// ```
/// use mediacache_core::CacheConfig;
///
/// let config = CacheConfig::from_ron_str("(worker_threads: 2)").unwrap();
/// assert_eq!(config.worker_threads, 2);
/// assert_eq!(config.max_promotions_per_tick, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of threads spawned by the worker pool.
    pub worker_threads: usize,
    /// Name prefix for worker threads.
    pub thread_name: String,
    /// Upper bound on load groups promoted by a single `load_ready` call.
    /// `None` promotes every finished group.
    pub max_promotions_per_tick: Option<usize>,
    /// Base directory relative paths are qualified against.
    /// `None` uses the process working directory.
    pub root: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            worker_threads: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            thread_name: "mediacache-worker".to_string(),
            max_promotions_per_tick: None,
            root: None,
        }
    }
}

impl CacheConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, MediaError> {
        let config: Self =
            ron::de::from_str(text).map_err(|e| MediaError::Config(e.to_string()))?;
        config.validate()
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| MediaError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("Loaded media cache configuration from {}", path.display());
        Self::from_ron_str(&text)
    }

    fn validate(self) -> Result<Self, MediaError> {
        if self.worker_threads == 0 {
            return Err(MediaError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_promotions_per_tick == Some(0) {
            return Err(MediaError::Config(
                "max_promotions_per_tick must be at least 1 when set".to_string(),
            ));
        }
        Ok(self)
    }
}
