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

use std::fmt;

/// Where one Identity is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Background reads are in flight, or finished but not yet promoted.
    Loading,
    /// The implementation is available through `get`.
    Ready,
    /// Loading or conversion failed; see `failure`.
    Failed,
}

/// A snapshot of one cache, for diagnostics and overlays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStatus {
    /// The media category of the cache.
    pub category: String,
    /// Tracked identities.
    pub identities: usize,
    /// Load groups not yet harvested, cancelled ones included.
    pub pending: usize,
    /// Live implementations.
    pub live: usize,
    /// Implementations waiting for `unload_stale`.
    pub stale: usize,
    /// Identities whose load failed.
    pub failed: usize,
    /// Total promotions since creation.
    pub promoted_total: u64,
    /// Total unloads since creation.
    pub unloaded_total: u64,
    /// Total load failures since creation.
    pub failed_total: u64,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: identities={} pending={} live={} stale={} failed={} (promoted={} unloaded={} failures={})",
            self.category,
            self.identities,
            self.pending,
            self.live,
            self.stale,
            self.failed,
            self.promoted_total,
            self.unloaded_total,
            self.failed_total
        )
    }
}
