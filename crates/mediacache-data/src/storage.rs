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

//! Storage for converted implementations and their disposal queue.

use mediacache_core::LoadFailure;
use std::collections::HashMap;

/// A converted implementation together with the media it was built from,
/// when the conversion service asked for the sources to be retained.
#[derive(Debug)]
pub struct CachedImplementation<I, M> {
    /// The runtime object returned by the conversion service.
    pub payload: I,
    /// The source media, kept only when the service requires them.
    pub sources: Option<Vec<M>>,
}

/// A central, in-memory store of the implementations of one cache.
///
/// Holds at most one live implementation per Identity. Retiring an Identity
/// moves its implementation to the stale queue, where it waits for the next
/// `unload_stale` pass. Identities whose load failed keep their
/// [`LoadFailure`] here until they are retired.
pub struct ImplementationCache<I, M> {
    live: HashMap<u64, CachedImplementation<I, M>>,
    stale: Vec<(u64, CachedImplementation<I, M>)>,
    failures: HashMap<u64, LoadFailure>,
}

impl<I, M> Default for ImplementationCache<I, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, M> ImplementationCache<I, M> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            live: HashMap::new(),
            stale: Vec::new(),
            failures: HashMap::new(),
        }
    }

    /// Stores the implementation for Identity `id`.
    ///
    /// If an implementation was already live for `id` it is moved to the
    /// stale queue rather than dropped, so it still gets unloaded.
    pub fn insert(&mut self, id: u64, payload: I, sources: Option<Vec<M>>) {
        self.failures.remove(&id);
        if let Some(previous) = self.live.insert(id, CachedImplementation { payload, sources }) {
            log::warn!("Identity {id} already had a live implementation; queueing the old one");
            self.stale.push((id, previous));
        }
    }

    /// Returns the live implementation for `id`.
    pub fn get(&self, id: u64) -> Option<&I> {
        self.live.get(&id).map(|entry| &entry.payload)
    }

    /// Returns the retained source media for `id`.
    pub fn sources(&self, id: u64) -> Option<&[M]> {
        self.live.get(&id).and_then(|entry| entry.sources.as_deref())
    }

    /// Returns `true` if `id` has a live implementation.
    pub fn contains(&self, id: u64) -> bool {
        self.live.contains_key(&id)
    }

    /// Records why Identity `id` could not be made ready.
    pub fn record_failure(&mut self, id: u64, failure: LoadFailure) {
        self.failures.insert(id, failure);
    }

    /// Returns the recorded failure for `id`.
    pub fn failure(&self, id: u64) -> Option<&LoadFailure> {
        self.failures.get(&id)
    }

    /// Moves the live implementation of `id`, if any, to the stale queue and
    /// forgets any failure recorded for it. Returns `true` if an
    /// implementation was queued.
    pub fn retire(&mut self, id: u64) -> bool {
        self.failures.remove(&id);
        match self.live.remove(&id) {
            Some(entry) => {
                self.stale.push((id, entry));
                true
            }
            None => false,
        }
    }

    /// Returns `true` if implementations are waiting to be unloaded.
    pub fn has_stale(&self) -> bool {
        !self.stale.is_empty()
    }

    /// Empties the stale queue, in retirement order.
    pub fn drain_stale(&mut self) -> Vec<(u64, CachedImplementation<I, M>)> {
        std::mem::take(&mut self.stale)
    }

    /// Empties the live map, ordered by Identity id, and forgets all
    /// failures.
    pub fn drain_live(&mut self) -> Vec<(u64, CachedImplementation<I, M>)> {
        self.failures.clear();
        let mut entries: Vec<_> = self.live.drain().collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }

    /// The number of live implementations.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// The number of implementations waiting to be unloaded.
    pub fn stale_count(&self) -> usize {
        self.stale.len()
    }

    /// The number of identities with a recorded failure.
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}
