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

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one cache instance.
///
/// Every handle records the cache that issued it, so a handle presented to
/// a different instance is rejected instead of aliasing an unrelated Identity
/// that happens to share the same numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheId(Uuid);

impl CacheId {
    /// Creates a new, random (version 4) `CacheId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CacheId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CacheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller-visible token returned by `reference`.
///
/// Handles are plain values: copying one does not change any reference
/// count. Each successful `reference` call must be balanced by exactly one
/// `unreference` call with the returned handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaHandle {
    owner: CacheId,
    id: u64,
}

impl MediaHandle {
    /// Creates a handle for Identity `id` issued by the cache `owner`.
    pub fn new(owner: CacheId, id: u64) -> Self {
        Self { owner, id }
    }

    /// The process-lifetime unique Identity id this handle points at.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The cache instance that issued this handle.
    pub fn owner(&self) -> CacheId {
        self.owner
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.id, self.owner)
    }
}
