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

use mediacache_core::MediaLifecycle;

/// Drives several media categories with one call per tick.
///
/// Each poll is forwarded to every member, in registration order, and the
/// results are OR-ed together. No member is skipped because an earlier one
/// already reported progress.
#[derive(Default)]
pub struct MediaCacheSet {
    members: Vec<Box<dyn MediaLifecycle>>,
}

impl MediaCacheSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member cache.
    pub fn register(&mut self, member: impl MediaLifecycle + 'static) {
        log::debug!("MediaCacheSet: registered '{}'", member.category());
        self.members.push(Box::new(member));
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, member: impl MediaLifecycle + 'static) -> Self {
        self.register(member);
        self
    }

    /// Returns the first member of concrete type `T`.
    pub fn get<T: MediaLifecycle + 'static>(&self) -> Option<&T> {
        self.members
            .iter()
            .find_map(|member| member.as_any().downcast_ref::<T>())
    }

    /// Returns the first member of concrete type `T`, mutably.
    pub fn get_mut<T: MediaLifecycle + 'static>(&mut self) -> Option<&mut T> {
        self.members
            .iter_mut()
            .find_map(|member| member.as_any_mut().downcast_mut::<T>())
    }

    /// Returns the member whose category is `category`.
    pub fn by_category(&self, category: &str) -> Option<&dyn MediaLifecycle> {
        self.members
            .iter()
            .find(|member| member.category() == category)
            .map(|member| &**member)
    }

    /// The number of member caches.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` if any member is loading.
    pub fn is_loading(&self) -> bool {
        self.members
            .iter()
            .fold(false, |any, member| member.is_loading() | any)
    }

    /// Returns `true` if any member has implementations to unload.
    pub fn can_unload(&self) -> bool {
        self.members
            .iter()
            .fold(false, |any, member| member.can_unload() | any)
    }

    /// Promotes finished loads in every member.
    pub fn load_ready(&mut self) -> bool {
        self.members
            .iter_mut()
            .fold(false, |any, member| member.load_ready() | any)
    }

    /// Unloads stale implementations in every member.
    pub fn unload_stale(&mut self) -> bool {
        self.members
            .iter_mut()
            .fold(false, |any, member| member.unload_stale() | any)
    }

    /// Resets every member.
    pub fn reset(&mut self) {
        for member in &mut self.members {
            member.reset();
        }
    }
}

impl MediaLifecycle for MediaCacheSet {
    fn category(&self) -> &str {
        "aggregate"
    }

    fn is_loading(&self) -> bool {
        MediaCacheSet::is_loading(self)
    }

    fn can_unload(&self) -> bool {
        MediaCacheSet::can_unload(self)
    }

    fn load_ready(&mut self) -> bool {
        MediaCacheSet::load_ready(self)
    }

    fn unload_stale(&mut self) -> bool {
        MediaCacheSet::unload_stale(self)
    }

    fn reset(&mut self) {
        MediaCacheSet::reset(self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
