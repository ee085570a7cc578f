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

//! The per-tick polling interface shared by every media category.

use std::any::Any;

/// The operations a caller drives once per application tick.
///
/// Implemented by each typed cache and by the aggregate that fans out across
/// them. All methods must be called from the control thread.
pub trait MediaLifecycle {
    /// A human-readable name for the media category (e.g. `"texture"`).
    fn category(&self) -> &str;

    /// Returns `true` if any Identity has background work in flight.
    fn is_loading(&self) -> bool;

    /// Returns `true` if implementations are waiting to be unloaded.
    fn can_unload(&self) -> bool;

    /// Promotes every finished load group. Returns `true` if at least one
    /// Identity was promoted to an implementation.
    fn load_ready(&mut self) -> bool;

    /// Unloads every queued implementation. Returns `true` if at least one
    /// was unloaded.
    fn unload_stale(&mut self) -> bool;

    /// Cancels all work, unloads everything and forgets every Identity.
    fn reset(&mut self);

    /// Allows downcasting to concrete cache types.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to concrete cache types.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
