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

//! Provides the primitive types used to identify media inside a cache.
//!
//! A caller never sees the cache's internal records. It receives a
//! [`MediaHandle`], a small copyable token naming one deduplicated Identity,
//! and hands it back to query or release the media.

mod handle;
mod key;

pub use handle::*;
pub use key::*;

/// A marker trait for the typed media objects produced by readers.
///
/// Media objects are produced on background threads and handed to the
/// control thread once their load group completes, hence the `Send` bound.
///
/// # Examples
///
/// ```
/// use mediacache_core::Media;
///
/// struct Texture {
///     pixels: Vec<u8>,
/// }
///
/// impl Media for Texture {}
/// ```
pub trait Media: Send + 'static {}
