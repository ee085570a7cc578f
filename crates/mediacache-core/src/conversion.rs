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

use crate::{error::BoxError, media::Media};

/// Converts loaded media into the runtime form the application consumes,
/// and releases that form again.
///
/// The service owns the contents of every implementation it returns. It is
/// only ever called from the control thread, during `reference_media`,
/// `load_ready`, `unload_stale` and `reset`, so it needs no internal locking.
pub trait ConversionService {
    /// The media type this service accepts.
    type Media: Media;
    /// The runtime object produced by a conversion.
    type Implementation;

    /// Returns `true` if one implementation may be built from `count` media
    /// objects (e.g. a cube map needs six images, a texture exactly one).
    fn is_media_count_supported(&self, count: usize) -> bool;

    /// Returns `true` if the source media must outlive the conversion.
    ///
    /// When `false`, the cache drops the media objects as soon as
    /// [`load`](ConversionService::load) returns.
    fn is_source_required(&self) -> bool;

    /// Builds an implementation from `media`.
    ///
    /// `paths` holds the fully-qualified source paths, in the same order as
    /// `media`, for path-based references; it is `None` for media supplied
    /// directly by the caller.
    fn load(
        &mut self,
        media: &[Self::Media],
        paths: Option<&[String]>,
    ) -> Result<Self::Implementation, BoxError>;

    /// Releases an implementation previously returned by
    /// [`load`](ConversionService::load).
    ///
    /// The cache calls this exactly once per implementation.
    fn unload(&mut self, implementation: Self::Implementation);
}
