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

use crate::{error::BoxError, fs::MediaStream, media::Media};

/// A format-specific parser that turns a byte stream into a typed media
/// object.
///
/// This represents the "Data Plane" part of loading. Readers run on
/// background threads, so they must be shareable across threads, and
/// [`supports`](MediaReader::supports) must be free of side effects because
/// it is consulted on the control thread while resolving paths.
pub trait MediaReader<M: Media>: Send + Sync {
    /// Returns `true` if this reader can parse files with `extension`.
    ///
    /// Extensions are passed without the leading dot, as reported by
    /// [`FileAccess::extension_of`](crate::fs::FileAccess::extension_of).
    fn supports(&self, extension: &str) -> bool;

    /// Parses `stream` into a media object.
    ///
    /// # Parameters
    /// - `stream`: An open stream positioned at the start of the file.
    /// - `path`: The fully-qualified path the stream was opened from.
    /// - `extension`: The extension that selected this reader.
    ///
    /// # Returns
    /// The decoded media on success, or a boxed error that is recorded as a
    /// load failure for `path`.
    fn read(&self, stream: MediaStream, path: &str, extension: &str) -> Result<M, BoxError>;
}
