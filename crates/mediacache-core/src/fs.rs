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

use std::io::{self, Read};

/// A readable stream handed to a [`MediaReader`](crate::reader::MediaReader).
pub type MediaStream = Box<dyn Read + Send>;

/// The file-system abstraction used to resolve and stream media paths.
///
/// Implementations are shared between the control thread (which qualifies
/// paths and resolves extensions) and the background read tasks (which test
/// existence and open streams).
pub trait FileAccess: Send + Sync {
    /// Returns `true` if `path` names an existing file.
    fn exists(&self, path: &str) -> bool;

    /// Returns the extension of `path` without the leading dot, lowercased.
    /// Returns an empty string when the path has no extension.
    fn extension_of(&self, path: &str) -> String;

    /// Returns the canonical, fully-qualified form of `path`.
    ///
    /// Must be stable: the same input always yields the same output, because
    /// deduplication keys are derived from the qualified form.
    fn fully_qualify(&self, path: &str) -> String;

    /// Opens `path` for reading.
    fn open(&self, path: &str) -> io::Result<MediaStream>;
}
