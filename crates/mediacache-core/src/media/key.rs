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

const SEPARATOR: char = '|';

/// The deduplication key of a path-based Identity.
///
/// Derived from the ordered list of fully-qualified source paths. Two
/// requests produce the same key only when they name the same paths in the
/// same order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey(String);

impl JoinKey {
    /// Builds the key for an ordered list of fully-qualified paths.
    ///
    /// Each path is length-prefixed so that a separator character appearing
    /// inside a path can never make two different lists collide.
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut key = String::new();
        for path in paths {
            let path = path.as_ref();
            key.push_str(&path.len().to_string());
            key.push(':');
            key.push_str(path);
            key.push(SEPARATOR);
        }
        Self(key)
    }

    /// Returns the raw key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
