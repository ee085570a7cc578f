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

use mediacache_core::fs::{FileAccess, MediaStream};
use std::{
    collections::HashMap,
    io::{self, Cursor},
    sync::{Arc, PoisonError, RwLock},
};

/// An in-memory file system.
///
/// Useful for packed content that was already read into memory, and for
/// tests that need full control over which files exist. Paths are used
/// verbatim: qualifying only prefixes a `/` to relative paths.
#[derive(Debug, Default)]
pub struct MemoryFileAccess {
    files: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl MemoryFileAccess {
    /// Creates an empty in-memory file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file. `path` is qualified first.
    pub fn insert(&self, path: &str, bytes: impl Into<Arc<[u8]>>) {
        let path = self.fully_qualify(path);
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, bytes.into());
    }

    /// Removes a file. Returns `true` if it existed.
    pub fn remove(&self, path: &str) -> bool {
        let path = self.fully_qualify(path);
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&path)
            .is_some()
    }
}

impl FileAccess for MemoryFileAccess {
    fn exists(&self, path: &str) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    fn extension_of(&self, path: &str) -> String {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
            _ => String::new(),
        }
    }

    fn fully_qualify(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }

    fn open(&self, path: &str) -> io::Result<MediaStream> {
        let bytes = self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))?;
        Ok(Box::new(Cursor::new(bytes)))
    }
}
