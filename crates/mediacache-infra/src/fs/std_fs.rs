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

use mediacache_core::{
    fs::{FileAccess, MediaStream},
    CacheConfig,
};
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Component, Path, PathBuf},
};

/// Reads media from the local file system.
///
/// Relative paths are resolved against a root directory and normalised
/// lexically (`.` and `..` are folded, separators unified) without touching
/// the disk, so qualifying a path that does not exist yet is still stable.
#[derive(Debug, Clone)]
pub struct StdFileAccess {
    root: PathBuf,
}

impl StdFileAccess {
    /// Creates a backend resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a backend rooted at the configured directory, or at the
    /// process working directory when none is configured.
    pub fn from_config(config: &CacheConfig) -> io::Result<Self> {
        let root = match &config.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => std::env::current_dir()?.join(root),
            None => std::env::current_dir()?,
        };
        Ok(Self::new(root))
    }

    /// The directory relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn normalize(path: &Path) -> PathBuf {
        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other.as_os_str()),
            }
        }
        normalized
    }
}

impl FileAccess for StdFileAccess {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn extension_of(&self, path: &str) -> String {
        Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn fully_qualify(&self, path: &str) -> String {
        let path = Path::new(path);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        Self::normalize(&joined).to_string_lossy().into_owned()
    }

    fn open(&self, path: &str) -> io::Result<MediaStream> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}
