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

//! Defines the error taxonomy of the media cache.
//!
//! Errors come in two shapes. [`MediaError`] is returned synchronously by the
//! call that violated a contract and never leaves the cache partially
//! mutated. [`LoadError`] describes a failure that happened on a background
//! task; those are collected per Identity into a [`LoadFailure`] and surface
//! at the next poll.

use crate::media::MediaHandle;
use std::{error::Error, fmt, io};
use thiserror::Error;

/// A thread-safe, type-erased error produced by a collaborator.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error raised synchronously by a cache operation.
#[derive(Debug, Error)]
pub enum MediaError {
    /// `reference` was called with no paths.
    #[error("cannot reference an empty path list")]
    EmptyPathList,
    /// One of the supplied paths was an empty string.
    #[error("path at index {index} is empty")]
    EmptyPath {
        /// Position of the offending path in the request.
        index: usize,
    },
    /// `reference_media` was called with no media objects.
    #[error("cannot reference an empty media list")]
    EmptyMediaList,
    /// The conversion service does not accept this many media objects.
    #[error("media count {count} is not supported by the conversion service")]
    UnsupportedMediaCount {
        /// The rejected count.
        count: usize,
    },
    /// No registered reader supports the extension of a path.
    #[error("no reader supports extension '{extension}' (path '{path}')")]
    NoReader {
        /// The fully-qualified path that could not be resolved.
        path: String,
        /// The extension reported by the file-access collaborator.
        extension: String,
    },
    /// The handle is not tracked by this cache.
    #[error("handle {0} is not tracked by this cache")]
    NotTracked(MediaHandle),
    /// The conversion service failed to convert pre-built media.
    #[error("conversion failed: {0}")]
    Conversion(#[source] BoxError),
    /// The configuration could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A failure of one background read, or of the conversion that follows it.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("file not found: '{path}'")]
    NotFound {
        /// The missing path.
        path: String,
    },
    /// The file exists but could not be opened.
    #[error("failed to open '{path}': {source}")]
    Open {
        /// The path that failed to open.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The reader rejected the file contents.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// The path whose contents were rejected.
        path: String,
        /// The reader's error.
        #[source]
        source: BoxError,
    },
    /// The reader panicked while parsing the file.
    #[error("reader panicked while reading '{path}'")]
    Panicked {
        /// The path being read when the panic happened.
        path: String,
    },
    /// The task pool refused to schedule the read task.
    #[error("task pool rejected the read task for '{path}'")]
    Rejected {
        /// The path whose task was rejected.
        path: String,
    },
    /// Every read succeeded but the conversion service failed.
    #[error("conversion failed: {source}")]
    Conversion {
        /// The conversion service's error.
        #[source]
        source: BoxError,
    },
}

impl LoadError {
    /// The source path this error is about, when it concerns a single path.
    pub fn path(&self) -> Option<&str> {
        match self {
            LoadError::NotFound { path }
            | LoadError::Open { path, .. }
            | LoadError::Read { path, .. }
            | LoadError::Panicked { path }
            | LoadError::Rejected { path } => Some(path),
            LoadError::Conversion { .. } => None,
        }
    }
}

/// Every error that prevented one Identity from becoming ready.
#[derive(Debug)]
pub struct LoadFailure {
    errors: Vec<LoadError>,
}

impl LoadFailure {
    /// Creates a failure from the errors collected for one Identity.
    pub fn new(errors: Vec<LoadError>) -> Self {
        Self { errors }
    }

    /// The individual errors, in source-path order.
    pub fn errors(&self) -> &[LoadError] {
        &self.errors
    }

    /// Returns `true` if any source file was missing.
    pub fn is_not_found(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, LoadError::NotFound { .. }))
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} load error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

impl Error for LoadFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_failure_lists_every_error() {
        let failure = LoadFailure::new(vec![
            LoadError::NotFound {
                path: "/a.tex".to_string(),
            },
            LoadError::Panicked {
                path: "/b.tex".to_string(),
            },
        ]);

        assert!(failure.is_not_found());
        let text = failure.to_string();
        assert!(text.starts_with("2 load error(s)"));
        assert!(text.contains("/a.tex"));
        assert!(text.contains("/b.tex"));
    }

    #[test]
    fn conversion_errors_have_no_path() {
        let error = LoadError::Conversion {
            source: "bad payload".into(),
        };
        assert_eq!(error.path(), None);
        assert_eq!(error.to_string(), "conversion failed: bad payload");
    }
}
