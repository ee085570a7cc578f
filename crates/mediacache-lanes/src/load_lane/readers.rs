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

use mediacache_core::{fs::FileAccess, reader::MediaReader, Media, MediaError};
use std::sync::Arc;

/// A source path paired with the reader that will parse it.
pub struct ResolvedSource<M: Media> {
    /// The fully-qualified path.
    pub path: String,
    /// The extension that selected `reader`.
    pub extension: String,
    /// The reader chosen for this path.
    pub reader: Arc<dyn MediaReader<M>>,
}

/// An ordered list of readers, consulted first-match-wins.
///
/// Readers are tried in registration order; the first one whose
/// [`supports`](MediaReader::supports) accepts a path's extension is used for
/// that path.
pub struct ReaderRegistry<M: Media> {
    readers: Vec<Arc<dyn MediaReader<M>>>,
}

impl<M: Media> Default for ReaderRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Media> ReaderRegistry<M> {
    /// Creates a registry with no readers.
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Appends a reader. Earlier registrations take precedence.
    pub fn register(&mut self, reader: impl MediaReader<M> + 'static) {
        self.readers.push(Arc::new(reader));
    }

    /// Returns the first reader supporting `extension`.
    pub fn find(&self, extension: &str) -> Option<&Arc<dyn MediaReader<M>>> {
        self.readers.iter().find(|reader| reader.supports(extension))
    }

    /// Resolves every path to a reader.
    ///
    /// # Errors
    /// Returns [`MediaError::NoReader`] for the first path no reader
    /// supports. Nothing is resolved partially.
    pub fn resolve(
        &self,
        files: &dyn FileAccess,
        paths: &[String],
    ) -> Result<Vec<ResolvedSource<M>>, MediaError> {
        paths
            .iter()
            .map(|path| {
                let extension = files.extension_of(path);
                let reader = self.find(&extension).ok_or_else(|| MediaError::NoReader {
                    path: path.clone(),
                    extension: extension.clone(),
                })?;
                Ok(ResolvedSource {
                    path: path.clone(),
                    extension,
                    reader: Arc::clone(reader),
                })
            })
            .collect()
    }

    /// The number of registered readers.
    pub fn len(&self) -> usize {
        self.readers.len()
    }

    /// Returns `true` if no reader is registered.
    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediacache_core::{error::BoxError, fs::MediaStream};
    use mediacache_infra::fs::MemoryFileAccess;

    struct Blob(&'static str);
    impl Media for Blob {}

    struct NamedReader {
        name: &'static str,
        extensions: &'static [&'static str],
    }

    impl MediaReader<Blob> for NamedReader {
        fn supports(&self, extension: &str) -> bool {
            self.extensions.contains(&extension)
        }

        fn read(&self, _stream: MediaStream, _path: &str, _ext: &str) -> Result<Blob, BoxError> {
            Ok(Blob(self.name))
        }
    }

    #[test]
    fn first_registered_reader_wins() {
        let mut registry = ReaderRegistry::new();
        registry.register(NamedReader {
            name: "first",
            extensions: &["png", "tex"],
        });
        registry.register(NamedReader {
            name: "second",
            extensions: &["tex"],
        });

        let files = MemoryFileAccess::new();
        let sources = registry
            .resolve(&files, &["/a.tex".to_string()])
            .unwrap();
        let blob = sources[0]
            .reader
            .read(Box::new(std::io::empty()), "/a.tex", "tex")
            .unwrap();
        assert_eq!(blob.0, "first");
        assert_eq!(sources[0].extension, "tex");
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let mut registry = ReaderRegistry::new();
        registry.register(NamedReader {
            name: "png",
            extensions: &["png"],
        });

        let files = MemoryFileAccess::new();
        let err = registry
            .resolve(&files, &["/a.png".to_string(), "/b.wav".to_string()])
            .err()
            .unwrap();
        match err {
            MediaError::NoReader { path, extension } => {
                assert_eq!(path, "/b.wav");
                assert_eq!(extension, "wav");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
