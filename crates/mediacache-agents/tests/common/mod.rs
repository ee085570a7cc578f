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

//! Shared fixtures for the media cache integration tests.

#![allow(dead_code)]

use mediacache_agents::MediaCache;
use mediacache_core::{
    conversion::ConversionService, error::BoxError, fs::MediaStream, reader::MediaReader, Media,
};
use mediacache_infra::{ManualTaskPool, MemoryFileAccess};
use std::{io::Read, sync::Arc};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A decoded texture: just its bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TexturePixels(pub Vec<u8>);
impl Media for TexturePixels {}

/// Reads `.tex` files verbatim. Files starting with `!` are rejected.
pub struct TexReader;

impl MediaReader<TexturePixels> for TexReader {
    fn supports(&self, extension: &str) -> bool {
        extension == "tex"
    }

    fn read(
        &self,
        mut stream: MediaStream,
        path: &str,
        _extension: &str,
    ) -> Result<TexturePixels, BoxError> {
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        if bytes.first() == Some(&b'!') {
            return Err(format!("corrupt texture '{path}'").into());
        }
        Ok(TexturePixels(bytes))
    }
}

/// The "GPU" form of a texture set.
#[derive(Debug, PartialEq)]
pub struct GpuTexture {
    pub slot: u32,
    pub layers: usize,
}

/// Records every call the cache makes.
#[derive(Default)]
pub struct RecordingUploader {
    pub accepted_counts: Vec<usize>,
    pub keep_sources: bool,
    pub fail_conversion: bool,
    pub loads: Vec<Option<Vec<String>>>,
    pub unloads: Vec<u32>,
    next_slot: u32,
}

impl RecordingUploader {
    pub fn single() -> Self {
        Self {
            accepted_counts: vec![1],
            ..Self::default()
        }
    }

    pub fn accepting(counts: &[usize]) -> Self {
        Self {
            accepted_counts: counts.to_vec(),
            ..Self::default()
        }
    }

    /// Makes every conversion fail.
    pub fn failing(mut self) -> Self {
        self.fail_conversion = true;
        self
    }

    /// Asks the cache to retain source media.
    pub fn keeping_sources(mut self) -> Self {
        self.keep_sources = true;
        self
    }
}

impl ConversionService for RecordingUploader {
    type Media = TexturePixels;
    type Implementation = GpuTexture;

    fn is_media_count_supported(&self, count: usize) -> bool {
        self.accepted_counts.contains(&count)
    }

    fn is_source_required(&self) -> bool {
        self.keep_sources
    }

    fn load(
        &mut self,
        media: &[TexturePixels],
        paths: Option<&[String]>,
    ) -> Result<GpuTexture, BoxError> {
        self.loads.push(paths.map(<[String]>::to_vec));
        if self.fail_conversion {
            return Err("out of video memory".into());
        }
        self.next_slot += 1;
        Ok(GpuTexture {
            slot: self.next_slot,
            layers: media.len(),
        })
    }

    fn unload(&mut self, implementation: GpuTexture) {
        self.unloads.push(implementation.slot);
    }
}

/// A texture cache over an in-memory file system and a caller-driven pool.
pub struct Fixture {
    pub cache: MediaCache<RecordingUploader>,
    pub files: Arc<MemoryFileAccess>,
    pub pool: Arc<ManualTaskPool>,
}

impl Fixture {
    pub fn new(uploader: RecordingUploader) -> Self {
        Self::with_budget(uploader, None)
    }

    /// Like [`Fixture::new`], promoting at most `budget` loads per tick.
    pub fn with_budget(uploader: RecordingUploader, budget: Option<usize>) -> Self {
        init_logging();
        let files = Arc::new(MemoryFileAccess::new());
        let pool = Arc::new(ManualTaskPool::new());
        let mut cache = MediaCache::new("texture", uploader, files.clone(), pool.clone())
            .with_promotion_budget(budget);
        cache.register_reader(TexReader);
        Self { cache, files, pool }
    }

    /// Runs every queued read, then promotes.
    pub fn tick(&mut self) -> bool {
        self.pool.run_pending();
        self.cache.load_ready()
    }
}
