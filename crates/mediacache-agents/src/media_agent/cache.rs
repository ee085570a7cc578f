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

use super::{CacheStatus, LoadState};
use anyhow::{Context, Result};
use mediacache_core::{
    conversion::ConversionService, fs::FileAccess, reader::MediaReader, task::TaskPool,
    CacheConfig, CacheId, JoinKey, LoadError, LoadFailure, MediaError, MediaHandle,
    MediaLifecycle,
};
use mediacache_data::{ImplementationCache, Release, ReferenceRegistry};
use mediacache_infra::{StdFileAccess, WorkerPool};
use mediacache_lanes::{LoadOrchestrator, LoadOutcome};
use std::{any::Any, sync::Arc};

type MediaOf<S> = <S as ConversionService>::Media;
type ImplementationOf<S> = <S as ConversionService>::Implementation;

/// An asynchronous, reference-counted cache for one media category.
///
/// Turns requests into stable [`MediaHandle`]s, drives background loading
/// of path-based media, converts finished loads exactly once and unloads
/// implementations exactly once when their last handle is released.
///
/// Every method must be called from the same control thread. Background
/// tasks only ever write their own load group; everything else is read and
/// written here, so no locking is involved.
///
/// A typical tick:
///
/// ```ignore
/// textures.load_ready();
/// textures.unload_stale();
/// if let Some(gpu_texture) = textures.get(handle) { /* draw */ }
/// ```
pub struct MediaCache<S: ConversionService> {
    category: String,
    registry: ReferenceRegistry,
    orchestrator: LoadOrchestrator<MediaOf<S>>,
    implementations: ImplementationCache<ImplementationOf<S>, MediaOf<S>>,
    conversion: S,
    max_promotions_per_tick: Option<usize>,
    promoted_total: u64,
    unloaded_total: u64,
    failed_total: u64,
}

impl<S: ConversionService> MediaCache<S> {
    /// Creates a cache reading through `files` on `pool`.
    pub fn new(
        category: impl Into<String>,
        conversion: S,
        files: Arc<dyn FileAccess>,
        pool: Arc<dyn TaskPool>,
    ) -> Self {
        Self {
            category: category.into(),
            registry: ReferenceRegistry::new(CacheId::new()),
            orchestrator: LoadOrchestrator::new(files, pool),
            implementations: ImplementationCache::new(),
            conversion,
            max_promotions_per_tick: None,
            promoted_total: 0,
            unloaded_total: 0,
            failed_total: 0,
        }
    }

    /// Creates a cache backed by the local file system and a dedicated
    /// worker pool, both built from `config`.
    pub fn from_config(
        category: impl Into<String>,
        conversion: S,
        config: &CacheConfig,
    ) -> Result<Self> {
        let category = category.into();
        let files = StdFileAccess::from_config(config)
            .with_context(|| format!("Failed to resolve media root for '{category}'"))?;
        let pool = WorkerPool::from_config(config)
            .with_context(|| format!("Failed to start worker pool for '{category}'"))?;
        let mut cache = Self::new(category, conversion, Arc::new(files), Arc::new(pool));
        cache.max_promotions_per_tick = config.max_promotions_per_tick;
        Ok(cache)
    }

    /// Limits how many finished loads a single [`load_ready`](Self::load_ready)
    /// call promotes. `None` removes the limit.
    pub fn with_promotion_budget(mut self, budget: Option<usize>) -> Self {
        self.max_promotions_per_tick = budget;
        self
    }

    /// Registers a reader. Earlier registrations take precedence.
    pub fn register_reader(&mut self, reader: impl MediaReader<MediaOf<S>> + 'static) {
        self.orchestrator.register_reader(reader);
    }

    /// The cache instance id stamped into every handle it issues.
    pub fn id(&self) -> CacheId {
        self.registry.owner()
    }

    /// The conversion service.
    pub fn conversion(&self) -> &S {
        &self.conversion
    }

    /// References media stored at `paths`.
    ///
    /// Equal, order-preserved path lists (after qualification) share one
    /// Identity and one reference count. A new Identity starts loading in the
    /// background immediately.
    ///
    /// # Errors
    /// Fails without any side effect if the list is empty, a path is empty,
    /// the conversion service does not support the count, or no reader
    /// supports one of the extensions.
    pub fn reference<P: AsRef<str>>(&mut self, paths: &[P]) -> Result<MediaHandle, MediaError> {
        if paths.is_empty() {
            return Err(MediaError::EmptyPathList);
        }
        if let Some(index) = paths.iter().position(|p| p.as_ref().is_empty()) {
            return Err(MediaError::EmptyPath { index });
        }
        if !self.conversion.is_media_count_supported(paths.len()) {
            return Err(MediaError::UnsupportedMediaCount { count: paths.len() });
        }

        let files = self.orchestrator.files();
        let qualified: Vec<String> = paths
            .iter()
            .map(|p| files.fully_qualify(p.as_ref()))
            .collect();
        let key = JoinKey::from_paths(&qualified);

        if let Some(handle) = self.registry.acquire(&key) {
            return Ok(handle);
        }

        let sources = self.orchestrator.resolve(&qualified)?;
        let handle = self.registry.register_file_based(qualified, key);
        self.orchestrator.begin(handle.id(), sources);
        log::debug!("[{}] Identity {} created", self.category, handle.id());
        Ok(handle)
    }

    /// References pre-built media.
    ///
    /// Always creates a new Identity; the media are converted immediately
    /// because no I/O is needed.
    ///
    /// # Errors
    /// Fails without any side effect if `media` is empty, its count is not
    /// supported, or the conversion fails.
    pub fn reference_media(
        &mut self,
        media: Vec<MediaOf<S>>,
    ) -> Result<MediaHandle, MediaError> {
        if media.is_empty() {
            return Err(MediaError::EmptyMediaList);
        }
        if !self.conversion.is_media_count_supported(media.len()) {
            return Err(MediaError::UnsupportedMediaCount { count: media.len() });
        }

        let implementation = self
            .conversion
            .load(&media, None)
            .map_err(MediaError::Conversion)?;
        let sources = self.conversion.is_source_required().then_some(media);

        let handle = self.registry.register_object_based();
        self.implementations
            .insert(handle.id(), implementation, sources);
        self.promoted_total += 1;
        log::debug!(
            "[{}] Identity {} created from in-memory media",
            self.category,
            handle.id()
        );
        Ok(handle)
    }

    /// Releases one reference.
    ///
    /// When the count reaches zero the Identity is forgotten, any pending
    /// load is cancelled and any implementation is queued for
    /// [`unload_stale`](Self::unload_stale).
    ///
    /// # Errors
    /// Returns [`MediaError::NotTracked`] for handles this cache does not
    /// track. No state is modified in that case.
    pub fn unreference(&mut self, handle: MediaHandle) -> Result<(), MediaError> {
        match self.registry.release(handle)? {
            Release::Retained { remaining } => {
                log::trace!(
                    "[{}] Identity {} released (count {remaining})",
                    self.category,
                    handle.id()
                );
            }
            Release::Destroyed(identity) => {
                let id = identity.id();
                self.orchestrator.cancel(id);
                if self.implementations.retire(id) {
                    log::debug!("[{}] Identity {id} queued for unload", self.category);
                }
            }
        }
        Ok(())
    }

    /// Returns the implementation for `handle`, if it is ready.
    ///
    /// Never blocks. `None` means still loading, failed, or not tracked.
    pub fn get(&self, handle: MediaHandle) -> Option<&ImplementationOf<S>> {
        let id = self.registry.resolve(handle).ok()?;
        self.implementations.get(id)
    }

    /// Returns the media an implementation was built from, when the
    /// conversion service requires them to be retained.
    pub fn sources(&self, handle: MediaHandle) -> Option<&[MediaOf<S>]> {
        let id = self.registry.resolve(handle).ok()?;
        self.implementations.sources(id)
    }

    /// Returns the lifecycle state of `handle`.
    ///
    /// # Errors
    /// Returns [`MediaError::NotTracked`] for handles this cache does not
    /// track.
    pub fn state(&self, handle: MediaHandle) -> Result<LoadState, MediaError> {
        let id = self.registry.resolve(handle)?;
        if self.implementations.contains(id) {
            Ok(LoadState::Ready)
        } else if self.implementations.failure(id).is_some() {
            Ok(LoadState::Failed)
        } else {
            Ok(LoadState::Loading)
        }
    }

    /// Returns why `handle` failed to load, if it did.
    pub fn failure(&self, handle: MediaHandle) -> Option<&LoadFailure> {
        let id = self.registry.resolve(handle).ok()?;
        self.implementations.failure(id)
    }

    /// Returns the reference count of `handle`.
    pub fn ref_count(&self, handle: MediaHandle) -> Option<usize> {
        self.registry.get(handle).map(|identity| identity.ref_count())
    }

    /// Returns `true` if any Identity has a load group not yet harvested.
    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    /// Returns `true` if implementations are waiting to be unloaded.
    pub fn can_unload(&self) -> bool {
        self.implementations.has_stale()
    }

    /// Promotes every finished load group into an implementation.
    ///
    /// Never blocks. Cancelled groups are dropped silently; failed groups
    /// are recorded against their Identity. Returns `true` if at least one
    /// Identity was promoted.
    pub fn load_ready(&mut self) -> bool {
        let mut promoted = false;
        for outcome in self.orchestrator.take_finished(self.max_promotions_per_tick) {
            match outcome {
                LoadOutcome::Loaded { id, media, paths } => {
                    promoted |= self.promote(id, media, &paths);
                }
                LoadOutcome::Failed { id, failure } => self.fail(id, failure),
                LoadOutcome::Cancelled { id } => {
                    log::trace!("[{}] Discarded cancelled load of {id}", self.category);
                }
            }
        }
        promoted
    }

    /// Unloads every implementation queued by
    /// [`unreference`](Self::unreference). Returns `true` if at least one
    /// was unloaded.
    pub fn unload_stale(&mut self) -> bool {
        let stale = self.implementations.drain_stale();
        if stale.is_empty() {
            return false;
        }
        for (id, entry) in stale {
            log::debug!("[{}] Unloading identity {id}", self.category);
            self.conversion.unload(entry.payload);
            self.unloaded_total += 1;
        }
        true
    }

    /// Cancels every pending load, unloads every implementation (queued or
    /// live) and forgets every Identity. Handles issued before the reset are
    /// no longer tracked.
    pub fn reset(&mut self) {
        log::info!("[{}] Resetting media cache", self.category);
        self.orchestrator.cancel_all();
        self.unload_stale();
        for (id, entry) in self.implementations.drain_live() {
            log::debug!("[{}] Unloading identity {id}", self.category);
            self.conversion.unload(entry.payload);
            self.unloaded_total += 1;
        }
        self.registry.clear();
    }

    /// Returns a snapshot of the cache's bookkeeping.
    pub fn report_status(&self) -> CacheStatus {
        CacheStatus {
            category: self.category.clone(),
            identities: self.registry.len(),
            pending: self.orchestrator.pending_count(),
            live: self.implementations.live_count(),
            stale: self.implementations.stale_count(),
            failed: self.implementations.failed_count(),
            promoted_total: self.promoted_total,
            unloaded_total: self.unloaded_total,
            failed_total: self.failed_total,
        }
    }

    fn promote(&mut self, id: u64, media: Vec<MediaOf<S>>, paths: &[String]) -> bool {
        if !self.registry.contains_id(id) {
            log::trace!("[{}] Dropping load of released identity {id}", self.category);
            return false;
        }
        match self.conversion.load(&media, Some(paths)) {
            Ok(implementation) => {
                let sources = self.conversion.is_source_required().then_some(media);
                self.implementations.insert(id, implementation, sources);
                self.promoted_total += 1;
                log::debug!("[{}] Identity {id} is ready", self.category);
                true
            }
            Err(source) => {
                self.fail(id, LoadFailure::new(vec![LoadError::Conversion { source }]));
                false
            }
        }
    }

    fn fail(&mut self, id: u64, failure: LoadFailure) {
        if !self.registry.contains_id(id) {
            return;
        }
        log::warn!("[{}] Identity {id} failed to load: {failure}", self.category);
        self.implementations.record_failure(id, failure);
        self.failed_total += 1;
    }
}

impl<S: ConversionService + 'static> MediaLifecycle for MediaCache<S> {
    fn category(&self) -> &str {
        &self.category
    }

    fn is_loading(&self) -> bool {
        MediaCache::is_loading(self)
    }

    fn can_unload(&self) -> bool {
        MediaCache::can_unload(self)
    }

    fn load_ready(&mut self) -> bool {
        MediaCache::load_ready(self)
    }

    fn unload_stale(&mut self) -> bool {
        MediaCache::unload_stale(self)
    }

    fn reset(&mut self) {
        MediaCache::reset(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<S: ConversionService> Drop for MediaCache<S> {
    fn drop(&mut self) {
        self.orchestrator.cancel_all();
        if self.implementations.live_count() + self.implementations.stale_count() > 0 {
            log::warn!(
                "[{}] Dropped with {} live and {} stale implementation(s) never unloaded; call reset() first",
                self.category,
                self.implementations.live_count(),
                self.implementations.stale_count()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediacache_core::{error::BoxError, fs::MediaStream, Media};
    use mediacache_infra::{ManualTaskPool, MemoryFileAccess};

    struct Blob;
    impl Media for Blob {}

    struct BlobReader;
    impl MediaReader<Blob> for BlobReader {
        fn supports(&self, extension: &str) -> bool {
            extension == "bin"
        }

        fn read(&self, _s: MediaStream, _p: &str, _e: &str) -> Result<Blob, BoxError> {
            Ok(Blob)
        }
    }

    #[derive(Default)]
    struct Counting {
        loads: usize,
        unloads: usize,
    }

    impl ConversionService for Counting {
        type Media = Blob;
        type Implementation = usize;

        fn is_media_count_supported(&self, count: usize) -> bool {
            count == 1
        }

        fn is_source_required(&self) -> bool {
            false
        }

        fn load(&mut self, _m: &[Blob], _p: Option<&[String]>) -> Result<usize, BoxError> {
            self.loads += 1;
            Ok(self.loads)
        }

        fn unload(&mut self, _implementation: usize) {
            self.unloads += 1;
        }
    }

    fn cache() -> (MediaCache<Counting>, Arc<MemoryFileAccess>, Arc<ManualTaskPool>) {
        let files = Arc::new(MemoryFileAccess::new());
        let pool = Arc::new(ManualTaskPool::new());
        let mut cache = MediaCache::new("blob", Counting::default(), files.clone(), pool.clone());
        cache.register_reader(BlobReader);
        (cache, files, pool)
    }

    #[test]
    fn relative_and_absolute_spellings_dedupe() {
        let (mut cache, _files, _pool) = cache();
        let a = cache.reference(&["a.bin"]).unwrap();
        let b = cache.reference(&["/a.bin"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.ref_count(a), Some(2));
    }

    #[test]
    fn failed_reference_leaves_no_trace() {
        let (mut cache, _files, pool) = cache();
        assert!(matches!(
            cache.reference(&["a.wav"]),
            Err(MediaError::NoReader { .. })
        ));
        assert!(matches!(
            cache.reference(&["a.bin", ""]),
            Err(MediaError::EmptyPath { index: 1 })
        ));
        assert_eq!(pool.pending(), 0);
        assert_eq!(cache.report_status().identities, 0);
    }

    #[test]
    fn object_based_media_is_ready_immediately() {
        let (mut cache, _files, _pool) = cache();
        let handle = cache.reference_media(vec![Blob]).unwrap();
        assert_eq!(cache.state(handle).unwrap(), LoadState::Ready);
        assert_eq!(cache.get(handle), Some(&1));
        assert!(!cache.is_loading());

        let other = cache.reference_media(vec![Blob]).unwrap();
        assert_ne!(handle, other);
    }

    #[test]
    fn reset_unloads_everything_and_forgets_handles() {
        let (mut cache, files, pool) = cache();
        files.insert("/a.bin", b"".to_vec());
        let a = cache.reference(&["/a.bin"]).unwrap();
        let b = cache.reference_media(vec![Blob]).unwrap();
        let c = cache.reference_media(vec![Blob]).unwrap();
        pool.run_pending();
        cache.load_ready();
        cache.unreference(c).unwrap();

        cache.reset();
        assert_eq!(cache.conversion().unloads, 3);
        assert!(matches!(cache.state(a), Err(MediaError::NotTracked(_))));
        assert!(matches!(cache.unreference(b), Err(MediaError::NotTracked(_))));
        assert!(!cache.can_unload());
        assert!(!cache.is_loading());
    }
}
