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

use super::{task::ReadTask, LoadGroup, ReaderRegistry, ResolvedSource, SlotOutcome};
use mediacache_core::{
    fs::FileAccess, reader::MediaReader, task::TaskPool, LoadFailure, Media, MediaError,
};
use std::{collections::BTreeMap, sync::Arc};

/// Background work in flight for one Identity.
pub struct PendingLoad<M: Media> {
    paths: Vec<String>,
    group: Arc<LoadGroup<M>>,
}

impl<M: Media> PendingLoad<M> {
    /// The fully-qualified source paths, in slot order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The shared task-group state.
    pub fn group(&self) -> &LoadGroup<M> {
        &self.group
    }
}

/// A harvested load group, ready for the control thread to act on.
#[derive(Debug)]
pub enum LoadOutcome<M> {
    /// Every read succeeded.
    Loaded {
        /// The Identity the media belong to.
        id: u64,
        /// One media object per source path, in path order.
        media: Vec<M>,
        /// The fully-qualified source paths.
        paths: Vec<String>,
    },
    /// At least one read failed.
    Failed {
        /// The Identity that failed.
        id: u64,
        /// Every error of the group, in path order.
        failure: LoadFailure,
    },
    /// The group was cancelled; its results are discarded.
    Cancelled {
        /// The Identity whose group was cancelled.
        id: u64,
    },
}

/// Launches and tracks the background reads of path-based identities.
///
/// Owned by the control thread. At most one [`PendingLoad`] exists per
/// Identity; it lives from [`begin`](Self::begin) until the group is
/// harvested by [`take_finished`](Self::take_finished) or dropped by
/// [`cancel_all`](Self::cancel_all).
pub struct LoadOrchestrator<M: Media> {
    readers: ReaderRegistry<M>,
    files: Arc<dyn FileAccess>,
    pool: Arc<dyn TaskPool>,
    pending: BTreeMap<u64, PendingLoad<M>>,
}

impl<M: Media> LoadOrchestrator<M> {
    /// Creates an orchestrator that reads through `files` on `pool`.
    pub fn new(files: Arc<dyn FileAccess>, pool: Arc<dyn TaskPool>) -> Self {
        Self {
            readers: ReaderRegistry::new(),
            files,
            pool,
            pending: BTreeMap::new(),
        }
    }

    /// Registers a reader. Earlier registrations take precedence.
    pub fn register_reader(&mut self, reader: impl MediaReader<M> + 'static) {
        self.readers.register(reader);
    }

    /// The file-access collaborator used for every path.
    pub fn files(&self) -> &dyn FileAccess {
        self.files.as_ref()
    }

    /// Resolves a reader for every path. See [`ReaderRegistry::resolve`].
    pub fn resolve(&self, paths: &[String]) -> Result<Vec<ResolvedSource<M>>, MediaError> {
        self.readers.resolve(self.files.as_ref(), paths)
    }

    /// Launches one read task per source for Identity `id`.
    ///
    /// A task the pool refuses, or discards without running, is reported as
    /// [`LoadError::Rejected`](mediacache_core::LoadError::Rejected) in its
    /// slot, so the group still completes.
    pub fn begin(&mut self, id: u64, sources: Vec<ResolvedSource<M>>) {
        if self.pending.contains_key(&id) {
            log::warn!("Identity {id} already has a pending load; ignoring second start");
            return;
        }

        let group = Arc::new(LoadGroup::new(sources.len()));
        let paths: Vec<String> = sources.iter().map(|s| s.path.clone()).collect();
        log::debug!("Starting load of identity {id}: {paths:?}");

        for (slot, source) in sources.into_iter().enumerate() {
            let path = source.path.clone();
            let task = ReadTask::new(Arc::clone(&group), slot, source, Arc::clone(&self.files));
            // A refused task is dropped by the pool, which reports its slot.
            if let Err(e) = self.pool.spawn(Box::new(move || task.run())) {
                log::error!("Could not schedule read of '{path}': {e}");
            }
        }

        self.pending.insert(id, PendingLoad { paths, group });
    }

    /// Signals cancellation to the pending load of `id`.
    ///
    /// The group stays tracked until its tasks have all reported; the next
    /// [`take_finished`](Self::take_finished) then discards it. Returns
    /// `true` if a pending load existed.
    pub fn cancel(&mut self, id: u64) -> bool {
        match self.pending.get(&id) {
            Some(pending) => {
                log::debug!("Cancelling load of identity {id}");
                pending.group.cancellation().cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every pending load and stops tracking them.
    pub fn cancel_all(&mut self) {
        for pending in self.pending.values() {
            pending.group.cancellation().cancel();
        }
        self.pending.clear();
    }

    /// Returns `true` if any pending load has not been harvested yet.
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns `true` if `id` has a pending load.
    pub fn is_pending(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    /// Returns the pending load of `id`.
    pub fn get(&self, id: u64) -> Option<&PendingLoad<M>> {
        self.pending.get(&id)
    }

    /// The number of pending loads.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns every completed group, in Identity order.
    ///
    /// Cancelled groups are returned as [`LoadOutcome::Cancelled`] and do not
    /// count towards `limit`. Never blocks.
    pub fn take_finished(&mut self, limit: Option<usize>) -> Vec<LoadOutcome<M>> {
        let mut outcomes = Vec::new();
        let mut promoted = 0usize;
        let finished: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.group.is_complete())
            .map(|(id, _)| *id)
            .collect();

        for id in finished {
            let cancelled = self
                .pending
                .get(&id)
                .is_some_and(|pending| pending.group.is_cancelled());
            if !cancelled && limit.is_some_and(|limit| promoted >= limit) {
                continue;
            }
            let Some(pending) = self.pending.remove(&id) else {
                continue;
            };
            let outcome = Self::collect(id, pending);
            if !matches!(outcome, LoadOutcome::Cancelled { .. }) {
                promoted += 1;
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    fn collect(id: u64, pending: PendingLoad<M>) -> LoadOutcome<M> {
        if pending.group.is_cancelled() {
            log::trace!("Discarding cancelled load of identity {id}");
            return LoadOutcome::Cancelled { id };
        }
        let Some(slots) = pending.group.harvest() else {
            return LoadOutcome::Cancelled { id };
        };

        let mut media = Vec::with_capacity(slots.len());
        let mut errors = Vec::new();
        let mut cancelled = false;
        for slot in slots {
            match slot {
                SlotOutcome::Loaded(item) => media.push(item),
                SlotOutcome::Failed(error) => errors.push(error),
                SlotOutcome::Cancelled => cancelled = true,
            }
        }

        if !errors.is_empty() {
            return LoadOutcome::Failed {
                id,
                failure: LoadFailure::new(errors),
            };
        }
        if cancelled {
            return LoadOutcome::Cancelled { id };
        }
        LoadOutcome::Loaded {
            id,
            media,
            paths: pending.paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediacache_core::{error::BoxError, fs::MediaStream, LoadError};
    use mediacache_infra::{
        fs::MemoryFileAccess,
        task::{ManualTaskPool, TokioTaskPool},
    };
    use std::{
        io::Read,
        thread,
        time::{Duration, Instant},
    };

    #[derive(Debug)]
    struct Text(String);
    impl Media for Text {}

    struct TextReader;
    impl MediaReader<Text> for TextReader {
        fn supports(&self, extension: &str) -> bool {
            extension == "txt"
        }

        fn read(&self, mut stream: MediaStream, _path: &str, _ext: &str) -> Result<Text, BoxError> {
            let mut text = String::new();
            stream.read_to_string(&mut text)?;
            Ok(Text(text))
        }
    }

    fn setup() -> (LoadOrchestrator<Text>, Arc<MemoryFileAccess>, Arc<ManualTaskPool>) {
        let files = Arc::new(MemoryFileAccess::new());
        let pool = Arc::new(ManualTaskPool::new());
        let mut orchestrator = LoadOrchestrator::new(files.clone(), pool.clone());
        orchestrator.register_reader(TextReader);
        (orchestrator, files, pool)
    }

    fn start(orchestrator: &mut LoadOrchestrator<Text>, id: u64, paths: &[&str]) {
        let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        let sources = orchestrator.resolve(&paths).unwrap();
        orchestrator.begin(id, sources);
    }

    #[test]
    fn multi_path_group_is_only_reported_when_all_tasks_finish() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"alpha".to_vec());
        files.insert("/b.txt", b"beta".to_vec());

        start(&mut orchestrator, 1, &["/a.txt", "/b.txt"]);
        assert!(orchestrator.is_loading());
        assert_eq!(pool.pending(), 2);

        assert!(pool.run_one());
        assert!(orchestrator.take_finished(None).is_empty());

        assert!(pool.run_one());
        let outcomes = orchestrator.take_finished(None);
        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            LoadOutcome::Loaded { id, media, paths } => {
                assert_eq!(*id, 1);
                assert_eq!(media[0].0, "alpha");
                assert_eq!(media[1].0, "beta");
                assert_eq!(paths, &["/a.txt".to_string(), "/b.txt".to_string()]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!orchestrator.is_loading());
    }

    #[test]
    fn missing_file_fails_the_identity() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"alpha".to_vec());

        start(&mut orchestrator, 1, &["/a.txt", "/missing.txt"]);
        pool.run_pending();

        match orchestrator.take_finished(None).pop() {
            Some(LoadOutcome::Failed { id, failure }) => {
                assert_eq!(id, 1);
                assert_eq!(failure.errors().len(), 1);
                assert!(matches!(
                    &failure.errors()[0],
                    LoadError::NotFound { path } if path == "/missing.txt"
                ));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn cancelled_group_is_discarded_after_its_tasks_report() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"alpha".to_vec());

        start(&mut orchestrator, 7, &["/a.txt"]);
        assert!(orchestrator.cancel(7));
        assert!(orchestrator.is_loading());
        assert!(orchestrator.take_finished(None).is_empty());

        pool.run_pending();
        let outcomes = orchestrator.take_finished(None);
        assert!(matches!(outcomes[..], [LoadOutcome::Cancelled { id: 7 }]));
        assert!(!orchestrator.is_loading());
    }

    #[test]
    fn promotion_limit_defers_extra_groups() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"a".to_vec());
        files.insert("/b.txt", b"b".to_vec());

        start(&mut orchestrator, 1, &["/a.txt"]);
        start(&mut orchestrator, 2, &["/b.txt"]);
        pool.run_pending();

        assert_eq!(orchestrator.take_finished(Some(1)).len(), 1);
        assert!(orchestrator.is_pending(2));
        assert_eq!(orchestrator.take_finished(Some(1)).len(), 1);
        assert!(!orchestrator.is_loading());
    }

    #[test]
    fn rejected_tasks_complete_the_group_with_a_failure() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"a".to_vec());
        pool.shutdown();

        start(&mut orchestrator, 1, &["/a.txt"]);
        match orchestrator.take_finished(None).pop() {
            Some(LoadOutcome::Failed { failure, .. }) => {
                assert!(matches!(failure.errors()[0], LoadError::Rejected { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn discarded_tasks_complete_the_group_with_a_failure() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"a".to_vec());
        files.insert("/b.txt", b"b".to_vec());

        start(&mut orchestrator, 1, &["/a.txt", "/b.txt"]);
        assert!(pool.run_one());
        assert_eq!(pool.discard_pending(), 1);

        match orchestrator.take_finished(None).pop() {
            Some(LoadOutcome::Failed { failure, .. }) => {
                assert_eq!(failure.errors().len(), 1);
                assert!(matches!(
                    &failure.errors()[0],
                    LoadError::Rejected { path } if path == "/b.txt"
                ));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!orchestrator.is_loading());
    }

    #[test]
    fn discarded_tasks_of_a_cancelled_group_are_discarded_silently() {
        let (mut orchestrator, files, pool) = setup();
        files.insert("/a.txt", b"a".to_vec());

        start(&mut orchestrator, 3, &["/a.txt"]);
        orchestrator.cancel(3);
        pool.discard_pending();

        let outcomes = orchestrator.take_finished(None);
        assert!(matches!(outcomes[..], [LoadOutcome::Cancelled { id: 3 }]));
    }

    #[test]
    fn tasks_dropped_by_a_stopped_runtime_fail_the_identity() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let handle = runtime.handle().clone();
        drop(runtime);

        let files = Arc::new(MemoryFileAccess::new());
        files.insert("/a.txt", b"a".to_vec());
        let pool = Arc::new(TokioTaskPool::new(handle));
        let mut orchestrator = LoadOrchestrator::new(files, pool);
        orchestrator.register_reader(TextReader);
        start(&mut orchestrator, 1, &["/a.txt"]);

        let deadline = Instant::now() + Duration::from_secs(5);
        let outcome = loop {
            if let Some(outcome) = orchestrator.take_finished(None).pop() {
                break outcome;
            }
            assert!(Instant::now() < deadline, "group never completed");
            thread::sleep(Duration::from_millis(5));
        };
        match outcome {
            LoadOutcome::Failed { failure, .. } => {
                assert!(matches!(failure.errors()[0], LoadError::Rejected { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn panicking_reader_is_reported_as_failure() {
        struct PanicReader;
        impl MediaReader<Text> for PanicReader {
            fn supports(&self, extension: &str) -> bool {
                extension == "bad"
            }

            fn read(&self, _s: MediaStream, _p: &str, _e: &str) -> Result<Text, BoxError> {
                panic!("corrupt header");
            }
        }

        let (mut orchestrator, files, pool) = setup();
        orchestrator.register_reader(PanicReader);
        files.insert("/x.bad", b"".to_vec());

        start(&mut orchestrator, 1, &["/x.bad"]);
        pool.run_pending();
        match orchestrator.take_finished(None).pop() {
            Some(LoadOutcome::Failed { failure, .. }) => {
                assert!(matches!(failure.errors()[0], LoadError::Panicked { .. }));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
