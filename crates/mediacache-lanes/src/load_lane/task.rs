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

//! The body of one background read task.

use super::{LoadGroup, ResolvedSource, SlotOutcome};
use mediacache_core::{fs::FileAccess, task::CancellationFlag, LoadError, Media};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// One background read, bound to its slot in a load group.
///
/// The slot is reported exactly once: by [`run`](Self::run), or by `Drop`
/// when a pool discards the task without running it. A dropped task counts
/// as [`LoadError::Rejected`] so its group still completes.
pub(crate) struct ReadTask<M: Media> {
    group: Arc<LoadGroup<M>>,
    slot: usize,
    source: Option<ResolvedSource<M>>,
    files: Arc<dyn FileAccess>,
}

impl<M: Media> ReadTask<M> {
    pub(crate) fn new(
        group: Arc<LoadGroup<M>>,
        slot: usize,
        source: ResolvedSource<M>,
        files: Arc<dyn FileAccess>,
    ) -> Self {
        Self {
            group,
            slot,
            source: Some(source),
            files,
        }
    }

    /// Reads the source and reports the outcome.
    pub(crate) fn run(mut self) {
        let Some(source) = self.source.take() else {
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            read_source(self.group.cancellation(), &source, self.files.as_ref())
        }))
        .unwrap_or_else(|_| {
            log::error!("Reader panicked while reading '{}'", source.path);
            SlotOutcome::Failed(LoadError::Panicked {
                path: source.path.clone(),
            })
        });
        self.group.complete(self.slot, outcome);
    }
}

impl<M: Media> Drop for ReadTask<M> {
    fn drop(&mut self) {
        let Some(source) = self.source.take() else {
            return;
        };
        let outcome = if self.group.is_cancelled() {
            SlotOutcome::Cancelled
        } else {
            log::warn!("Read of '{}' was dropped without running", source.path);
            SlotOutcome::Failed(LoadError::Rejected { path: source.path })
        };
        self.group.complete(self.slot, outcome);
    }
}

fn read_source<M: Media>(
    cancel: &CancellationFlag,
    source: &ResolvedSource<M>,
    files: &dyn FileAccess,
) -> SlotOutcome<M> {
    if cancel.is_cancelled() {
        return SlotOutcome::Cancelled;
    }

    if !files.exists(&source.path) {
        return SlotOutcome::Failed(LoadError::NotFound {
            path: source.path.clone(),
        });
    }

    if cancel.is_cancelled() {
        return SlotOutcome::Cancelled;
    }

    let stream = match files.open(&source.path) {
        Ok(stream) => stream,
        Err(source_error) => {
            return SlotOutcome::Failed(LoadError::Open {
                path: source.path.clone(),
                source: source_error,
            })
        }
    };

    if cancel.is_cancelled() {
        return SlotOutcome::Cancelled;
    }

    log::trace!("Reading '{}'", source.path);
    let media = match source.reader.read(stream, &source.path, &source.extension) {
        Ok(media) => media,
        Err(source_error) => {
            return SlotOutcome::Failed(LoadError::Read {
                path: source.path.clone(),
                source: source_error,
            })
        }
    };

    // Work finished after cancellation is discarded here, on the worker.
    if cancel.is_cancelled() {
        return SlotOutcome::Cancelled;
    }

    SlotOutcome::Loaded(media)
}
