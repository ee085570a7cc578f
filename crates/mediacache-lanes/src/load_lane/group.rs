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

use mediacache_core::{task::CancellationFlag, LoadError, Media};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, PoisonError,
};

/// What one read task left in its slot.
#[derive(Debug)]
pub enum SlotOutcome<M> {
    /// The reader produced a media object.
    Loaded(M),
    /// The read failed.
    Failed(LoadError),
    /// The task observed cancellation and stopped early.
    Cancelled,
}

/// The shared state of the read tasks of one Identity.
///
/// Each task owns exactly one slot, writes it once, then bumps the
/// completion counter. The group is complete when the counter reaches the
/// number of slots; only then does the control thread read the slots.
#[derive(Debug)]
pub struct LoadGroup<M> {
    slots: Vec<Mutex<Option<SlotOutcome<M>>>>,
    completed: AtomicUsize,
    cancel: CancellationFlag,
}

impl<M: Media> LoadGroup<M> {
    /// Creates a group with `size` empty slots.
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| Mutex::new(None)).collect(),
            completed: AtomicUsize::new(0),
            cancel: CancellationFlag::new(),
        }
    }

    /// The number of slots, i.e. the number of tasks expected to report.
    pub fn expected(&self) -> usize {
        self.slots.len()
    }

    /// The number of tasks that have reported so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Returns `true` once every task has reported.
    pub fn is_complete(&self) -> bool {
        self.completed() == self.expected()
    }

    /// The cancellation flag shared by every task of the group.
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancel
    }

    /// Returns `true` if the group has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stores the outcome of the task owning `slot`.
    ///
    /// A slot is written once; a second report for the same slot is ignored
    /// so the counter can never overshoot.
    pub fn complete(&self, slot: usize, outcome: SlotOutcome<M>) {
        let Some(cell) = self.slots.get(slot) else {
            log::warn!("Ignoring report for out-of-range slot {slot}");
            return;
        };
        let mut cell = cell.lock().unwrap_or_else(PoisonError::into_inner);
        if cell.is_some() {
            log::warn!("Ignoring duplicate report for slot {slot}");
            return;
        }
        *cell = Some(outcome);
        drop(cell);
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Takes every slot outcome, in slot order.
    ///
    /// Returns `None` if the group is not complete yet.
    pub fn harvest(&self) -> Option<Vec<SlotOutcome<M>>> {
        if !self.is_complete() {
            return None;
        }
        let outcomes = self
            .slots
            .iter()
            .map(|cell| {
                cell.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take()
                    .unwrap_or(SlotOutcome::Cancelled)
            })
            .collect();
        Some(outcomes)
    }
}
