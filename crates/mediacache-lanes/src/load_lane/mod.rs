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

//! The Load Orchestrator: turns a new path-based Identity into a group of
//! background read tasks and reports when that group has finished.
//!
//! One task is launched per source path. All tasks of an Identity share one
//! [`LoadGroup`], which owns a fixed result slot per path, a completion
//! counter and a cancellation flag. The control thread never waits on a
//! task: it checks the counter and harvests the slots once every task has
//! reported.

mod group;
mod orchestrator;
mod readers;
mod task;

pub use group::*;
pub use orchestrator::*;
pub use readers::*;
