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

//! Acts as the **[A]gent** for the media subsystem.
//!
//! This module is the public-facing API for requesting media and querying
//! their state. It owns the reference registry, the implementation store and
//! the load orchestrator of one category, and delegates the heavy lifting of
//! reading to the load lane and of converting to the caller's
//! [`ConversionService`](mediacache_core::conversion::ConversionService).

mod aggregate;
mod cache;
mod status;

pub use aggregate::*;
pub use cache::*;
pub use status::*;
