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

//! # Media Cache Core
//!
//! Foundational crate containing the contracts and primitive types shared by
//! every layer of the media cache: handles, collaborator traits, the error
//! taxonomy and configuration.

#![warn(missing_docs)]

pub mod config;
pub mod conversion;
pub mod error;
pub mod fs;
pub mod lifecycle;
pub mod media;
pub mod reader;
pub mod task;

pub use config::CacheConfig;
pub use error::{BoxError, LoadError, LoadFailure, MediaError};
pub use lifecycle::MediaLifecycle;
pub use media::{CacheId, JoinKey, Media, MediaHandle};
