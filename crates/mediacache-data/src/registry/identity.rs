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

use mediacache_core::JoinKey;

/// How an Identity was requested. Resolved once, at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityKind {
    /// Requested by an ordered list of source paths.
    FileBased {
        /// The fully-qualified source paths.
        paths: Vec<String>,
        /// The deduplication key derived from `paths`.
        key: JoinKey,
    },
    /// Requested with pre-built media objects.
    ObjectBased,
}

impl IdentityKind {
    /// Returns `true` for identities built from caller-supplied media.
    pub fn is_object_based(&self) -> bool {
        matches!(self, IdentityKind::ObjectBased)
    }

    /// The source paths of a path-based Identity.
    pub fn paths(&self) -> Option<&[String]> {
        match self {
            IdentityKind::FileBased { paths, .. } => Some(paths),
            IdentityKind::ObjectBased => None,
        }
    }
}

/// The registry's record of one logical, deduplicated media reference.
#[derive(Debug, Clone)]
pub struct Identity {
    pub(crate) id: u64,
    pub(crate) kind: IdentityKind,
    pub(crate) ref_count: usize,
}

impl Identity {
    pub(crate) fn new(id: u64, kind: IdentityKind) -> Self {
        Self {
            id,
            kind,
            ref_count: 1,
        }
    }

    /// The Identity id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// How this Identity was requested.
    pub fn kind(&self) -> &IdentityKind {
        &self.kind
    }

    /// The number of outstanding references.
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }
}
