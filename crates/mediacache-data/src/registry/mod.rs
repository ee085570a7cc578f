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

//! Assigns stable identities to logical media and tracks their reference
//! counts.

mod identity;

pub use identity::*;

use ahash::AHashMap;
use mediacache_core::{CacheId, JoinKey, MediaError, MediaHandle};

/// The outcome of releasing one reference.
#[derive(Debug)]
pub enum Release {
    /// Other references remain; the Identity is still tracked.
    Retained {
        /// The reference count after the release.
        remaining: usize,
    },
    /// The last reference was released and the Identity was removed.
    Destroyed(Identity),
}

/// The owner of every [`Identity`] of one cache.
///
/// Path-based identities are deduplicated through their [`JoinKey`];
/// object-based identities never are. Ids come from a counter owned by the
/// registry, start at 1, and are never reused.
#[derive(Debug)]
pub struct ReferenceRegistry {
    owner: CacheId,
    next_id: u64,
    identities: AHashMap<u64, Identity>,
    by_key: AHashMap<JoinKey, u64>,
}

impl ReferenceRegistry {
    /// Creates an empty registry issuing handles on behalf of `owner`.
    pub fn new(owner: CacheId) -> Self {
        Self {
            owner,
            next_id: 1,
            identities: AHashMap::new(),
            by_key: AHashMap::new(),
        }
    }

    /// The cache instance this registry issues handles for.
    pub fn owner(&self) -> CacheId {
        self.owner
    }

    /// Adds a reference to the path-based Identity for `key`, if one exists.
    pub fn acquire(&mut self, key: &JoinKey) -> Option<MediaHandle> {
        let id = *self.by_key.get(key)?;
        let identity = self.identities.get_mut(&id)?;
        identity.ref_count += 1;
        log::trace!(
            "Identity {id} referenced again (count {})",
            identity.ref_count
        );
        Some(MediaHandle::new(self.owner, id))
    }

    /// Registers a new path-based Identity with a count of one.
    ///
    /// The caller must have checked with [`acquire`](Self::acquire) that no
    /// Identity exists for `key`.
    pub fn register_file_based(&mut self, paths: Vec<String>, key: JoinKey) -> MediaHandle {
        let id = self.allocate_id();
        debug_assert!(!self.by_key.contains_key(&key));
        self.by_key.insert(key.clone(), id);
        self.identities.insert(
            id,
            Identity::new(id, IdentityKind::FileBased { paths, key }),
        );
        MediaHandle::new(self.owner, id)
    }

    /// Registers a new, never-deduplicated object-based Identity.
    pub fn register_object_based(&mut self) -> MediaHandle {
        let id = self.allocate_id();
        self.identities
            .insert(id, Identity::new(id, IdentityKind::ObjectBased));
        MediaHandle::new(self.owner, id)
    }

    /// Releases one reference held through `handle`.
    ///
    /// # Errors
    /// Returns [`MediaError::NotTracked`] without touching any state if the
    /// handle was issued by another cache or its Identity is gone.
    pub fn release(&mut self, handle: MediaHandle) -> Result<Release, MediaError> {
        let id = self.resolve(handle)?;
        let identity = self
            .identities
            .get_mut(&id)
            .ok_or(MediaError::NotTracked(handle))?;

        identity.ref_count -= 1;
        if identity.ref_count > 0 {
            return Ok(Release::Retained {
                remaining: identity.ref_count,
            });
        }

        let identity = self
            .identities
            .remove(&id)
            .ok_or(MediaError::NotTracked(handle))?;
        if let IdentityKind::FileBased { key, .. } = &identity.kind {
            self.by_key.remove(key);
        }
        log::trace!("Identity {id} released");
        Ok(Release::Destroyed(identity))
    }

    /// Returns the Identity `handle` points at.
    pub fn get(&self, handle: MediaHandle) -> Option<&Identity> {
        if handle.owner() != self.owner {
            return None;
        }
        self.identities.get(&handle.id())
    }

    /// Returns the tracked Identity id for `handle`.
    ///
    /// # Errors
    /// Returns [`MediaError::NotTracked`] for foreign or released handles.
    pub fn resolve(&self, handle: MediaHandle) -> Result<u64, MediaError> {
        self.get(handle)
            .map(|identity| identity.id)
            .ok_or(MediaError::NotTracked(handle))
    }

    /// Returns `true` if Identity `id` is still tracked.
    pub fn contains_id(&self, id: u64) -> bool {
        self.identities.contains_key(&id)
    }

    /// Returns the number of tracked identities.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Returns `true` if no Identity is tracked.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Forgets every Identity. The id counter keeps running.
    pub fn clear(&mut self) {
        self.identities.clear();
        self.by_key.clear();
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(paths: &[&str]) -> JoinKey {
        JoinKey::from_paths(paths)
    }

    fn register(registry: &mut ReferenceRegistry, paths: &[&str]) -> MediaHandle {
        let key = key(paths);
        match registry.acquire(&key) {
            Some(handle) => handle,
            None => registry
                .register_file_based(paths.iter().map(|p| p.to_string()).collect(), key),
        }
    }

    #[test]
    fn equal_path_sets_share_one_identity() {
        let mut registry = ReferenceRegistry::new(CacheId::new());
        let first = register(&mut registry, &["/a.tex"]);
        let second = register(&mut registry, &["/a.tex"]);

        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(first).unwrap().ref_count(), 2);

        assert!(matches!(
            registry.release(first).unwrap(),
            Release::Retained { remaining: 1 }
        ));
        assert!(matches!(
            registry.release(second).unwrap(),
            Release::Destroyed(_)
        ));
        assert!(registry.is_empty());
        assert!(registry.acquire(&key(&["/a.tex"])).is_none());
    }

    #[test]
    fn object_based_identities_are_never_shared() {
        let mut registry = ReferenceRegistry::new(CacheId::new());
        let a = registry.register_object_based();
        let b = registry.register_object_based();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(a).unwrap().kind().is_object_based());
    }

    #[test]
    fn releasing_unknown_handle_fails_without_mutation() {
        let mut registry = ReferenceRegistry::new(CacheId::new());
        let handle = register(&mut registry, &["/a.tex"]);
        let foreign = MediaHandle::new(CacheId::new(), handle.id());

        assert!(matches!(
            registry.release(foreign),
            Err(MediaError::NotTracked(_))
        ));
        assert_eq!(registry.get(handle).unwrap().ref_count(), 1);

        registry.release(handle).unwrap();
        assert!(matches!(
            registry.release(handle),
            Err(MediaError::NotTracked(_))
        ));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = ReferenceRegistry::new(CacheId::new());
        let first = register(&mut registry, &["/a.tex"]);
        registry.release(first).unwrap();
        let second = register(&mut registry, &["/a.tex"]);
        assert!(second.id() > first.id());

        registry.clear();
        let third = registry.register_object_based();
        assert!(third.id() > second.id());
    }
}
