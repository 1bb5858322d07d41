//! Resource table
//!
//! Sole owner of every loaded resource of one kind, keyed by [`AudioId`].

use crate::audio::backend::AudioBackend;
use crate::audio::{AudioError, AudioId, AudioResource, AudioResult};
use std::collections::HashMap;

/// Identifier-keyed storage of loaded resources
pub struct ResourceTable<B: AudioBackend> {
    resources: HashMap<AudioId, AudioResource<B>>,
}

impl<B: AudioBackend> ResourceTable<B> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    /// Insert a resource under its own identifier
    ///
    /// # Panics
    /// If the identifier is already present. Identifiers come from the
    /// manager's allocator, so a collision is a bug, not a user error.
    pub(crate) fn insert(&mut self, resource: AudioResource<B>) {
        let id = resource.id();
        let previous = self.resources.insert(id, resource);
        assert!(previous.is_none(), "audio id {id} inserted twice");
    }

    /// Take a resource out of the table
    pub(crate) fn remove(&mut self, id: AudioId) -> Option<AudioResource<B>> {
        self.resources.remove(&id)
    }

    /// Look up a resource
    ///
    /// # Errors
    /// `InvalidId` if nothing is loaded under `id`.
    pub fn get(&self, id: AudioId) -> AudioResult<&AudioResource<B>> {
        self.resources.get(&id).ok_or(AudioError::InvalidId(id))
    }

    /// Look up a resource for mutation
    ///
    /// # Errors
    /// `InvalidId` if nothing is loaded under `id`.
    pub(crate) fn get_mut(&mut self, id: AudioId) -> AudioResult<&mut AudioResource<B>> {
        self.resources.get_mut(&id).ok_or(AudioError::InvalidId(id))
    }

    /// Whether `id` is loaded
    pub fn contains(&self, id: AudioId) -> bool {
        self.resources.contains_key(&id)
    }

    /// Identifiers of all loaded resources, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = AudioId> + '_ {
        self.resources.keys().copied()
    }

    /// All loaded resources, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &AudioResource<B>> {
        self.resources.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut AudioResource<B>> {
        self.resources.values_mut()
    }

    /// Empty the table, handing back every resource
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = AudioResource<B>> + '_ {
        self.resources.drain().map(|(_, resource)| resource)
    }

    /// Number of loaded resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<B: AudioBackend> Default for ResourceTable<B> {
    fn default() -> Self {
        Self::new()
    }
}
