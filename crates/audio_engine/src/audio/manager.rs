//! Resource manager
//!
//! Owns every loaded resource of one kind and exposes the playback control
//! surface over them. Callers only ever hold [`AudioId`]s.
//!
//! Loading runs validator → allocator → handle construction → table insert.
//! Unloading runs table removal → handle release. Nothing else releases a
//! handle, and dropping the manager unloads everything.
//!
//! # Example
//!
//! ```
//! use audio_engine::audio::backend::headless::HeadlessBackend;
//! use audio_engine::audio::{LoadOptions, ResourceManager};
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("laser.wav");
//! # std::fs::write(&path, b"RIFF").unwrap();
//!
//! let mut sounds = ResourceManager::clips(HeadlessBackend::default());
//! let id = sounds.load_with(&path, LoadOptions::default().with_volume(80.0)).unwrap();
//!
//! sounds.play(id).unwrap();
//! assert!(sounds.is_playing(id).unwrap());
//!
//! sounds.unload(id).unwrap();
//! assert_eq!(sounds.get_count(), 0);
//! ```

use crate::audio::backend::{AudioBackend, PlaybackStatus};
use crate::audio::loader::{build_handle, LoadOptions};
use crate::audio::validator::{self, LoadValidator};
use crate::audio::{AudioId, AudioResource, AudioResult, IdAllocator, ResourceKind, ResourceTable};
use std::path::Path;
use std::time::Duration;

/// Manager of all loaded resources of one kind
pub struct ResourceManager<B: AudioBackend> {
    backend: B,
    kind: ResourceKind,
    defaults: LoadOptions,
    ids: IdAllocator,
    validator: LoadValidator,
    table: ResourceTable<B>,
}

impl<B: AudioBackend> ResourceManager<B> {
    /// Manager for buffered clips (short effects, decoded into memory)
    pub fn clips(backend: B) -> Self {
        Self::new(backend, ResourceKind::BufferedClip)
    }

    /// Manager for streamed tracks (music, decoded while playing)
    pub fn tracks(backend: B) -> Self {
        Self::new(backend, ResourceKind::StreamedTrack)
    }

    /// Manager for resources of `kind`
    pub fn new(backend: B, kind: ResourceKind) -> Self {
        Self {
            backend,
            kind,
            defaults: LoadOptions::default(),
            ids: IdAllocator::new(),
            validator: LoadValidator::new(),
            table: ResourceTable::new(),
        }
    }

    /// Replace the options used by [`load`](Self::load)
    pub fn with_defaults(mut self, defaults: LoadOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Resource kind held by this manager
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Options used by [`load`](Self::load)
    pub const fn defaults(&self) -> LoadOptions {
        self.defaults
    }

    // ---- Loading ----

    /// Load `path` with this manager's default options
    ///
    /// # Errors
    /// See [`load_with`](Self::load_with).
    pub fn load(&mut self, path: impl AsRef<Path>) -> AudioResult<AudioId> {
        self.load_with(path, self.defaults)
    }

    /// Load `path` and return the identifier of the new resource
    ///
    /// Nothing is constructed unless validation passes, and nothing is
    /// inserted unless the handle was built.
    ///
    /// # Errors
    /// - `InvalidPath`, `UnsupportedFileType`, `CapacityExceeded` from validation
    /// - `IdSpaceExhausted` if the allocator is used up
    /// - `DecodeFailed` if the backend cannot open the file
    pub fn load_with(&mut self, path: impl AsRef<Path>, options: LoadOptions) -> AudioResult<AudioId> {
        let path = path.as_ref();
        self.validator.validate(path, self.table.len())?;

        let id = self.ids.next()?;
        let settings = options.handle_settings();
        let (handle, duration) = build_handle(&self.backend, self.kind, path, &settings)?;

        let resource = AudioResource::new(
            id,
            path.to_string_lossy().into_owned(),
            settings.looping,
            settings.volume,
            settings.pitch,
            duration,
            handle,
        );
        self.table.insert(resource);

        log::debug!("Loaded {} {} from {:?} ({:?})", self.kind, id, path, duration);
        Ok(id)
    }

    /// Release one resource and forget its identifier
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded, including when it was already unloaded.
    pub fn unload(&mut self, id: AudioId) -> AudioResult<()> {
        // Look up first so a bad id reports the same error as everywhere else
        self.table.get(id)?;
        if let Some(resource) = self.table.remove(id) {
            resource.release();
        }
        Ok(())
    }

    /// Release every resource
    pub fn unload_all(&mut self) {
        for resource in self.table.drain() {
            resource.release();
        }
    }

    // ---- Playback control ----

    /// Start playback
    ///
    /// # Errors
    /// - `InvalidId` if `id` is not loaded
    /// - `PlaybackFailed` or `DecodeFailed` from the backend
    pub fn play(&mut self, id: AudioId) -> AudioResult<()> {
        self.table.get_mut(id)?.handle_mut().play()
    }

    /// Start playback of every resource
    ///
    /// A resource whose backend refuses to play is logged and skipped.
    pub fn play_all(&mut self) {
        for resource in self.table.iter_mut() {
            if let Err(e) = resource.handle_mut().play() {
                log::warn!("Failed to play {} {}: {e}", self.kind, resource.id());
            }
        }
    }

    /// Pause playback
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn pause(&mut self, id: AudioId) -> AudioResult<()> {
        self.table.get_mut(id)?.handle_mut().pause();
        Ok(())
    }

    /// Pause every resource
    pub fn pause_all(&mut self) {
        for resource in self.table.iter_mut() {
            resource.handle_mut().pause();
        }
    }

    /// Resume from the paused position
    ///
    /// # Errors
    /// See [`play`](Self::play).
    pub fn unpause(&mut self, id: AudioId) -> AudioResult<()> {
        self.play(id)
    }

    /// Resume every resource
    pub fn unpause_all(&mut self) {
        self.play_all();
    }

    /// Stop playback
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn stop(&mut self, id: AudioId) -> AudioResult<()> {
        self.table.get_mut(id)?.handle_mut().stop();
        Ok(())
    }

    /// Stop every resource
    pub fn stop_all(&mut self) {
        for resource in self.table.iter_mut() {
            resource.handle_mut().stop();
        }
    }

    // ---- Setters ----

    /// Set volume, clamped to `0..=100`
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn set_volume(&mut self, id: AudioId, volume: f32) -> AudioResult<()> {
        self.table.get_mut(id)?.set_volume(volume);
        Ok(())
    }

    /// Set volume of every resource
    pub fn set_volume_all(&mut self, volume: f32) {
        for resource in self.table.iter_mut() {
            resource.set_volume(volume);
        }
    }

    /// Set pitch, clamped to `0..=15`
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn set_pitch(&mut self, id: AudioId, pitch: f32) -> AudioResult<()> {
        self.table.get_mut(id)?.set_pitch(pitch);
        Ok(())
    }

    /// Set pitch of every resource
    pub fn set_pitch_all(&mut self, pitch: f32) {
        for resource in self.table.iter_mut() {
            resource.set_pitch(pitch);
        }
    }

    /// Move playback to `position_ms` milliseconds
    ///
    /// Negative positions clamp to the start. A position past the end stops
    /// the resource instead of failing.
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn set_position(&mut self, id: AudioId, position_ms: i64) -> AudioResult<()> {
        seek(self.table.get_mut(id)?, position_ms);
        Ok(())
    }

    /// Move playback of every resource, stopping those shorter than `position_ms`
    pub fn set_position_all(&mut self, position_ms: i64) {
        for resource in self.table.iter_mut() {
            seek(resource, position_ms);
        }
    }

    // ---- Getters ----

    /// Borrow a loaded resource
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn resource(&self, id: AudioId) -> AudioResult<&AudioResource<B>> {
        self.table.get(id)
    }

    /// Stored volume
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn get_volume(&self, id: AudioId) -> AudioResult<f32> {
        Ok(self.table.get(id)?.volume())
    }

    /// Stored pitch
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn get_pitch(&self, id: AudioId) -> AudioResult<f32> {
        Ok(self.table.get(id)?.pitch())
    }

    /// Current playback offset as reported by the handle
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn get_position(&self, id: AudioId) -> AudioResult<Duration> {
        Ok(self.table.get(id)?.handle().offset())
    }

    /// Duration computed at load
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn get_duration(&self, id: AudioId) -> AudioResult<Duration> {
        Ok(self.table.get(id)?.duration())
    }

    /// Source path as given at load
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn get_path(&self, id: AudioId) -> AudioResult<&str> {
        Ok(self.table.get(id)?.path())
    }

    /// Looping flag set at load
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn is_looping(&self, id: AudioId) -> AudioResult<bool> {
        Ok(self.table.get(id)?.is_looping())
    }

    /// Status as reported by the handle, never cached
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn get_status(&self, id: AudioId) -> AudioResult<PlaybackStatus> {
        Ok(self.table.get(id)?.handle().status())
    }

    /// Whether the resource is playing
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn is_playing(&self, id: AudioId) -> AudioResult<bool> {
        Ok(self.get_status(id)? == PlaybackStatus::Playing)
    }

    /// Whether the resource is paused
    ///
    /// # Errors
    /// `InvalidId` if `id` is not loaded.
    pub fn is_paused(&self, id: AudioId) -> AudioResult<bool> {
        Ok(self.get_status(id)? == PlaybackStatus::Paused)
    }

    /// True if any loaded resource is playing
    pub fn is_manager_active(&self) -> bool {
        self.table
            .iter()
            .any(|resource| resource.handle().status() == PlaybackStatus::Playing)
    }

    /// Number of loaded resources
    pub fn get_count(&self) -> usize {
        self.table.len()
    }

    /// Identifiers of all loaded resources, in no particular order
    pub fn get_all_ids(&self) -> Vec<AudioId> {
        self.table.keys().collect()
    }

    /// Whether `id` is loaded
    pub fn contains(&self, id: AudioId) -> bool {
        self.table.contains(id)
    }

    /// Maximum number of resources this manager holds at once
    pub const fn get_audio_limit(&self) -> usize {
        self.validator.limit()
    }

    /// Whether the extension of `path` can be loaded
    pub fn is_type_supported(&self, path: impl AsRef<Path>) -> bool {
        validator::is_type_supported(path)
    }
}

impl<B: AudioBackend> Drop for ResourceManager<B> {
    fn drop(&mut self) {
        if !self.table.is_empty() {
            log::info!("Unloading {} {}(s) on manager teardown", self.table.len(), self.kind);
        }
        self.unload_all();
    }
}

fn seek<B: AudioBackend>(resource: &mut AudioResource<B>, position_ms: i64) {
    let duration_ms = i64::try_from(resource.duration().as_millis()).unwrap_or(i64::MAX);

    if position_ms > duration_ms {
        log::warn!(
            "Position {}ms past end of {} ({}ms), stopping",
            position_ms,
            resource.id(),
            duration_ms
        );
        resource.handle_mut().stop();
        return;
    }

    let offset = u64::try_from(position_ms.clamp(0, duration_ms)).unwrap_or(0);
    resource.handle_mut().set_offset(Duration::from_millis(offset));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::headless::HeadlessBackend;
    use crate::audio::AudioError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture(names: &[&str]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, b"RIFF").unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn test_ids_increase_and_are_not_reused() {
        let (_dir, paths) = fixture(&["a.wav"]);
        let mut manager = ResourceManager::clips(HeadlessBackend::default());

        let first = manager.load(&paths[0]).unwrap();
        let second = manager.load(&paths[0]).unwrap();
        manager.unload(second).unwrap();
        let third = manager.load(&paths[0]).unwrap();

        assert_eq!(first.raw(), 1);
        assert!(first < second && second < third);
    }

    #[test]
    fn test_failed_load_consumes_nothing() {
        let (dir, paths) = fixture(&["a.wav"]);
        let mut manager = ResourceManager::clips(HeadlessBackend::default());

        let missing = manager.load(dir.path().join("missing.wav"));
        assert!(matches!(missing, Err(AudioError::InvalidPath(_))));
        assert_eq!(manager.get_count(), 0);

        let id = manager.load(&paths[0]).unwrap();
        assert_eq!(id.raw(), 1);
    }

    #[test]
    fn test_decode_failure_leaves_table_untouched() {
        let (_dir, paths) = fixture(&["broken.ogg"]);
        let backend = HeadlessBackend::default().with_broken(&paths[0]);
        let mut manager = ResourceManager::tracks(backend.clone());

        let result = manager.load(&paths[0]);
        assert!(matches!(result, Err(AudioError::DecodeFailed { .. })));
        assert_eq!(manager.get_count(), 0);
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn test_load_options_are_clamped_and_applied() {
        let (_dir, paths) = fixture(&["loop.ogg"]);
        let mut manager = ResourceManager::tracks(HeadlessBackend::default());

        let options = LoadOptions {
            looping: true,
            volume: 300.0,
            pitch: 30.0,
        };
        let id = manager.load_with(&paths[0], options).unwrap();

        assert_eq!(manager.get_volume(id).unwrap(), 100.0);
        assert_eq!(manager.get_pitch(id).unwrap(), 15.0);
        assert!(manager.is_looping(id).unwrap());
        assert_eq!(manager.resource(id).unwrap().kind(), ResourceKind::StreamedTrack);
    }

    #[test]
    fn test_defaults_used_by_load() {
        let (_dir, paths) = fixture(&["theme.ogg"]);
        let defaults = LoadOptions::default().with_looping(true).with_volume(60.0);
        let mut manager = ResourceManager::tracks(HeadlessBackend::default()).with_defaults(defaults);

        let id = manager.load(&paths[0]).unwrap();
        assert!(manager.is_looping(id).unwrap());
        assert_eq!(manager.get_volume(id).unwrap(), 60.0);
        assert_eq!(manager.get_pitch(id).unwrap(), 1.0);
    }

    #[test]
    fn test_play_pause_unpause_stop() {
        let (_dir, paths) = fixture(&["a.wav"]);
        let mut manager = ResourceManager::clips(HeadlessBackend::default());
        let id = manager.load(&paths[0]).unwrap();

        assert_eq!(manager.get_status(id).unwrap(), PlaybackStatus::Stopped);
        manager.play(id).unwrap();
        assert!(manager.is_playing(id).unwrap());
        manager.pause(id).unwrap();
        assert!(manager.is_paused(id).unwrap());
        manager.unpause(id).unwrap();
        assert!(manager.is_playing(id).unwrap());
        manager.stop(id).unwrap();
        assert!(!manager.is_playing(id).unwrap());
        assert!(!manager.is_paused(id).unwrap());
    }

    #[test]
    fn test_play_failure_is_reported() {
        let (_dir, paths) = fixture(&["ok.wav", "dead.wav"]);
        let backend = HeadlessBackend::default().with_unplayable(&paths[1]);
        let mut manager = ResourceManager::clips(backend);
        let ok = manager.load(&paths[0]).unwrap();
        let dead = manager.load(&paths[1]).unwrap();

        assert!(matches!(manager.play(dead), Err(AudioError::PlaybackFailed(_))));
        assert!(matches!(manager.unpause(dead), Err(AudioError::PlaybackFailed(_))));
        assert_eq!(manager.get_status(dead).unwrap(), PlaybackStatus::Stopped);

        // The broadcast skips the failing resource and plays the rest
        manager.play_all();
        assert!(manager.is_playing(ok).unwrap());
        assert!(!manager.is_playing(dead).unwrap());
    }

    #[test]
    fn test_position_clamping_and_overflow() {
        let (_dir, paths) = fixture(&["a.wav"]);
        let backend = HeadlessBackend::new(Duration::from_millis(2_000));
        let mut manager = ResourceManager::clips(backend);
        let id = manager.load(&paths[0]).unwrap();
        manager.play(id).unwrap();

        manager.set_position(id, 1_500).unwrap();
        assert_eq!(manager.get_position(id).unwrap(), Duration::from_millis(1_500));

        manager.set_position(id, -300).unwrap();
        assert_eq!(manager.get_position(id).unwrap(), Duration::ZERO);

        // Exactly at the end is still a seek
        manager.set_position(id, 2_000).unwrap();
        assert!(manager.is_playing(id).unwrap());

        manager.set_position(id, 3_000).unwrap();
        assert!(!manager.is_playing(id).unwrap());
        assert_eq!(manager.get_status(id).unwrap(), PlaybackStatus::Stopped);
    }

    #[test]
    fn test_set_position_all_stops_only_short_resources() {
        let (_dir, paths) = fixture(&["short.wav", "long.wav"]);
        let backend = HeadlessBackend::default()
            .with_duration(&paths[0], Duration::from_millis(500))
            .with_duration(&paths[1], Duration::from_millis(5_000));
        let mut manager = ResourceManager::clips(backend);
        let short = manager.load(&paths[0]).unwrap();
        let long = manager.load(&paths[1]).unwrap();

        manager.play_all();
        manager.set_position_all(1_000);

        assert!(!manager.is_playing(short).unwrap());
        assert!(manager.is_playing(long).unwrap());
        assert_eq!(manager.get_position(long).unwrap(), Duration::from_millis(1_000));
    }

    #[test]
    fn test_manager_active_is_any_playing() {
        let (_dir, paths) = fixture(&["a.wav"]);
        let mut manager = ResourceManager::clips(HeadlessBackend::default());
        assert!(!manager.is_manager_active());

        let ids: Vec<_> = (0..5).map(|_| manager.load(&paths[0]).unwrap()).collect();
        assert!(!manager.is_manager_active());

        // Exactly one playing, whichever order the table iterates in
        for &id in &ids {
            manager.stop_all();
            manager.play(id).unwrap();
            assert!(manager.is_manager_active());
        }

        manager.pause_all();
        assert!(!manager.is_manager_active());
        manager.unpause_all();
        assert!(manager.is_manager_active());
    }

    #[test]
    fn test_broadcast_setters() {
        let (_dir, paths) = fixture(&["a.wav"]);
        let mut manager = ResourceManager::clips(HeadlessBackend::default());
        let a = manager.load(&paths[0]).unwrap();
        let b = manager.load(&paths[0]).unwrap();

        manager.set_volume_all(250.0);
        manager.set_pitch_all(-1.0);
        for id in [a, b] {
            assert_eq!(manager.get_volume(id).unwrap(), 100.0);
            assert_eq!(manager.get_pitch(id).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_broadcast_on_empty_manager_is_noop() {
        let mut manager = ResourceManager::tracks(HeadlessBackend::default());
        manager.play_all();
        manager.pause_all();
        manager.unpause_all();
        manager.stop_all();
        manager.set_volume_all(10.0);
        manager.set_pitch_all(2.0);
        manager.set_position_all(100);
        manager.unload_all();
        assert_eq!(manager.get_count(), 0);
        assert!(manager.get_all_ids().is_empty());
    }

    #[test]
    fn test_unload_twice_fails_without_double_release() {
        let (_dir, paths) = fixture(&["a.wav"]);
        let backend = HeadlessBackend::default();
        let mut manager = ResourceManager::clips(backend.clone());
        let id = manager.load(&paths[0]).unwrap();
        assert_eq!(backend.live_handles(), 1);

        manager.unload(id).unwrap();
        assert_eq!(backend.live_handles(), 0);
        assert!(matches!(manager.unload(id), Err(AudioError::InvalidId(bad)) if bad == id));
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn test_drop_releases_all_handles() {
        let (_dir, paths) = fixture(&["a.wav", "b.ogg"]);
        let backend = HeadlessBackend::default();
        {
            let mut manager = ResourceManager::tracks(backend.clone());
            manager.load(&paths[0]).unwrap();
            manager.load(&paths[1]).unwrap();
            assert_eq!(backend.live_handles(), 2);
        }
        assert_eq!(backend.live_handles(), 0);
        assert_eq!(backend.created_handles(), 2);
    }

    #[test]
    fn test_limit_and_type_queries() {
        let manager = ResourceManager::clips(HeadlessBackend::default());
        assert_eq!(manager.get_audio_limit(), 255);
        assert!(manager.is_type_supported("boom.flac"));
        assert!(!manager.is_type_supported("boom.mp3"));
    }
}
