//! Load-time validation
//!
//! Checks run in a fixed order before anything is constructed:
//! path exists, extension supported, table below capacity.

use crate::audio::{AudioError, AudioResult};
use std::path::Path;

/// Maximum number of resources loaded at once in one manager
pub const AUDIO_LIMIT: usize = 255;

/// File extensions accepted by the loaders (case-sensitive, dot included)
pub const SUPPORTED_EXTENSIONS: [&str; 23] = [
    ".ogg", ".wav", ".flac", ".aiff", ".au", ".raw", ".paf", ".svx", ".nist", ".voc", ".ircam",
    ".w64", ".mat4", ".mat5", ".pvf", ".htk", ".sds", ".avr", ".sd2", ".caf", ".wve", ".mpc2k",
    ".rf64",
];

/// Gatekeeper for resource creation
#[derive(Debug, Clone, Copy)]
pub struct LoadValidator {
    limit: usize,
}

impl LoadValidator {
    /// Validator enforcing [`AUDIO_LIMIT`]
    pub const fn new() -> Self {
        Self { limit: AUDIO_LIMIT }
    }

    /// Capacity ceiling enforced by this validator
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Check that `path` may be loaded into a table currently holding `current_count`
    ///
    /// # Errors
    /// - `InvalidPath` if nothing exists at `path`
    /// - `UnsupportedFileType` if the extension is not in [`SUPPORTED_EXTENSIONS`]
    /// - `CapacityExceeded` if the table is already full
    pub fn validate(&self, path: &Path, current_count: usize) -> AudioResult<()> {
        if !path.exists() {
            return Err(AudioError::InvalidPath(path.to_path_buf()));
        }

        if !is_type_supported(path) {
            return Err(AudioError::UnsupportedFileType(
                path.to_string_lossy().into_owned(),
            ));
        }

        if current_count >= self.limit {
            return Err(AudioError::CapacityExceeded { limit: self.limit });
        }

        Ok(())
    }
}

impl Default for LoadValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension of `path`: everything from the final `.` on
fn extension_of(path: &str) -> Option<&str> {
    path.rfind('.').map(|index| &path[index..])
}

/// Check whether the extension of `path` is in [`SUPPORTED_EXTENSIONS`]
///
/// Matching is on the raw path text, so `"a.WAV"` is rejected and a path
/// with no `.` at all is never supported.
pub fn is_type_supported(path: impl AsRef<Path>) -> bool {
    let text = path.as_ref().to_string_lossy();
    extension_of(&text).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}
