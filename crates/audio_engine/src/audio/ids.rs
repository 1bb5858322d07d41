//! Audio identifiers
//!
//! Identifiers are handed out in strictly increasing order starting at 1 and
//! are never reused, even after the resource they named is unloaded.

use crate::audio::{AudioError, AudioResult};
use std::fmt;

/// Identifier of a loaded audio resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AudioId(u32);

impl AudioId {
    /// Wrap a raw identifier value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw identifier value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AudioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier source, one per manager
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: u32,
}

impl IdAllocator {
    /// Create an allocator whose first identifier is 1
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Produce the next identifier
    ///
    /// # Errors
    /// `IdSpaceExhausted` once `u32::MAX` has been issued. The counter never
    /// wraps.
    pub fn next(&mut self) -> AudioResult<AudioId> {
        let id = self.last.checked_add(1).ok_or(AudioError::IdSpaceExhausted)?;
        self.last = id;
        Ok(AudioId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_one_and_increases() {
        let mut ids = IdAllocator::new();

        let first = ids.next().unwrap();
        let second = ids.next().unwrap();
        let third = ids.next().unwrap();

        assert_eq!(first.raw(), 1);
        assert!(first < second && second < third);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut ids = IdAllocator { last: u32::MAX - 1 };
        assert_eq!(ids.next().unwrap().raw(), u32::MAX);
        assert!(matches!(ids.next(), Err(AudioError::IdSpaceExhausted)));
        // Still exhausted, never wraps back to 1
        assert!(matches!(ids.next(), Err(AudioError::IdSpaceExhausted)));
    }
}
