//! A bounded view onto a contiguous region of a byte source.

use std::sync::Arc;

/// A window of bytes at an absolute position in a source.
///
/// Cloning is cheap (the backing bytes are shared), which lets readers cache
/// windows and hand them out without lifetime entanglement with the reader's
/// mutable fetch methods.
///
/// # Invariants
/// - `length <= backing.len()`; bytes past `length` are undefined and never
///   exposed.
/// - Contents are read-only; a window never observes source mutation.
#[derive(Clone, Debug)]
pub struct Window {
    backing: Arc<[u8]>,
    start: u64,
    length: usize,
}

impl Window {
    /// Creates a window over the first `length` bytes of `backing`,
    /// positioned at absolute `start` in the source.
    ///
    /// # Panics
    /// Panics when `length > backing.len()`.
    pub fn new(backing: Arc<[u8]>, start: u64, length: usize) -> Self {
        assert!(
            length <= backing.len(),
            "window length {length} exceeds backing array of {}",
            backing.len()
        );
        Self {
            backing,
            start,
            length,
        }
    }

    /// The valid bytes of this window.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.backing[..self.length]
    }

    /// Absolute position of the first byte in the source.
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of valid bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` when the window holds no valid bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// One past the absolute position of the last valid byte.
    #[inline]
    pub fn end(&self) -> u64 {
        self.start + self.length as u64
    }

    /// Offset of absolute position `pos` inside this window.
    ///
    /// `pos` must lie in `[start, end)`.
    #[inline]
    pub fn offset_of(&self, pos: u64) -> usize {
        debug_assert!(pos >= self.start && pos < self.end());
        (pos - self.start) as usize
    }
}
