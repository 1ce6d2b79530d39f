//! The reader contract the search loops traverse, plus the in-memory
//! implementation.
//!
//! # Contract
//! - `window_for(pos)` returns the window containing `pos`, or `None` once
//!   `pos` is past the end of the source. `Err` is reserved for real I/O
//!   failure.
//! - `offset_in_window(pos)` is pure arithmetic: `pos` minus the start of
//!   the window that would contain it.
//! - `read_byte(pos)` follows the same byte-or-sentinel protocol; the hot
//!   loops use it only for the few bytes of a q-gram that straddle a window
//!   boundary.
//! - `length()` may block until the source knows its size (a streaming
//!   reader may have to reach end-of-stream to answer).
//!
//! Readers may cache windows; callers treat window contents as read-only.

use std::io;
use std::sync::Arc;

use super::Window;

/// A positioned byte source that serves fixed-size windows.
pub trait WindowReader {
    /// The window containing absolute position `pos`, or `None` past end.
    fn window_for(&mut self, pos: u64) -> io::Result<Option<Window>>;

    /// Offset of `pos` inside the window that contains it.
    fn offset_in_window(&self, pos: u64) -> usize;

    /// The byte at `pos`, or `None` past end.
    fn read_byte(&mut self, pos: u64) -> io::Result<Option<u8>>;

    /// Total length of the source in bytes.
    fn length(&mut self) -> io::Result<u64>;

    /// Releases underlying resources. The default does nothing; readers
    /// holding OS handles release them on `Drop` as well.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A [`WindowReader`] over an in-memory byte source.
///
/// With the default construction the whole source is served as a single
/// window and `window_for` never copies. With an explicit window size the
/// source is chunked; each window's bytes are copied once on first fetch and
/// the most recent window is cached, which mirrors how file-backed readers
/// behave and makes this the reference reader for exercising stream-search
/// boundary handling.
#[derive(Debug)]
pub struct ByteArrayReader {
    data: Arc<[u8]>,
    window_size: usize,
    cached: Option<Window>,
}

impl ByteArrayReader {
    /// Wraps `data` as a single-window source.
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let window_size = data.len().max(1);
        Self {
            data,
            window_size,
            cached: None,
        }
    }

    /// Wraps `data`, serving it in windows of `window_size` bytes (the last
    /// window may be shorter).
    ///
    /// # Panics
    /// Panics when `window_size` is zero.
    pub fn with_window_size(data: impl Into<Arc<[u8]>>, window_size: usize) -> Self {
        assert!(window_size > 0, "window size must be non-zero");
        Self {
            data: data.into(),
            window_size,
            cached: None,
        }
    }

    fn fetch_window(&self, pos: u64) -> Window {
        debug_assert!((pos as usize) < self.data.len());
        let start = pos as usize / self.window_size * self.window_size;
        let end = (start + self.window_size).min(self.data.len());
        if start == 0 && end == self.data.len() {
            // Whole source in one window: share the backing bytes.
            return Window::new(Arc::clone(&self.data), 0, self.data.len());
        }
        Window::new(Arc::from(&self.data[start..end]), start as u64, end - start)
    }
}

impl WindowReader for ByteArrayReader {
    fn window_for(&mut self, pos: u64) -> io::Result<Option<Window>> {
        if pos >= self.data.len() as u64 {
            return Ok(None);
        }
        if let Some(cached) = &self.cached {
            if pos >= cached.start() && pos < cached.end() {
                return Ok(Some(cached.clone()));
            }
        }
        let window = self.fetch_window(pos);
        self.cached = Some(window.clone());
        Ok(Some(window))
    }

    #[inline]
    fn offset_in_window(&self, pos: u64) -> usize {
        (pos % self.window_size as u64) as usize
    }

    #[inline]
    fn read_byte(&mut self, pos: u64) -> io::Result<Option<u8>> {
        Ok(self.data.get(pos as usize).copied())
    }

    fn length(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }
}
