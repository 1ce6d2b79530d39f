//! ShiftOr fallback searcher.
//!
//! Bit-parallel matcher used whenever the signed-hash tables cannot be
//! built: patterns shorter than a q-gram, or patterns whose usable shifts
//! are too small to be profitable. Pre-processing is 256 words per
//! direction and the scan is O(n), so it is unconditionally applicable;
//! correctness never depends on the pattern's shape.
//!
//! # State encoding
//! `masks[b]` has bit `i` clear iff pattern position `i` accepts byte `b`
//! (for the backward direction, position `len - 1 - i`). The running state
//! shifts left one bit per consumed byte and ORs in the mask; a clear accept
//! bit means every tracked position matched. Patterns longer than the word
//! width track only a 64-position prefix (forward) or suffix (backward) and
//! confirm candidates through the sequence matcher.

use std::io;
use std::sync::Arc;

use crate::io::WindowReader;
use crate::matcher::{ByteMatcher, SequenceMatcher};

/// Word width of the bit-parallel state.
const WORD_BITS: usize = 64;

/// A ShiftOr searcher over a [`SequenceMatcher`].
///
/// Construction never fails; this is the searcher of last resort.
#[derive(Debug)]
pub struct ShiftOrSearcher {
    sequence: Arc<SequenceMatcher>,
    forward_masks: Box<[u64; 256]>,
    backward_masks: Box<[u64; 256]>,
    /// Number of pattern positions tracked in the state word.
    tracked: usize,
}

impl ShiftOrSearcher {
    /// Builds the mask tables for both directions.
    pub fn new(sequence: impl Into<Arc<SequenceMatcher>>) -> Self {
        let sequence = sequence.into();
        let len = sequence.len();
        let tracked = len.min(WORD_BITS);

        let mut forward_masks = Box::new([!0u64; 256]);
        let mut backward_masks = Box::new([!0u64; 256]);
        for i in 0..tracked {
            for &b in &sequence.matcher_at(i).accepted_bytes() {
                forward_masks[b as usize] &= !(1u64 << i);
            }
            for &b in &sequence.matcher_at(len - 1 - i).accepted_bytes() {
                backward_masks[b as usize] &= !(1u64 << i);
            }
        }
        Self {
            sequence,
            forward_masks,
            backward_masks,
            tracked,
        }
    }

    /// First match start in `[from, min(to, data.len() - len)]`, scanning
    /// forward.
    pub fn search_forward_array(&self, data: &[u8], from: usize, to: usize) -> Option<usize> {
        let len = self.sequence.len();
        if data.len() < len {
            return None;
        }
        let last_start = to.min(data.len() - len);
        if from > last_start {
            return None;
        }

        if len == 1 {
            return self.scan_single_forward(&data[from..=last_start]).map(|i| from + i);
        }

        let accept_bit = 1u64 << (self.tracked - 1);
        let mut state = !0u64;
        // The accept bit needs `tracked` consumed bytes before it can
        // clear, so candidates always start at or after `from`.
        for (i, &b) in data[from..=last_start + self.tracked - 1].iter().enumerate() {
            state = (state << 1) | self.forward_masks[b as usize];
            if state & accept_bit == 0 {
                let start = from + i + 1 - self.tracked;
                if self.tracked == len || self.sequence.matches(data, start) {
                    return Some(start);
                }
            }
        }
        None
    }

    /// First match start in `[to, min(from, data.len() - len)]`, scanning
    /// backward.
    pub fn search_backward_array(&self, data: &[u8], from: usize, to: usize) -> Option<usize> {
        let len = self.sequence.len();
        if data.len() < len {
            return None;
        }
        let first_start = from.min(data.len() - len);
        if first_start < to {
            return None;
        }

        if len == 1 {
            return self.scan_single_backward(&data[to..=first_start]).map(|i| to + i);
        }

        let accept_bit = 1u64 << (self.tracked - 1);
        // The tracked suffix of a match starting at `s` occupies
        // `[s + tail, s + len)`.
        let tail = len - self.tracked;
        let scan_high = first_start + len - 1;
        let scan_low = to + tail;
        let mut state = !0u64;
        for j in (scan_low..=scan_high).rev() {
            state = (state << 1) | self.backward_masks[data[j] as usize];
            if state & accept_bit == 0 {
                let start = j - tail;
                if self.tracked == len || self.sequence.matches(data, start) {
                    return Some(start);
                }
            }
        }
        None
    }

    /// Stream variant of [`search_forward_array`].
    ///
    /// The automaton carries its state across window boundaries, so no
    /// boundary handling is needed; windows are consumed slice by slice.
    ///
    /// [`search_forward_array`]: ShiftOrSearcher::search_forward_array
    pub fn search_forward_stream<R: WindowReader + ?Sized>(
        &self,
        reader: &mut R,
        from: u64,
        to: u64,
    ) -> io::Result<Option<u64>> {
        if from > to {
            return Ok(None);
        }
        let len = self.sequence.len();
        let tracked = self.tracked as u64;
        let accept_bit = 1u64 << (self.tracked - 1);
        let scan_end = to.saturating_add(tracked - 1);
        let mut state = !0u64;
        let mut pos = from;
        while pos <= scan_end {
            let Some(window) = reader.window_for(pos)? else {
                return Ok(None);
            };
            let bytes = window.bytes();
            let off = window.offset_of(pos);
            let remaining = scan_end - pos;
            let span = (bytes.len() - 1 - off) as u64;
            let last_off = if remaining < span {
                off + remaining as usize
            } else {
                bytes.len() - 1
            };
            for o in off..=last_off {
                state = (state << 1) | self.forward_masks[bytes[o] as usize];
                if state & accept_bit == 0 {
                    let start = pos + (o - off) as u64 + 1 - tracked;
                    if self.tracked == len || self.sequence.matches_reader(reader, start)? {
                        return Ok(Some(start));
                    }
                }
            }
            pos += (last_off - off + 1) as u64;
        }
        Ok(None)
    }

    /// Stream variant of [`search_backward_array`].
    ///
    /// [`search_backward_array`]: ShiftOrSearcher::search_backward_array
    pub fn search_backward_stream<R: WindowReader + ?Sized>(
        &self,
        reader: &mut R,
        from: u64,
        to: u64,
    ) -> io::Result<Option<u64>> {
        let len = self.sequence.len() as u64;
        let length = reader.length()?;
        if length < len {
            return Ok(None);
        }
        let first_start = from.min(length - len);
        if first_start < to {
            return Ok(None);
        }

        let accept_bit = 1u64 << (self.tracked - 1);
        let tail = len - self.tracked as u64;
        let scan_high = first_start + len - 1;
        let scan_low = to + tail;
        let mut state = !0u64;
        let mut pos = scan_high;
        loop {
            let Some(window) = reader.window_for(pos)? else {
                return Ok(None);
            };
            let win_start = window.start();
            let bytes = window.bytes();
            let low_abs = win_start.max(scan_low);
            let off_hi = window.offset_of(pos);
            let off_lo = (low_abs - win_start) as usize;
            for o in (off_lo..=off_hi).rev() {
                state = (state << 1) | self.backward_masks[bytes[o] as usize];
                if state & accept_bit == 0 {
                    let start = win_start + o as u64 - tail;
                    if self.tracked as u64 == len
                        || self.sequence.matches_reader(reader, start)?
                    {
                        return Ok(Some(start));
                    }
                }
            }
            if low_abs == scan_low {
                return Ok(None);
            }
            pos = low_abs - 1;
        }
    }

    fn scan_single_forward(&self, hay: &[u8]) -> Option<usize> {
        match *self.sequence.matcher_at(0) {
            ByteMatcher::Single(b) => memchr::memchr(b, hay),
            ref matcher => hay.iter().position(|&b| matcher.matches(b)),
        }
    }

    fn scan_single_backward(&self, hay: &[u8]) -> Option<usize> {
        match *self.sequence.matcher_at(0) {
            ByteMatcher::Single(b) => memchr::memrchr(b, hay),
            ref matcher => hay.iter().rposition(|&b| matcher.matches(b)),
        }
    }
}
