//! The signed-hash q-gram searcher.
//!
//! # Algorithm
//! The forward loop keeps its cursor on the *end* of a potential match. Each
//! iteration reads the q-gram terminating at the cursor, hashes it, and
//! looks up a signed shift. Positive: no match can end here; skip ahead by
//! the shift. Negative: the terminal q-gram of the pattern may end here;
//! verify through the sequence matcher, then skip by the magnitude. The
//! backward loop mirrors this with the cursor on the *start* of a potential
//! match.
//!
//! # Streams
//! The stream loops are the same shape but fetch bytes through a
//! [`WindowReader`]. When the cursor's q-gram lies inside the current
//! window the bytes come straight from the window slice; when it straddles
//! a boundary the out-of-window bytes are fetched one at a time. The shift
//! itself carries the cursor across window boundaries; the outer loop then
//! fetches the next window.
//!
//! # Laziness
//! Pre-processing runs once per direction on first use (or via the
//! `prepare_*` methods) behind a `OnceLock`, so a prepared searcher is
//! freely shareable across threads for read-only searching. Patterns the
//! table builder rejects are served by the ShiftOr fallback instead; every
//! search entry point makes the same dispatch decision.

use std::io;
use std::sync::{Arc, OnceLock};

use crate::io::WindowReader;
use crate::matcher::SequenceMatcher;

use super::shift_or::ShiftOrSearcher;
use super::table::{self, ShiftTable, DEFAULT_POWER_TWO_SIZE, MAX_POWER_TWO_SIZE, QGRAM_LEN};
use super::SearcherBuildError;

/// Sublinear single-pattern searcher over byte arrays and windowed streams.
///
/// Construction is cheap; the shift tables are built lazily per direction.
/// Once built they are immutable, and the searcher can be shared across
/// threads for concurrent searches.
#[derive(Debug)]
pub struct SignedHashSearcher {
    sequence: Arc<SequenceMatcher>,
    power_two_size: i32,
    forward: OnceLock<Option<ShiftTable>>,
    backward: OnceLock<Option<ShiftTable>>,
    fallback: OnceLock<ShiftOrSearcher>,
}

impl SignedHashSearcher {
    /// Creates a searcher with the default table-size hint
    /// ([`DEFAULT_POWER_TWO_SIZE`]).
    pub fn new(sequence: SequenceMatcher) -> Self {
        Self {
            sequence: Arc::new(sequence),
            power_two_size: DEFAULT_POWER_TWO_SIZE,
            forward: OnceLock::new(),
            backward: OnceLock::new(),
            fallback: OnceLock::new(),
        }
    }

    /// Creates a searcher with an explicit table-size hint.
    ///
    /// Positive: use exactly `2^power_two_size` table entries. Zero:
    /// auto-select up to [`MAX_POWER_TWO_SIZE`]. Negative: auto-select, but
    /// cap at `2^|power_two_size|`. Hints beyond ±[`MAX_POWER_TWO_SIZE`] are
    /// rejected.
    pub fn with_table_size(
        sequence: SequenceMatcher,
        power_two_size: i32,
    ) -> Result<Self, SearcherBuildError> {
        if power_two_size.unsigned_abs() > MAX_POWER_TWO_SIZE as u32 {
            return Err(SearcherBuildError::TableSizeOutOfRange {
                power_two_size,
                max: MAX_POWER_TWO_SIZE,
            });
        }
        let mut searcher = Self::new(sequence);
        searcher.power_two_size = power_two_size;
        Ok(searcher)
    }

    /// Creates a searcher for an exact byte pattern.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SearcherBuildError> {
        Ok(Self::new(SequenceMatcher::from_bytes(bytes)?))
    }

    /// Creates a searcher for an exact byte pattern with an explicit
    /// table-size hint.
    pub fn from_bytes_with_table_size(
        bytes: &[u8],
        power_two_size: i32,
    ) -> Result<Self, SearcherBuildError> {
        Self::with_table_size(SequenceMatcher::from_bytes(bytes)?, power_two_size)
    }

    /// The pattern this searcher looks for.
    #[inline]
    pub fn sequence(&self) -> &SequenceMatcher {
        &self.sequence
    }

    /// Forces forward pre-processing now instead of on the first search.
    pub fn prepare_forward(&self) {
        self.forward_table();
    }

    /// Forces backward pre-processing now instead of on the first search.
    pub fn prepare_backward(&self) {
        self.backward_table();
    }

    pub(crate) fn forward_table(&self) -> Option<&ShiftTable> {
        self.forward
            .get_or_init(|| table::build_forward(&self.sequence, self.power_two_size))
            .as_ref()
    }

    pub(crate) fn backward_table(&self) -> Option<&ShiftTable> {
        self.backward
            .get_or_init(|| table::build_backward(&self.sequence, self.power_two_size))
            .as_ref()
    }

    fn fallback(&self) -> &ShiftOrSearcher {
        self.fallback
            .get_or_init(|| ShiftOrSearcher::new(Arc::clone(&self.sequence)))
    }

    /// First match start in `[from, min(to, data.len() - len)]`, scanning
    /// forward, or `None`.
    pub fn search_forward_array(&self, data: &[u8], from: usize, to: usize) -> Option<usize> {
        let Some(table) = self.forward_table() else {
            return self.fallback().search_forward_array(data, from, to);
        };
        let len = self.sequence.len();
        if data.len() < len {
            return None;
        }
        let last_pattern_pos = len - 1;
        let search_end = to.saturating_add(last_pattern_pos).min(data.len() - 1);

        // Cursor on the end of a potential match.
        let mut pos = from.saturating_add(last_pattern_pos);
        while pos <= search_end {
            let key =
                u32::from_be_bytes([data[pos - 3], data[pos - 2], data[pos - 1], data[pos]]);
            let shift = table.shift_for(key);
            if shift > 0 {
                pos += shift as usize;
            } else {
                let start = pos - last_pattern_pos;
                if self.sequence.matches_assume_bounds(data, start) {
                    return Some(start);
                }
                pos += shift.unsigned_abs() as usize;
            }
        }
        None
    }

    /// First match start in `[to, min(from, data.len() - len)]`, scanning
    /// backward, or `None`.
    pub fn search_backward_array(&self, data: &[u8], from: usize, to: usize) -> Option<usize> {
        let Some(table) = self.backward_table() else {
            return self.fallback().search_backward_array(data, from, to);
        };
        let len = self.sequence.len();
        if data.len() < len {
            return None;
        }

        // Cursor on the start of a potential match.
        let mut pos = from.min(data.len() - len);
        while pos >= to {
            let key =
                u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
            let shift = table.shift_for(key);
            let step = if shift > 0 {
                shift as usize
            } else {
                if self.sequence.matches_assume_bounds(data, pos) {
                    return Some(pos);
                }
                shift.unsigned_abs() as usize
            };
            pos = match pos.checked_sub(step) {
                Some(p) => p,
                None => return None,
            };
        }
        None
    }

    /// Stream variant of [`search_forward_array`]; positions are absolute
    /// reader positions. I/O errors from the reader surface unchanged.
    ///
    /// [`search_forward_array`]: SignedHashSearcher::search_forward_array
    pub fn search_forward_stream<R: WindowReader + ?Sized>(
        &self,
        reader: &mut R,
        from: u64,
        to: u64,
    ) -> io::Result<Option<u64>> {
        let Some(table) = self.forward_table() else {
            return self.fallback().search_forward_stream(reader, from, to);
        };
        let last_pattern_pos = (self.sequence.len() - 1) as u64;
        let search_end = to.saturating_add(last_pattern_pos);

        let mut pos = from.saturating_add(last_pattern_pos);
        while pos <= search_end {
            let Some(window) = reader.window_for(pos)? else {
                return Ok(None);
            };
            let bytes = window.bytes();
            let mut off = window.offset_of(pos);
            let remaining = usize::try_from(search_end - pos).unwrap_or(usize::MAX);
            let last_off = (bytes.len() - 1).min(off.saturating_add(remaining));
            while off <= last_off {
                let key = if off < QGRAM_LEN - 1 {
                    // Q-gram straddles back into the previous window(s).
                    u32::from_be_bytes([
                        must_read(reader, pos - 3)?,
                        must_read(reader, pos - 2)?,
                        must_read(reader, pos - 1)?,
                        bytes[off],
                    ])
                } else {
                    u32::from_be_bytes([
                        bytes[off - 3],
                        bytes[off - 2],
                        bytes[off - 1],
                        bytes[off],
                    ])
                };
                let shift = table.shift_for(key);
                if shift > 0 {
                    off += shift as usize;
                    pos += shift as u64;
                } else {
                    let start = pos - last_pattern_pos;
                    if self.sequence.matches_reader(reader, start)? {
                        return Ok(Some(start));
                    }
                    off += shift.unsigned_abs() as usize;
                    pos += shift.unsigned_abs() as u64;
                }
            }
        }
        Ok(None)
    }

    /// Stream variant of [`search_backward_array`]. The scan starts at
    /// `min(from, length - len)`, so a `from` past the end is safe.
    ///
    /// [`search_backward_array`]: SignedHashSearcher::search_backward_array
    pub fn search_backward_stream<R: WindowReader + ?Sized>(
        &self,
        reader: &mut R,
        from: u64,
        to: u64,
    ) -> io::Result<Option<u64>> {
        let Some(table) = self.backward_table() else {
            return self.fallback().search_backward_stream(reader, from, to);
        };
        let len = self.sequence.len() as u64;
        let length = reader.length()?;
        if length < len {
            return Ok(None);
        }

        let mut pos = from.min(length - len);
        if pos < to {
            return Ok(None);
        }
        loop {
            let Some(window) = reader.window_for(pos)? else {
                return Ok(None);
            };
            let win_start = window.start();
            let bytes = window.bytes();
            loop {
                let off = (pos - win_start) as usize;
                let key = if off + QGRAM_LEN > bytes.len() {
                    // Q-gram extends into the next window(s).
                    u32::from_be_bytes([
                        bytes[off],
                        must_read(reader, pos + 1)?,
                        must_read(reader, pos + 2)?,
                        must_read(reader, pos + 3)?,
                    ])
                } else {
                    u32::from_be_bytes([
                        bytes[off],
                        bytes[off + 1],
                        bytes[off + 2],
                        bytes[off + 3],
                    ])
                };
                let shift = table.shift_for(key);
                let step = if shift > 0 {
                    shift as u64
                } else {
                    if self.sequence.matches_reader(reader, pos)? {
                        return Ok(Some(pos));
                    }
                    shift.unsigned_abs() as u64
                };
                pos = match pos.checked_sub(step) {
                    Some(p) => p,
                    None => return Ok(None),
                };
                if pos < to {
                    return Ok(None);
                }
                if pos < win_start {
                    break;
                }
            }
        }
    }

    /// Iterator over every match start in `data`, ascending.
    pub fn iter_forward<'a>(&'a self, data: &'a [u8]) -> ForwardMatches<'a> {
        ForwardMatches {
            searcher: self,
            data,
            next_from: 0,
            done: false,
        }
    }

    /// Iterator over every match start in `data`, descending.
    pub fn iter_backward<'a>(&'a self, data: &'a [u8]) -> BackwardMatches<'a> {
        BackwardMatches {
            searcher: self,
            data,
            next_from: data.len(),
            done: false,
        }
    }
}

/// Reads a byte the search loop has already proved to exist.
///
/// A conforming reader cannot answer past-end here; if one does, the
/// position arithmetic and the reader disagree about the source and the
/// search cannot continue meaningfully.
fn must_read<R: WindowReader + ?Sized>(reader: &mut R, pos: u64) -> io::Result<u8> {
    reader.read_byte(pos)?.ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "window reader returned past-end for an in-range position",
        )
    })
}

/// Ascending match-start iterator; each step resumes one past the previous
/// match.
pub struct ForwardMatches<'a> {
    searcher: &'a SignedHashSearcher,
    data: &'a [u8],
    next_from: usize,
    done: bool,
}

impl Iterator for ForwardMatches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        match self
            .searcher
            .search_forward_array(self.data, self.next_from, self.data.len())
        {
            Some(found) => {
                self.next_from = found + 1;
                Some(found)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Descending match-start iterator; each step resumes one before the
/// previous match.
pub struct BackwardMatches<'a> {
    searcher: &'a SignedHashSearcher,
    data: &'a [u8],
    next_from: usize,
    done: bool,
}

impl Iterator for BackwardMatches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        match self
            .searcher
            .search_backward_array(self.data, self.next_from, 0)
        {
            Some(found) => {
                match found.checked_sub(1) {
                    Some(next) => self.next_from = next,
                    None => self.done = true,
                }
                Some(found)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "searcher_tests.rs"]
mod tests;
