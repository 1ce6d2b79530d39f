//! Ordered sequences of position matchers.
//!
//! [`SequenceMatcher`] is the verification oracle of the crate: the search
//! loops skip through the input using the shift table and call back into the
//! sequence to confirm candidate positions. Verification comes in three
//! forms: bounds-checked over a slice, bounds-assumed over a slice (the loop
//! has already proved the candidate fits), and windowed over a
//! [`WindowReader`] for stream searches.

use std::io;

use crate::io::WindowReader;

use super::{ByteMatcher, MatcherBuildError};

/// An ordered, non-empty sequence of [`ByteMatcher`]s.
///
/// Immutable after construction. Position `0` is the first pattern byte.
#[derive(Clone, Debug)]
pub struct SequenceMatcher {
    positions: Box<[ByteMatcher]>,
}

impl SequenceMatcher {
    /// Builds a sequence from position matchers.
    ///
    /// Fails with [`MatcherBuildError::EmptySequence`] when `positions` is
    /// empty; a zero-length pattern matches nowhere and nothing downstream
    /// has to consider it.
    pub fn new(positions: Vec<ByteMatcher>) -> Result<Self, MatcherBuildError> {
        if positions.is_empty() {
            return Err(MatcherBuildError::EmptySequence);
        }
        Ok(Self {
            positions: positions.into_boxed_slice(),
        })
    }

    /// Builds a sequence matching exactly the given bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MatcherBuildError> {
        Self::new(bytes.iter().map(|&b| ByteMatcher::single(b)).collect())
    }

    /// Number of positions in the sequence. Always at least 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The matcher at position `i`.
    ///
    /// # Panics
    /// Panics when `i >= self.len()`.
    #[inline]
    pub fn matcher_at(&self, i: usize) -> &ByteMatcher {
        &self.positions[i]
    }

    /// Cardinality of the accepted set at position `i`.
    ///
    /// # Panics
    /// Panics when `i >= self.len()`.
    #[inline]
    pub fn num_bytes_at(&self, i: usize) -> usize {
        self.positions[i].num_accepted()
    }

    /// Whether the sequence matches `data` at `offset`.
    ///
    /// Returns `false` when `offset + len()` overruns `data`; never panics.
    #[inline]
    pub fn matches(&self, data: &[u8], offset: usize) -> bool {
        match offset.checked_add(self.positions.len()) {
            Some(end) if end <= data.len() => self.matches_assume_bounds(data, offset),
            _ => false,
        }
    }

    /// Whether the sequence matches `data` at `offset`, assuming the caller
    /// has already proved `offset + len() <= data.len()`.
    ///
    /// The search loops establish this bound once per candidate instead of
    /// re-checking per verification.
    #[inline]
    pub fn matches_assume_bounds(&self, data: &[u8], offset: usize) -> bool {
        debug_assert!(offset + self.positions.len() <= data.len());
        self.positions
            .iter()
            .zip(&data[offset..offset + self.positions.len()])
            .all(|(m, &b)| m.matches(b))
    }

    /// Whether the sequence matches the reader's bytes at absolute `pos`.
    ///
    /// Fast path: when the whole sequence lies inside the window covering
    /// `pos`, verification runs over that window's slice. Otherwise bytes are
    /// fetched one at a time across the boundary. Running past the end of the
    /// reader is a mismatch, not an error.
    pub fn matches_reader<R: WindowReader + ?Sized>(
        &self,
        reader: &mut R,
        pos: u64,
    ) -> io::Result<bool> {
        let Some(window) = reader.window_for(pos)? else {
            return Ok(false);
        };
        let offset = window.offset_of(pos);
        if window.len() - offset >= self.positions.len() {
            return Ok(self.matches_assume_bounds(window.bytes(), offset));
        }
        for (i, matcher) in self.positions.iter().enumerate() {
            match reader.read_byte(pos + i as u64)? {
                Some(b) if matcher.matches(b) => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ByteArrayReader;

    fn abc_class_seq() -> SequenceMatcher {
        SequenceMatcher::new(vec![
            ByteMatcher::single(b'a'),
            ByteMatcher::set(&[b'b', b'B']).unwrap(),
            ByteMatcher::single(b'c'),
        ])
        .unwrap()
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(matches!(
            SequenceMatcher::new(vec![]),
            Err(MatcherBuildError::EmptySequence)
        ));
        assert!(matches!(
            SequenceMatcher::from_bytes(b""),
            Err(MatcherBuildError::EmptySequence)
        ));
    }

    #[test]
    fn matches_respects_classes() {
        let seq = abc_class_seq();
        assert!(seq.matches(b"abc", 0));
        assert!(seq.matches(b"aBc", 0));
        assert!(!seq.matches(b"abd", 0));
        assert!(seq.matches(b"xxabc", 2));
    }

    #[test]
    fn matches_is_false_out_of_bounds() {
        let seq = SequenceMatcher::from_bytes(b"abc").unwrap();
        assert!(!seq.matches(b"ab", 0));
        assert!(!seq.matches(b"abc", 1));
        assert!(!seq.matches(b"", 0));
        assert!(!seq.matches(b"abc", usize::MAX));
    }

    #[test]
    fn num_bytes_at_reports_class_sizes() {
        let seq = abc_class_seq();
        assert_eq!(seq.num_bytes_at(0), 1);
        assert_eq!(seq.num_bytes_at(1), 2);
        assert_eq!(seq.num_bytes_at(2), 1);
    }

    #[test]
    fn matches_reader_within_one_window() {
        let seq = SequenceMatcher::from_bytes(b"def").unwrap();
        let mut reader = ByteArrayReader::new(b"abcdefgh".as_slice());
        assert!(seq.matches_reader(&mut reader, 3).unwrap());
        assert!(!seq.matches_reader(&mut reader, 4).unwrap());
    }

    #[test]
    fn matches_reader_across_window_boundary() {
        let seq = SequenceMatcher::from_bytes(b"defg").unwrap();
        // Window size 4 puts "defg" across the first boundary.
        let mut reader = ByteArrayReader::with_window_size(b"abcdefgh".as_slice(), 4);
        assert!(seq.matches_reader(&mut reader, 3).unwrap());
        assert!(!seq.matches_reader(&mut reader, 2).unwrap());
    }

    #[test]
    fn matches_reader_past_end_is_false() {
        let seq = SequenceMatcher::from_bytes(b"gh").unwrap();
        let mut reader = ByteArrayReader::with_window_size(b"abcdefgh".as_slice(), 3);
        assert!(seq.matches_reader(&mut reader, 6).unwrap());
        // Sequence would run one byte past the end.
        assert!(!seq.matches_reader(&mut reader, 7).unwrap());
        // Start position itself past the end.
        assert!(!seq.matches_reader(&mut reader, 100).unwrap());
    }
}
