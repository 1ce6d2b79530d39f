//! Searcher results checked against a brute-force oracle.
//!
//! The oracle scans every candidate position with `SequenceMatcher::matches`.
//! Whatever the searcher skips, negates, or straddles across windows, its
//! answers must be indistinguishable from the oracle's for every range,
//! direction, table-size hint, and window size. A deliberately small
//! alphabet keeps match density high so the verification paths get real
//! exercise.

use proptest::collection::vec;
use proptest::prelude::*;

use byteshift::{ByteArrayReader, ByteMatcher, SequenceMatcher, SignedHashSearcher};

/// Alphabet small enough to make overlaps and near-misses common.
const ALPHABET: &[u8] = b"abcd";

fn alphabet_byte() -> impl Strategy<Value = u8> {
    prop::sample::select(ALPHABET.to_vec())
}

/// A pattern position: usually a single byte, sometimes a class.
fn position() -> impl Strategy<Value = ByteMatcher> {
    prop_oneof![
        4 => alphabet_byte().prop_map(ByteMatcher::single),
        1 => prop::sample::subsequence(ALPHABET.to_vec(), 1..=3)
            .prop_map(|bytes| ByteMatcher::set(&bytes).unwrap()),
        1 => Just(ByteMatcher::range(b'a', b'c')),
    ]
}

fn sequence(max_len: usize) -> impl Strategy<Value = SequenceMatcher> {
    vec(position(), 1..=max_len).prop_map(|p| SequenceMatcher::new(p).unwrap())
}

fn haystack() -> impl Strategy<Value = Vec<u8>> {
    vec(alphabet_byte(), 0..200)
}

fn oracle_forward(seq: &SequenceMatcher, data: &[u8], from: usize, to: usize) -> Option<usize> {
    if data.len() < seq.len() {
        return None;
    }
    let last = to.min(data.len() - seq.len());
    (from..=last).find(|&i| seq.matches(data, i))
}

fn oracle_backward(seq: &SequenceMatcher, data: &[u8], from: usize, to: usize) -> Option<usize> {
    if data.len() < seq.len() {
        return None;
    }
    let first = from.min(data.len() - seq.len());
    if first < to {
        return None;
    }
    (to..=first).rev().find(|&i| seq.matches(data, i))
}

fn oracle_all(seq: &SequenceMatcher, data: &[u8]) -> Vec<usize> {
    if data.len() < seq.len() {
        return Vec::new();
    }
    (0..=data.len() - seq.len())
        .filter(|&i| seq.matches(data, i))
        .collect()
}

proptest! {
    /// Forward array searches agree with the oracle for arbitrary ranges.
    #[test]
    fn forward_array_matches_oracle(
        seq in sequence(12),
        data in haystack(),
        from in 0usize..220,
        to in 0usize..220,
    ) {
        let s = SignedHashSearcher::new(seq.clone());
        prop_assert_eq!(
            s.search_forward_array(&data, from, to),
            oracle_forward(&seq, &data, from, to)
        );
    }

    /// Backward array searches agree with the oracle for arbitrary ranges.
    #[test]
    fn backward_array_matches_oracle(
        seq in sequence(12),
        data in haystack(),
        from in 0usize..220,
        to in 0usize..220,
    ) {
        let s = SignedHashSearcher::new(seq.clone());
        prop_assert_eq!(
            s.search_backward_array(&data, from, to),
            oracle_backward(&seq, &data, from, to)
        );
    }

    /// Every table-size hint yields the same answers; only performance may
    /// differ.
    #[test]
    fn table_size_hints_do_not_change_results(
        seq in sequence(10),
        data in haystack(),
    ) {
        let expected = oracle_forward(&seq, &data, 0, data.len());
        for hint in [-16, -6, 0, 5, 10] {
            let s = SignedHashSearcher::with_table_size(seq.clone(), hint).unwrap();
            prop_assert_eq!(
                s.search_forward_array(&data, 0, data.len()),
                expected,
                "hint {}", hint
            );
        }
    }

    /// Repeated forward and backward scans enumerate the same match set.
    #[test]
    fn directions_agree_on_the_match_set(
        seq in sequence(10),
        data in haystack(),
    ) {
        let s = SignedHashSearcher::new(seq.clone());
        let forward: Vec<usize> = s.iter_forward(&data).collect();
        let mut backward: Vec<usize> = s.iter_backward(&data).collect();
        backward.reverse();
        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward, oracle_all(&seq, &data));
    }

    /// Stream searches over any window size agree with array searches on
    /// the same bytes.
    #[test]
    fn stream_searches_match_array_searches(
        seq in sequence(10),
        data in haystack(),
        window_size in 1usize..16,
        from in 0usize..220,
        to in 0usize..220,
    ) {
        let s = SignedHashSearcher::new(seq);
        let mut reader = ByteArrayReader::with_window_size(data.clone(), window_size);
        prop_assert_eq!(
            s.search_forward_stream(&mut reader, from as u64, to as u64).unwrap(),
            s.search_forward_array(&data, from, to).map(|p| p as u64)
        );
        prop_assert_eq!(
            s.search_backward_stream(&mut reader, from as u64, to as u64).unwrap(),
            s.search_backward_array(&data, from, to).map(|p| p as u64)
        );
    }

    /// Plain byte patterns via the convenience constructor behave like the
    /// equivalent sequence matcher.
    #[test]
    fn byte_patterns_match_sequence_patterns(
        pattern in vec(alphabet_byte(), 1..=10),
        data in haystack(),
    ) {
        let from_bytes = SignedHashSearcher::from_bytes(&pattern).unwrap();
        let seq = SequenceMatcher::from_bytes(&pattern).unwrap();
        prop_assert_eq!(
            from_bytes.search_forward_array(&data, 0, data.len()),
            oracle_forward(&seq, &data, 0, data.len())
        );
    }
}
