//! Shift-table pre-processing for signed-hash searching.
//!
//! Construction turns a [`SequenceMatcher`] into a flat table of signed
//! shifts indexed by a multiply-shift hash of overlapping q-grams.
//!
//! # Table contract
//! - Positive entry: the cursor can skip that many positions; no match can
//!   terminate on this q-gram.
//! - Negative entry: a match may terminate here; verify, then skip by the
//!   magnitude. The magnitude equals the shift the bucket would have carried
//!   without the terminal marking, so progress is always at least one.
//! - Untouched buckets hold the maximum shift the processed q-gram range
//!   allows; entries are never zero.
//!
//! # Size selection
//! The q-gram-start scan bounds how much of the pattern is worth processing:
//! adjacent large byte classes multiply into q-gram counts that would
//! saturate any table, so the scan stops once the running count reaches four
//! times the table capacity and the remaining positions are left out. When
//! the surviving span allows a maximum shift below 2 the table is not worth
//! using at all and construction reports the pattern as unsearchable; the
//! caller falls back to ShiftOr.

use crate::matcher::SequenceMatcher;

use super::permutations::QgramPermutations;

/// Length of the q-grams read by the searcher.
pub const QGRAM_LEN: usize = 4;

/// Smallest hash table size auto-selection will pick, as a power of two.
pub const MIN_POWER_TWO_SIZE: i32 = 5;

/// Largest hash table size the algorithm supports, as a power of two.
pub const MAX_POWER_TWO_SIZE: i32 = 28;

/// Default size hint: auto-select, capped at 2^16 entries.
pub const DEFAULT_POWER_TWO_SIZE: i32 = -16;

/// Multiplier of the multiply-shift hash. Odd, with a populated upper word;
/// kept bit-exact with the value the algorithm was validated against.
pub const HASH_MULTIPLY: u64 = 0xee4c_2ad3_f592_b105;

/// Multiply-shift hash of a packed q-gram key.
///
/// The high `64 - hash_shift` bits of the product become the table index.
#[inline]
pub(crate) fn qgram_hash(key: u32, hash_shift: u32) -> usize {
    ((key as u64).wrapping_mul(HASH_MULTIPLY) >> hash_shift) as usize
}

/// Pre-computed search data for one direction: the signed shift table and
/// the bit shift of the hash function.
#[derive(Debug)]
pub(crate) struct ShiftTable {
    shifts: Box<[i32]>,
    hash_shift: u32,
}

impl ShiftTable {
    /// Signed shift for the q-gram packed into `key`.
    #[inline]
    pub(crate) fn shift_for(&self, key: u32) -> i32 {
        self.shifts[qgram_hash(key, self.hash_shift)]
    }

    #[cfg(test)]
    pub(crate) fn shifts(&self) -> &[i32] {
        &self.shifts
    }

    #[cfg(test)]
    pub(crate) fn hash_shift(&self) -> u32 {
        self.hash_shift
    }
}

/// Builds the forward-search table, or `None` when the pattern is
/// unsearchable by this algorithm (shorter than a q-gram, or the usable
/// shifts are too small to beat the fallback).
///
/// `power_two_size` semantics: positive forces that exact size, zero
/// auto-selects up to [`MAX_POWER_TWO_SIZE`], negative auto-selects capped
/// at the magnitude. The caller validates the range.
pub(crate) fn build_forward(seq: &SequenceMatcher, power_two_size: i32) -> Option<ShiftTable> {
    let len = seq.len();
    if len < QGRAM_LEN {
        return None;
    }
    let max_power = effective_max_power(power_two_size);
    let max_table_size = 1u64 << max_power;

    // Walk q-gram starts from the end of the pattern toward the front,
    // accumulating how many distinct q-grams the byte classes produce. A
    // position that would push the table past its load bound is excluded,
    // along with everything before it.
    let mut total_qgrams = 0u64;
    let mut qgram_start = 0usize;
    for p in (0..=len - QGRAM_LEN).rev() {
        total_qgrams += qgram_cardinality(seq, p);
        if total_qgrams >> 2 >= max_table_size {
            qgram_start = p + 1;
            break;
        }
    }

    let hash_size = select_hash_size(power_two_size, max_power, total_qgrams);
    let hash_shift = 64 - hash_size;

    let max_search_shift = (len - QGRAM_LEN + 1) as i64 - qgram_start as i64;
    if max_search_shift < 2 {
        return None;
    }
    let max_search_shift = max_search_shift as i32;

    let mut shifts = vec![max_search_shift; 1usize << hash_size].into_boxed_slice();

    // Interior q-grams, nearest-to-front first: later (smaller) shifts
    // overwrite earlier ones, leaving the minimum in every touched bucket.
    let last_pattern_pos = len - 1;
    for end in (qgram_start + QGRAM_LEN - 1)..last_pattern_pos {
        let shift = (last_pattern_pos - end) as i32;
        for_each_qgram_hash(seq, end - (QGRAM_LEN - 1), hash_shift, |h| {
            shifts[h] = shift;
        });
    }

    // Terminal q-gram: flag its buckets as verification points.
    for_each_qgram_hash(seq, last_pattern_pos - (QGRAM_LEN - 1), hash_shift, |h| {
        if shifts[h] > 0 {
            shifts[h] = -shifts[h];
        }
    });

    Some(ShiftTable { shifts, hash_shift })
}

/// Builds the backward-search table: the exact directional mirror of
/// [`build_forward`], with the roles of pattern start and end swapped.
///
/// The terminal q-gram sits at pattern positions `[0, QGRAM_LEN)`; an
/// interior q-gram starting at position `s` carries shift `s`, the distance
/// the cursor moves down before the terminal q-gram could align again.
pub(crate) fn build_backward(seq: &SequenceMatcher, power_two_size: i32) -> Option<ShiftTable> {
    let len = seq.len();
    if len < QGRAM_LEN {
        return None;
    }
    let max_power = effective_max_power(power_two_size);
    let max_table_size = 1u64 << max_power;

    // Mirror scan: q-gram starts walk from the front toward the end; the
    // saturating position and everything after it are excluded.
    let mut total_qgrams = 0u64;
    let mut cutoff = len - QGRAM_LEN;
    let mut saturated_at_front = false;
    for s in 0..=len - QGRAM_LEN {
        total_qgrams += qgram_cardinality(seq, s);
        if total_qgrams >> 2 >= max_table_size {
            if s == 0 {
                saturated_at_front = true;
            } else {
                cutoff = s - 1;
            }
            break;
        }
    }
    if saturated_at_front {
        return None;
    }

    let hash_size = select_hash_size(power_two_size, max_power, total_qgrams);
    let hash_shift = 64 - hash_size;

    let max_search_shift = cutoff as i32 + 1;
    if max_search_shift < 2 {
        return None;
    }

    let mut shifts = vec![max_search_shift; 1usize << hash_size].into_boxed_slice();

    // Interior q-grams, farthest-from-front first, so the minimum shift
    // survives in every touched bucket.
    for s in (1..=cutoff).rev() {
        let shift = s as i32;
        for_each_qgram_hash(seq, s, hash_shift, |h| {
            shifts[h] = shift;
        });
    }

    // Terminal q-gram at the pattern start.
    for_each_qgram_hash(seq, 0, hash_shift, |h| {
        if shifts[h] > 0 {
            shifts[h] = -shifts[h];
        }
    });

    Some(ShiftTable { shifts, hash_shift })
}

fn effective_max_power(power_two_size: i32) -> u32 {
    debug_assert!(power_two_size.unsigned_abs() <= MAX_POWER_TWO_SIZE as u32);
    if power_two_size > 0 {
        power_two_size as u32
    } else if power_two_size == 0 {
        MAX_POWER_TWO_SIZE as u32
    } else {
        power_two_size.unsigned_abs()
    }
}

fn select_hash_size(power_two_size: i32, max_power: u32, total_qgrams: u64) -> u32 {
    if power_two_size > 0 {
        power_two_size as u32
    } else {
        ceil_log2(total_qgrams).clamp(MIN_POWER_TWO_SIZE as u32, max_power)
    }
}

/// Smallest `w` with `2^w >= x`.
fn ceil_log2(x: u64) -> u32 {
    if x <= 1 {
        0
    } else {
        64 - (x - 1).leading_zeros()
    }
}

/// Number of distinct q-grams the classes at `[start, start + QGRAM_LEN)`
/// can produce.
fn qgram_cardinality(seq: &SequenceMatcher, start: usize) -> u64 {
    (0..QGRAM_LEN)
        .map(|i| seq.num_bytes_at(start + i) as u64)
        .product()
}

/// Applies `f` to the hash of every concrete q-gram the classes at
/// `[start, start + QGRAM_LEN)` can produce.
///
/// When only the final position carries a class the key prefix is built once
/// and the class is swept into the low byte, which covers both the
/// all-single case and the common trailing-class case without touching the
/// odometer.
fn for_each_qgram_hash(
    seq: &SequenceMatcher,
    start: usize,
    hash_shift: u32,
    mut f: impl FnMut(usize),
) {
    let sets: [Vec<u8>; QGRAM_LEN] = [
        seq.matcher_at(start).accepted_bytes(),
        seq.matcher_at(start + 1).accepted_bytes(),
        seq.matcher_at(start + 2).accepted_bytes(),
        seq.matcher_at(start + 3).accepted_bytes(),
    ];
    if sets[0].len() == 1 && sets[1].len() == 1 && sets[2].len() == 1 {
        let prefix =
            (sets[0][0] as u32) << 24 | (sets[1][0] as u32) << 16 | (sets[2][0] as u32) << 8;
        for &b in &sets[3] {
            f(qgram_hash(prefix | b as u32, hash_shift));
        }
    } else {
        for key in QgramPermutations::new([&sets[0], &sets[1], &sets[2], &sets[3]]) {
            f(qgram_hash(key, hash_shift));
        }
    }
}
