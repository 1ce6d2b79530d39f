//! Sublinear byte-sequence searching over arrays and windowed streams.
//!
//! The crate searches for a single pattern (plain bytes or per-position
//! byte classes) using a signed-hash q-gram algorithm: a multiply-shift
//! hash over overlapping 4-grams indexes a table whose entries encode both
//! safe skip distances (positive) and verification points (negative) in one
//! lookup. Q-grams occur less often than single bytes, so skips stay large
//! even for complex patterns.
//!
//! High-level flow (single search):
//! 1) Lazily pre-process the pattern into a shift table for the direction.
//! 2) Skip through the input q-gram by q-gram, cursor on the match end
//!    (forward) or start (backward).
//! 3) On a negative table entry, verify the candidate through the pattern's
//!    position matchers.
//! 4) For streams, fetch bytes through a [`WindowReader`]; q-grams that
//!    straddle a window boundary are assembled byte by byte.
//!
//! Patterns too short for q-grams, or too class-heavy for the table to pay
//! off, are served by a ShiftOr bit-parallel fallback, so construction never
//! fails for a valid pattern.
//!
//! Out of scope here: pattern-syntax parsing and compilation, automata and
//! multi-pattern searching, and file/mmap readers. Those live with callers;
//! this crate consumes their patterns via [`SequenceMatcher`] and their byte
//! sources via [`WindowReader`].

pub mod io;
pub mod matcher;
pub mod search;

pub use crate::io::{ByteArrayReader, Window, WindowReader};
pub use crate::matcher::{ByteMatcher, MatcherBuildError, SequenceMatcher};
pub use crate::search::{
    SearcherBuildError, ShiftOrSearcher, SignedHashSearcher, DEFAULT_POWER_TWO_SIZE,
    HASH_MULTIPLY, MAX_POWER_TWO_SIZE, MIN_POWER_TWO_SIZE, QGRAM_LEN,
};
