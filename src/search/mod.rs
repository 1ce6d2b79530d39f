//! Searchers: signed-hash q-gram searching with a bit-parallel fallback.
//!
//! [`SignedHashSearcher`] is the entry point. Pre-processing compresses the
//! pattern into a signed shift table per direction (`table`); the search
//! loops skip through arrays or windowed streams and verify candidates
//! through the sequence matcher (`searcher`). Patterns the table cannot
//! serve profitably are routed to [`ShiftOrSearcher`] (`shift_or`), so every
//! constructible pattern is searchable by some path.

mod permutations;
mod searcher;
mod shift_or;
mod table;

pub use searcher::{BackwardMatches, ForwardMatches, SignedHashSearcher};
pub use shift_or::ShiftOrSearcher;
pub use table::{
    DEFAULT_POWER_TWO_SIZE, HASH_MULTIPLY, MAX_POWER_TWO_SIZE, MIN_POWER_TWO_SIZE, QGRAM_LEN,
};

use std::fmt;

use crate::matcher::MatcherBuildError;

/// Errors from constructing a searcher.
#[derive(Debug)]
#[non_exhaustive]
pub enum SearcherBuildError {
    /// The table-size hint lies outside the supported power-of-two range.
    TableSizeOutOfRange {
        /// The hint that was passed in.
        power_two_size: i32,
        /// Largest supported magnitude.
        max: i32,
    },
    /// The pattern itself could not be built.
    Matcher(MatcherBuildError),
}

impl fmt::Display for SearcherBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableSizeOutOfRange { power_two_size, max } => write!(
                f,
                "table size hint {power_two_size} outside supported range ±{max}"
            ),
            Self::Matcher(err) => write!(f, "invalid pattern: {err}"),
        }
    }
}

impl std::error::Error for SearcherBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Matcher(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MatcherBuildError> for SearcherBuildError {
    fn from(err: MatcherBuildError) -> Self {
        Self::Matcher(err)
    }
}
