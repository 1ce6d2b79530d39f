//! Property-based equivalence tests.
//!
//! Run with: `cargo test --test property`

mod search_equivalence;
