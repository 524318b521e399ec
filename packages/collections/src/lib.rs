#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Containers the trip catalog is built on.
//!
//! - [`OrderedList`]: a growable, index-addressable sequence with a stable
//!   merge sort driven by a caller-supplied "must precede" predicate.
//! - [`HashIndex`]: an open-addressing (linear probing) map from string keys
//!   to values, sized up front from an expected element count and a target
//!   load factor.

pub mod hash_index;
pub mod list;
pub mod sort;

pub use hash_index::HashIndex;
pub use list::OrderedList;

/// Errors returned by the container operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    /// Positional access outside `[0, size)`.
    #[error("Index {index} out of range for list of size {size}")]
    OutOfRange {
        /// Requested position.
        index: usize,
        /// Size of the list at the time of the access.
        size: usize,
    },

    /// Hash index load factor outside `(0, 1)`.
    #[error("Invalid load factor {0}: expected a value in (0, 1)")]
    InvalidLoadFactor(f64),
}
