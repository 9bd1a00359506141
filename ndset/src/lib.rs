//! Multi-dimensional, possibly ragged, indexed collections.
//!
//! Provides [`NSet`], a tree of dense row-major blocks. Each slot of a
//! block holds either a leaf value or a further, independently shaped
//! `NSet`, which makes it possible to express both rectangular arrays
//! and jagged structures such as "a variable number of actions per
//! state" with the same type.
//!
//! Coordinates are plain `usize` sequences, consumed level by level;
//! any [`Indexable`] value can act as (part of) a key, and tuples of
//! keys concatenate. Leaves and their coordinates are enumerated depth
//! first with [`NSet::iter`] and [`NSet::indices`], in a stable order
//! driven by a mixed-radix counter ([`IndexSlice`]).
//!
//! The crate holds no global state and does no logging; errors are
//! returned to the caller as [`NSetError`].

mod index;
pub use index::IndexSlice;

mod key;
pub use key::Indexable;

mod set;
pub use set::Mismatch;
pub use set::NSet;
pub use set::NSetError;
pub use set::Slot;

/// Depth-first iterators over leaves and leaf coordinates.
pub mod iter;

/// Per-level dimensions and row-major strides.
pub mod shape;
/// Describes the dimensions of one level of an [`NSet`].
pub use shape::Shape;
