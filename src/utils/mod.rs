//! Internal utilities shared across the crate.

mod bitset;
pub mod graph;

pub use bitset::BitSet;
