//! Graph primitives over the unpacked node table.
//!
//! The object graph itself lives in [`crate::CrawledSnapshot`] as an arena of nodes with
//! index-based edge lists. This module provides the pieces graph algorithms need on top of
//! that representation: the [`NodeId`] newtype, the [`Successors`] abstraction and a
//! multi-source breadth-first traversal.

mod node;
mod traversal;

pub use node::NodeId;
pub use traversal::{bfs_from, BfsIterator};

/// Read access to the outgoing edges of a directed graph.
///
/// Implemented by [`crate::CrawledSnapshot`]; traversal algorithms are written against this
/// trait so they can be tested on small hand-built graphs.
pub trait Successors {
    /// Number of nodes; valid node ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Outgoing neighbours of `node`, in edge order and with multiplicity.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_;
}
