//! The reachability ("ignore unused") filter.
//!
//! Runs one breadth-first search from every root at once and hides whatever it never reached.

use crate::{
    filter::RootPredicate,
    snapshot::CrawledSnapshot,
    utils::graph::{bfs_from, NodeId},
};

/// Marks every node that no root reaches as ignored.
///
/// Roots and everything reachable from them through outgoing references are left untouched.
/// Flags are only ever set, never cleared; run it through [`crate::filter::apply_filter`] to
/// start from a clean snapshot. Returns the number of nodes marked.
pub fn ignore_unused<R>(snapshot: &mut CrawledSnapshot, roots: &R) -> usize
where
    R: RootPredicate + ?Sized,
{
    let visited = {
        let graph = &*snapshot;
        let seeds = (0..graph.len())
            .map(NodeId::new)
            .filter(|node| roots.is_root(graph, *node));
        bfs_from(graph, seeds).into_visited()
    };

    let mut marked = 0;
    for (index, thing) in snapshot.things_mut().iter_mut().enumerate() {
        if !visited.contains(index) {
            thing.set_ignored(true);
            marked += 1;
        }
    }
    marked
}
