//! Breadth-first traversal from a set of roots.
//!
//! Liveness in the object graph is a multi-source reachability question: every root is live,
//! and so is everything reachable from any root. [`bfs_from`] answers it in O(V + E) with a
//! single queue seeded with all roots at once.
//!
//! The iterator is lazy; collecting it, or calling [`BfsIterator::into_visited`] after
//! draining it, yields the full reachable set.

use std::collections::VecDeque;

use crate::utils::{
    graph::{NodeId, Successors},
    BitSet,
};

/// Breadth-first search iterator over graph nodes.
///
/// Each reachable node is yielded exactly once. Roots are yielded first, in the order given,
/// followed by nodes in order of increasing distance from the nearest root.
///
/// # Type Parameters
///
/// * `'g` - Lifetime of the graph reference
/// * `G` - Graph type implementing [`Successors`]
pub struct BfsIterator<'g, G: Successors> {
    graph: &'g G,
    queue: VecDeque<NodeId>,
    visited: BitSet,
}

impl<'g, G: Successors> BfsIterator<'g, G> {
    fn new<I>(graph: &'g G, roots: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let node_count = graph.node_count();
        let mut visited = BitSet::new(node_count);
        let mut queue = VecDeque::new();

        for root in roots {
            // Roots outside the graph are skipped
            if root.index() < node_count && visited.insert(root.index()) {
                queue.push_back(root);
            }
        }

        BfsIterator {
            graph,
            queue,
            visited,
        }
    }

    /// Drains the traversal and returns the set of visited node indices.
    #[must_use]
    pub fn into_visited(mut self) -> BitSet {
        while self.next().is_some() {}
        self.visited
    }
}

impl<G: Successors> Iterator for BfsIterator<'_, G> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;

        for succ in self.graph.successors(node) {
            if succ.index() < self.visited.len() && self.visited.insert(succ.index()) {
                self.queue.push_back(succ);
            }
        }

        Some(node)
    }
}

/// Returns a breadth-first search iterator seeded with every node in `roots`.
///
/// # Complexity
///
/// - Time: O(V + E) where V is the number of vertices and E is the number of edges
/// - Space: O(V) for the visited set and queue
///
/// # Examples
///
/// ```rust,ignore
/// use snapscope::utils::graph::{bfs_from, NodeId};
///
/// // a -> b -> c, d isolated
/// let reachable: Vec<NodeId> = bfs_from(&graph, [a]).collect();
/// assert_eq!(reachable, vec![a, b, c]);
/// ```
pub fn bfs_from<G, I>(graph: &G, roots: I) -> BfsIterator<'_, G>
where
    G: Successors,
    I: IntoIterator<Item = NodeId>,
{
    BfsIterator::new(graph, roots)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AdjacencyList(Vec<Vec<usize>>);

    impl Successors for AdjacencyList {
        fn node_count(&self) -> usize {
            self.0.len()
        }

        fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
            self.0[node.index()].iter().copied().map(NodeId::new)
        }
    }

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn single_root_chain() {
        let graph = AdjacencyList(vec![vec![1], vec![2], vec![], vec![]]);
        let order: Vec<NodeId> = bfs_from(&graph, ids(&[0])).collect();
        assert_eq!(order, ids(&[0, 1, 2]));
    }

    #[test]
    fn multiple_roots_visit_each_node_once() {
        // 0 -> 2, 1 -> 2, 2 -> 3, 3 -> 0 (cycle back), 4 isolated
        let graph = AdjacencyList(vec![vec![2], vec![2], vec![3, 3], vec![0], vec![]]);
        let order: Vec<NodeId> = bfs_from(&graph, ids(&[0, 1])).collect();
        assert_eq!(order, ids(&[0, 1, 2, 3]));

        let visited = bfs_from(&graph, ids(&[0, 1])).into_visited();
        assert_eq!(visited.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn duplicate_and_invalid_roots() {
        let graph = AdjacencyList(vec![vec![], vec![0]]);
        let order: Vec<NodeId> = bfs_from(&graph, ids(&[1, 1, 9])).collect();
        assert_eq!(order, ids(&[1, 0]));
    }

    #[test]
    fn no_roots() {
        let graph = AdjacencyList(vec![vec![1], vec![]]);
        assert_eq!(bfs_from(&graph, Vec::new()).count(), 0);
    }

    #[test]
    fn self_loop() {
        let graph = AdjacencyList(vec![vec![0]]);
        let order: Vec<NodeId> = bfs_from(&graph, ids(&[0])).collect();
        assert_eq!(order, ids(&[0]));
    }
}
