use std::fmt::Debug;
use std::hash::Hash;

use crate::cost::Cost;

/// Bounds required of a vertex identifier.
///
/// Ordering is only used to make iteration (and therefore tie-breaking)
/// deterministic.
pub trait Node: Debug + Clone + Hash + Eq + Ord {}

impl<T> Node for T where T: Debug + Clone + Hash + Eq + Ord {}

/// Read-only graph queries consumed by every search algorithm.
///
/// Queries about unknown vertices never fail: they produce empty
/// lists, and a missing edge has no weight.
pub trait Graphable {
    type Node: Node;

    /// Number of components in every edge cost.
    fn arity(&self) -> usize;

    fn vertices(&self) -> Vec<&Self::Node>;

    fn contains(&self, vertex: &Self::Node) -> bool;

    fn successors(&self, vertex: &Self::Node) -> Vec<&Self::Node>;

    fn predecessors(&self, vertex: &Self::Node) -> Vec<&Self::Node>;

    fn weight(&self, source: &Self::Node, target: &Self::Node) -> Option<&Cost>;

    /// Successors paired with the cost of the edge reaching them.
    fn outgoing(&self, vertex: &Self::Node) -> Vec<(&Self::Node, &Cost)> {
        self.successors(vertex)
            .into_iter()
            .filter_map(|target| self.weight(vertex, target).map(|w| (target, w)))
            .collect()
    }
}
