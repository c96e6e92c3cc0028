//! Search cacheing support to eliminate already explored items.

use std::collections::HashMap;
use std::default::Default;

use crate::cost::Weight;
use crate::errors::{Result, SearchError};
use crate::graph::{GraphPath, Graphable, Node};

/// How a vertex was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<N> {
    pub distance: Weight,
    pub via: Option<N>,
}

/// Defines the behavior required of a search cache.
pub trait Cache<N: Node>: Default {
    /// Is it worth queueing `vertex` at `distance`?
    fn offer(&mut self, vertex: &N, distance: Weight) -> bool;

    /// Mark a popped vertex as explored. Returns `false` when the
    /// candidate should be skipped.
    fn settle(&mut self, vertex: &N, distance: Weight, via: Option<&N>) -> bool;

    fn settled(&self) -> &HashMap<N, Settled<N>>;

    /// Rebuild the path to `goal` by following the settled predecessors.
    fn path<G>(&self, graph: &G, goal: &N) -> Result<Option<GraphPath<N>>>
    where
        G: Graphable<Node = N> + ?Sized,
    {
        let settled = self.settled();
        if !settled.contains_key(goal) {
            return Ok(None);
        }

        let mut nodes = vec![goal];
        let mut current = goal;
        while let Some(via) = settled.get(current).and_then(|s| s.via.as_ref()) {
            if nodes.len() > settled.len() {
                return Err(SearchError::Backtrack(format!("{:?}", goal)));
            }
            nodes.push(via);
            current = via;
        }

        let mut steps = nodes.into_iter().rev();
        let mut previous = match steps.next() {
            Some(origin) => origin,
            None => return Ok(None),
        };
        let mut path = GraphPath::new(previous.clone());
        for node in steps {
            let cost = graph
                .weight(previous, node)
                .ok_or_else(|| SearchError::Backtrack(format!("{:?} -> {:?}", previous, node)))?;
            path.push(node.clone(), cost.clone())?;
            previous = node;
        }
        Ok(Some(path))
    }
}

/// First visit wins; used by the blind traversals.
#[derive(Debug)]
pub struct FirstVisit<N> {
    settled: HashMap<N, Settled<N>>,
}

impl<N> Default for FirstVisit<N> {
    fn default() -> Self {
        FirstVisit {
            settled: HashMap::new(),
        }
    }
}

impl<N: Node> Cache<N> for FirstVisit<N> {
    fn offer(&mut self, vertex: &N, _distance: Weight) -> bool {
        !self.settled.contains_key(vertex)
    }

    fn settle(&mut self, vertex: &N, distance: Weight, via: Option<&N>) -> bool {
        if self.settled.contains_key(vertex) {
            return false;
        }
        self.settled.insert(
            vertex.clone(),
            Settled {
                distance,
                via: via.cloned(),
            },
        );
        true
    }

    fn settled(&self) -> &HashMap<N, Settled<N>> {
        &self.settled
    }
}

/// Provides a simple hashmap cache which remembers the best
/// distance seen and expanded for every vertex.
///
/// A vertex can be expanded again when it is reached more cheaply than
/// when it was last expanded, which keeps A* correct with heuristics
/// that are admissible but not consistent.
#[derive(Debug)]
pub struct BestDistance<N> {
    tentative: HashMap<N, Weight>,
    settled: HashMap<N, Settled<N>>,
}

impl<N> Default for BestDistance<N> {
    fn default() -> Self {
        BestDistance {
            tentative: HashMap::new(),
            settled: HashMap::new(),
        }
    }
}

impl<N: Node> Cache<N> for BestDistance<N> {
    fn offer(&mut self, vertex: &N, distance: Weight) -> bool {
        // (a) Unseen vertices are always worth queueing.
        // (b) Seen vertices only when this distance is an improvement.
        match self.tentative.get_mut(vertex) {
            Some(best) if *best <= distance => false,
            Some(best) => {
                *best = distance;
                true
            }
            None => {
                self.tentative.insert(vertex.clone(), distance);
                true
            }
        }
    }

    fn settle(&mut self, vertex: &N, distance: Weight, via: Option<&N>) -> bool {
        if let Some(best) = self.tentative.get(vertex) {
            if *best < distance {
                return false;
            }
        }
        if let Some(settled) = self.settled.get(vertex) {
            if settled.distance <= distance {
                return false;
            }
        }
        self.settled.insert(
            vertex.clone(),
            Settled {
                distance,
                via: via.cloned(),
            },
        );
        true
    }

    fn settled(&self) -> &HashMap<N, Settled<N>> {
        &self.settled
    }
}
