use std::fmt;

use crate::cost::Cost;
use crate::errors::Result;

/// A path through a graph, stored in travel order along with
/// the cost of each edge and the running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPath<N> {
    origin: N,
    steps: Vec<(N, Cost)>,
    cost: Cost,
}

impl<N> GraphPath<N> {
    pub fn new(origin: N) -> Self {
        Self {
            origin,
            steps: Vec::new(),
            cost: Cost::empty(),
        }
    }

    /// Extend the path by one edge.
    pub fn push(&mut self, node: N, edge: Cost) -> Result<()> {
        self.cost = self.cost.try_add(&edge)?;
        self.steps.push((node, edge));
        Ok(())
    }

    pub fn step_one(&self, node: N, edge: Cost) -> Result<Self>
    where
        N: Clone,
    {
        let mut nextpath = self.clone();
        nextpath.push(node, edge)?;
        Ok(nextpath)
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn origin(&self) -> &N {
        &self.origin
    }

    pub fn destination(&self) -> &N {
        self.steps
            .last()
            .map(|(node, _)| node)
            .unwrap_or(&self.origin)
    }

    /// Total cost. Empty for a path with no edges.
    pub fn cost(&self) -> &Cost {
        &self.cost
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        std::iter::once(&self.origin).chain(self.steps.iter().map(|(node, _)| node))
    }

    /// Edges as `(source, target, cost)`.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, &Cost)> {
        self.nodes()
            .zip(self.steps.iter())
            .map(|(source, (target, cost))| (source, target, cost))
    }

    pub fn contains(&self, node: &N) -> bool
    where
        N: PartialEq,
    {
        self.nodes().any(|n| n == node)
    }
}

impl<N: fmt::Display> fmt::Display for GraphPath<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        for (node, _) in &self.steps {
            write!(f, " -> {}", node)?;
        }
        Ok(())
    }
}
