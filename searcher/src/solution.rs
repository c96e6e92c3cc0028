//! Registry of the paths found by a search.

use std::collections::BTreeMap;
use std::fmt;

use crate::cost::Cost;
use crate::graph::{GraphPath, Node};

/// Key under which solution paths are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Destination<N> {
    Vertex(N),
    /// No particular goal was requested.
    Any,
}

impl<N: fmt::Display> fmt::Display for Destination<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Vertex(v) => write!(f, "{}", v),
            Destination::Any => write!(f, "*"),
        }
    }
}

/// A single solution path and its cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution<N> {
    pub cost: Cost,
    pub path: GraphPath<N>,
}

impl<N> From<GraphPath<N>> for Solution<N> {
    fn from(path: GraphPath<N>) -> Self {
        Solution {
            cost: path.cost().clone(),
            path,
        }
    }
}

/// Outcome of a search for one goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult<N> {
    NoSolution,
    /// Solutions in lexicographic cost order.
    Found(Vec<Solution<N>>),
}

impl<N> SearchResult<N> {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }

    pub fn len(&self) -> usize {
        match self {
            SearchResult::NoSolution => 0,
            SearchResult::Found(solutions) => solutions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn costs(&self) -> Vec<Cost> {
        match self {
            SearchResult::NoSolution => Vec::new(),
            SearchResult::Found(solutions) => solutions.iter().map(|s| s.cost.clone()).collect(),
        }
    }

    pub fn solutions(&self) -> &[Solution<N>] {
        match self {
            SearchResult::NoSolution => &[],
            SearchResult::Found(solutions) => solutions,
        }
    }
}

/// Solution paths grouped by destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solutions<N>
where
    N: Node,
{
    paths: BTreeMap<Destination<N>, Vec<GraphPath<N>>>,
}

impl<N> Default for Solutions<N>
where
    N: Node,
{
    fn default() -> Self {
        Self {
            paths: BTreeMap::new(),
        }
    }
}

impl<N> Solutions<N>
where
    N: Node,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path under `destination`.
    pub fn add(&mut self, destination: Destination<N>, path: GraphPath<N>) {
        self.paths.entry(destination).or_default().push(path);
    }

    /// Replace every path under `destination`.
    ///
    /// An empty list removes the entry.
    pub fn set(&mut self, destination: Destination<N>, paths: Vec<GraphPath<N>>) {
        if paths.is_empty() {
            self.paths.remove(&destination);
        } else {
            self.paths.insert(destination, paths);
        }
    }

    /// Paths stored for `vertex`, falling back to the wildcard entry.
    pub fn get(&self, vertex: &N) -> Option<&[GraphPath<N>]> {
        self.paths
            .get(&Destination::Vertex(vertex.clone()))
            .or_else(|| self.paths.get(&Destination::Any))
            .map(|paths| paths.as_slice())
    }

    fn matching<'s>(
        &'s self,
        start: &'s N,
        goal: &'s N,
    ) -> impl Iterator<Item = &'s GraphPath<N>> + 's {
        self.get(goal)
            .into_iter()
            .flatten()
            .filter(move |path| path.origin() == start && path.destination() == goal)
    }

    /// Costs of the stored paths from `start` to `goal`.
    pub fn cost(&self, start: &N, goal: &N) -> Vec<Cost> {
        self.matching(start, goal)
            .map(|path| path.cost().clone())
            .collect()
    }

    /// Lexicographically smallest cost of any stored path leaving `start`.
    pub fn min_cost(&self, start: &N) -> Option<Cost> {
        self.paths
            .values()
            .flatten()
            .filter(|path| path.origin() == start)
            .map(|path| path.cost())
            .min()
            .cloned()
    }

    pub fn all(&self) -> impl Iterator<Item = (&Destination<N>, &[GraphPath<N>])> {
        self.paths.iter().map(|(d, paths)| (d, paths.as_slice()))
    }

    /// Number of destinations with stored paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear()
    }

    /// Every stored path ending at `goal`, in lexicographic cost order.
    pub fn result(&self, goal: &N) -> SearchResult<N> {
        let mut solutions: Vec<Solution<N>> = self
            .get(goal)
            .into_iter()
            .flatten()
            .filter(|path| path.destination() == goal)
            .cloned()
            .map(Solution::from)
            .collect();

        if solutions.is_empty() {
            return SearchResult::NoSolution;
        }
        solutions.sort_by(|a, b| a.cost.cmp(&b.cost));
        SearchResult::Found(solutions)
    }
}
