use crate::cost::{Cost, Weight};
use crate::errors::Result;
use crate::graph::Node;
use crate::metrics::Metrics;
use crate::solution::{SearchResult, Solutions};

/// Common interface of every search algorithm.
///
/// A run never fails because a vertex is missing or a goal is
/// unreachable; those cases are logged and leave no entry in
/// [Search::solutions]. Errors are reserved for misuse, such as
/// running a bi-objective algorithm on a graph with three objectives.
pub trait Search<N: Node> {
    fn name(&self) -> &'static str;

    /// Search from `start`. With no goals, algorithms which support it
    /// explore the whole graph and store their paths under the
    /// wildcard destination.
    fn run(&mut self, start: &N, goals: &[N]) -> Result<()>;

    fn solutions(&self) -> &Solutions<N>;

    fn metrics(&self) -> &Metrics;

    fn result(&self, goal: &N) -> SearchResult<N> {
        self.solutions().result(goal)
    }
}

/// A scalar estimate of the distance remaining to a goal.
///
/// `None` means the goal cannot be reached from `vertex`. Admissibility
/// is not checked.
pub trait Heuristic<N> {
    fn estimate(&mut self, vertex: &N, goal: &N) -> Option<Weight>;
}

impl<N, F> Heuristic<N> for F
where
    F: FnMut(&N, &N) -> Option<Weight>,
{
    fn estimate(&mut self, vertex: &N, goal: &N) -> Option<Weight> {
        self(vertex, goal)
    }
}

/// A vector estimate of the cost remaining to the nearest goal.
pub trait CostHeuristic<N> {
    fn estimate(&mut self, vertex: &N, goals: &[N]) -> Cost;
}

impl<N, F> CostHeuristic<N> for F
where
    F: FnMut(&N, &[N]) -> Cost,
{
    fn estimate(&mut self, vertex: &N, goals: &[N]) -> Cost {
        self(vertex, goals)
    }
}

/// Chooses which of several equally promising vertices to expand next.
pub trait VertexSelector<N> {
    /// Index of the chosen candidate, `None` only when there are none.
    fn select(&mut self, candidates: &[&N]) -> Option<usize>;
}
