//! Labels and the bookkeeping shared by the multi-objective searches.
//!
//! A label is one partial path, identified by its vertex, its accumulated
//! cost and a pointer to the label it was extended from. Labels live in an
//! append-only [LabelArena], so a [LabelId] stays valid for the whole run
//! and solution paths are rebuilt by following predecessor pointers.

use std::collections::BTreeMap;
use std::ops::Index;

use log::warn;

use super::GoalPruning;
use crate::cost::Cost;
use crate::errors::{Result, SearchError};
use crate::graph::{GraphPath, Graphable, Node};
use crate::solution::{Destination, Solutions};

/// Handle to a label stored in a [LabelArena].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<N> {
    pub vertex: N,
    pub cost: Cost,
    pub predecessor: Option<LabelId>,
}

#[derive(Debug, Clone)]
pub struct LabelArena<N> {
    labels: Vec<Label<N>>,
}

impl<N> Default for LabelArena<N> {
    fn default() -> Self {
        Self { labels: Vec::new() }
    }
}

impl<N> LabelArena<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, vertex: N, cost: Cost, predecessor: Option<LabelId>) -> LabelId {
        self.labels.push(Label {
            vertex,
            cost,
            predecessor,
        });
        LabelId(self.labels.len() - 1)
    }

    pub fn get(&self, id: LabelId) -> Option<&Label<N>> {
        self.labels.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        self.labels.clear()
    }
}

impl<N> Index<LabelId> for LabelArena<N> {
    type Output = Label<N>;

    fn index(&self, id: LabelId) -> &Self::Output {
        &self.labels[id.0]
    }
}

/// Rebuild the path ending with label `id`.
///
/// Each step back subtracts the edge cost from the running cost, which
/// must then equal the cost of the predecessor label. Anything else
/// means the label chain is corrupt, and is reported as an error.
pub fn backtrack<G>(
    graph: &G,
    arena: &LabelArena<G::Node>,
    id: LabelId,
) -> Result<GraphPath<G::Node>>
where
    G: Graphable + ?Sized,
{
    let broken = |label: &Label<G::Node>| {
        SearchError::Backtrack(format!("{:?} at {}", label.vertex, label.cost))
    };

    let mut current = arena
        .get(id)
        .ok_or_else(|| SearchError::Backtrack(format!("unknown label {:?}", id)))?;
    let mut remaining = current.cost.clone();
    let mut steps = Vec::new();

    while let Some(previous) = current.predecessor {
        let previous = arena.get(previous).ok_or_else(|| broken(current))?;
        let edge = graph
            .weight(&previous.vertex, &current.vertex)
            .ok_or_else(|| broken(current))?;

        remaining = remaining.try_sub(edge).map_err(|_| broken(current))?;
        if remaining != previous.cost || steps.len() >= arena.len() {
            return Err(broken(current));
        }

        steps.push((current.vertex.clone(), edge.clone()));
        current = previous;
    }

    let mut path = GraphPath::new(current.vertex.clone());
    for (vertex, edge) in steps.into_iter().rev() {
        path.push(vertex, edge)?;
    }
    Ok(path)
}

/// Non-dominated solution labels per goal.
#[derive(Debug, Clone)]
pub struct SolutionCosts<N>
where
    N: Node,
{
    pruning: GoalPruning,
    goals: BTreeMap<N, Vec<(LabelId, Cost)>>,
}

impl<N> SolutionCosts<N>
where
    N: Node,
{
    pub fn new(pruning: GoalPruning, goals: &[N]) -> Self {
        Self {
            pruning,
            goals: goals.iter().map(|g| (g.clone(), Vec::new())).collect(),
        }
    }

    pub fn is_goal(&self, vertex: &N) -> bool {
        self.goals.contains_key(vertex)
    }

    fn all(&self) -> impl Iterator<Item = &Cost> {
        self.goals.values().flatten().map(|(_, cost)| cost)
    }

    fn any_dominates<'c, I>(costs: I, f: &Cost) -> Result<bool>
    where
        I: IntoIterator<Item = &'c Cost>,
    {
        for cost in costs {
            if cost.dominates(f)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Can a partial path with estimated total `f` be discarded?
    pub fn prunes(&self, f: &Cost) -> Result<bool> {
        match self.pruning {
            GoalPruning::Shared => Self::any_dominates(self.all(), f),
            GoalPruning::PerGoal => {
                if self.goals.is_empty() {
                    return Ok(false);
                }
                for found in self.goals.values() {
                    if !Self::any_dominates(found.iter().map(|(_, c)| c), f)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Would a path reaching `goal` with cost `g` be a new solution?
    pub fn admits(&self, goal: &N, g: &Cost) -> Result<bool> {
        let competing: Vec<&Cost> = match self.pruning {
            GoalPruning::Shared => self.all().collect(),
            GoalPruning::PerGoal => self
                .goals
                .get(goal)
                .into_iter()
                .flatten()
                .map(|(_, c)| c)
                .collect(),
        };
        for cost in competing {
            if cost.dominates_or_equals(g)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Record a solution, evicting the solutions it dominates.
    ///
    /// With shared pruning, solutions of other goals are evicted too.
    pub fn record(&mut self, goal: &N, id: LabelId, cost: Cost) -> Result<()> {
        let shared = self.pruning == GoalPruning::Shared;
        for (other, found) in self.goals.iter_mut() {
            if !shared && other != goal {
                continue;
            }
            let mut kept = Vec::with_capacity(found.len());
            for (existing, c) in found.drain(..) {
                if !cost.dominates(&c)? {
                    kept.push((existing, c));
                }
            }
            *found = kept;
        }

        self.goals
            .entry(goal.clone())
            .or_default()
            .push((id, cost));
        Ok(())
    }

    /// Solution labels for `goal`, in lexicographic cost order.
    pub fn labels(&self, goal: &N) -> Vec<LabelId> {
        let mut found: Vec<&(LabelId, Cost)> =
            self.goals.get(goal).into_iter().flatten().collect();
        found.sort_by(|a, b| a.1.cmp(&b.1));
        found.into_iter().map(|(id, _)| *id).collect()
    }

    /// Solution costs for `goal`, in lexicographic order.
    pub fn costs(&self, goal: &N) -> Vec<Cost> {
        let mut costs: Vec<Cost> = self
            .goals
            .get(goal)
            .into_iter()
            .flatten()
            .map(|(_, c)| c.clone())
            .collect();
        costs.sort();
        costs
    }

    /// Rebuild every solution path and store it in `solutions`.
    ///
    /// Goals without a solution are logged and left out.
    pub fn store<G>(
        &self,
        algorithm: &str,
        graph: &G,
        arena: &LabelArena<N>,
        start: &N,
        solutions: &mut Solutions<N>,
    ) -> Result<()>
    where
        G: Graphable<Node = N> + ?Sized,
    {
        for goal in self.goals.keys() {
            let mut paths = Vec::new();
            for id in self.labels(goal) {
                paths.push(backtrack(graph, arena, id)?);
            }
            if paths.is_empty() {
                warn!("{}: no path from {:?} to {:?}", algorithm, start, goal);
            }
            solutions.set(Destination::Vertex(goal.clone()), paths);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::Graph;

    fn graph() -> Graph<char> {
        Graph::from_edges(
            2,
            vec![
                ('s', 'a', Cost::from([1, 2])),
                ('a', 'y', Cost::from([2, 2])),
                ('s', 'y', Cost::from([4, 1])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn arena() {
        let mut arena = LabelArena::new();
        assert!(arena.is_empty());
        let s = arena.push('s', Cost::zero(2), None);
        let a = arena.push('a', Cost::from([1, 2]), Some(s));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a].predecessor, Some(s));
        assert_eq!(arena.get(a).map(|l| l.vertex), Some('a'));
        assert!(arena.get(LabelId(9)).is_none());
    }

    #[test]
    fn rebuild() {
        let graph = graph();
        let mut arena = LabelArena::new();
        let s = arena.push('s', Cost::zero(2), None);
        let a = arena.push('a', Cost::from([1, 2]), Some(s));
        let y = arena.push('y', Cost::from([3, 4]), Some(a));

        let path = backtrack(&graph, &arena, y).unwrap();
        assert_eq!(path.nodes().copied().collect::<Vec<_>>(), vec!['s', 'a', 'y']);
        assert_eq!(path.cost(), &Cost::from([3, 4]));

        // Cost does not match the edge taken.
        let bad = arena.push('y', Cost::from([3, 5]), Some(a));
        assert!(matches!(
            backtrack(&graph, &arena, bad),
            Err(SearchError::Backtrack(_))
        ));

        // No such edge.
        let missing = arena.push('a', Cost::from([5, 5]), Some(y));
        assert!(backtrack(&graph, &arena, missing).is_err());
    }

    #[test]
    fn per_goal() {
        let mut costs = SolutionCosts::new(GoalPruning::PerGoal, &['x', 'y']);
        assert!(costs.is_goal(&'x'));
        assert!(!costs.prunes(&Cost::from([9, 9])).unwrap());

        costs.record(&'y', LabelId(0), Cost::from([4, 10])).unwrap();
        costs.record(&'y', LabelId(1), Cost::from([9, 3])).unwrap();
        // x has no solution yet.
        assert!(!costs.prunes(&Cost::from([10, 11])).unwrap());
        assert!(!costs.admits(&'y', &Cost::from([4, 10])).unwrap());
        assert!(!costs.admits(&'y', &Cost::from([5, 10])).unwrap());
        assert!(costs.admits(&'y', &Cost::from([5, 5])).unwrap());
        assert!(costs.admits(&'x', &Cost::from([5, 10])).unwrap());

        costs.record(&'x', LabelId(2), Cost::from([1, 1])).unwrap();
        assert!(costs.prunes(&Cost::from([10, 11])).unwrap());
        assert!(!costs.prunes(&Cost::from([2, 2])).unwrap());

        costs.record(&'y', LabelId(3), Cost::from([4, 4])).unwrap();
        assert_eq!(costs.costs(&'y'), vec![Cost::from([4, 4]), Cost::from([9, 3])]);
        assert_eq!(costs.labels(&'y'), vec![LabelId(3), LabelId(1)]);
        assert_eq!(costs.costs(&'x'), vec![Cost::from([1, 1])]);
    }

    #[test]
    fn shared() {
        let mut costs = SolutionCosts::new(GoalPruning::Shared, &['x', 'y']);
        costs.record(&'y', LabelId(0), Cost::from([5, 11])).unwrap();
        assert!(costs.prunes(&Cost::from([6, 12])).unwrap());
        assert!(!costs.admits(&'x', &Cost::from([6, 12])).unwrap());

        costs.record(&'x', LabelId(1), Cost::from([4, 11])).unwrap();
        assert!(costs.costs(&'y').is_empty());
        assert_eq!(costs.labels(&'x'), vec![LabelId(1)]);
    }

    #[test]
    fn store() {
        let graph = graph();
        let mut arena = LabelArena::new();
        let s = arena.push('s', Cost::zero(2), None);
        let y = arena.push('y', Cost::from([4, 1]), Some(s));

        let mut costs = SolutionCosts::new(GoalPruning::PerGoal, &['a', 'y']);
        costs.record(&'y', y, Cost::from([4, 1])).unwrap();

        let mut solutions = Solutions::new();
        costs.store("test", &graph, &arena, &'s', &mut solutions).unwrap();
        assert_eq!(solutions.cost(&'s', &'y'), vec![Cost::from([4, 1])]);
        assert!(solutions.get(&'a').is_none());
    }
}
