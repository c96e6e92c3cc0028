//! Provides the building blocks for search algorithms

use std::collections::HashSet;
use std::default::Default;

use log::warn;

use self::cache::Cache;
use self::score::Scored;
use crate::cost::{Cost, Weight};
use crate::errors::{Result, SearchError};
use crate::graph::{Graphable, Node};
use crate::metrics::Observer;

pub mod astar;
pub mod basic;
pub mod bdijkstra;
pub(crate) mod cache;
pub mod dijkstra;
pub mod heap;
pub mod labels;
pub mod moa;
pub mod namoa;
pub mod pulse;
pub(crate) mod score;

/// Trait used to implement queues of search candidates
/// which should be checked for completion.
pub trait SearchQueue {
    type Candidate;

    fn pop(&mut self) -> Option<Self::Candidate>;

    fn push(&mut self, item: Self::Candidate);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How solutions found for one goal restrict the search for others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalPruning {
    /// A partial path is only abandoned when it is dominated by the
    /// solutions of every goal, and a goal label only competes with
    /// solutions for the same goal.
    #[default]
    PerGoal,

    /// All solutions form one set, so a solution for one goal can
    /// discard paths to another.
    Shared,
}

/// Options shared by every algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub pruning: GoalPruning,

    /// Log a progress line every this many expansions (0 disables it).
    pub progress: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            pruning: GoalPruning::default(),
            progress: 10_000,
        }
    }
}

impl SearchOptions {
    pub fn with_pruning(mut self, pruning: GoalPruning) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_progress(mut self, progress: usize) -> Self {
        self.progress = progress;
        self
    }
}

/// Check the start and goals of a run.
///
/// Returns the goals worth searching for, or `None` when the run
/// should not happen at all. Every rejected endpoint is logged.
pub fn validate_endpoints<G>(
    graph: &G,
    algorithm: &str,
    start: &G::Node,
    goals: &[G::Node],
) -> Option<Vec<G::Node>>
where
    G: Graphable + ?Sized,
{
    if !graph.contains(start) {
        warn!("{}: start {:?} is not in the graph", algorithm, start);
        return None;
    }

    let mut valid = Vec::with_capacity(goals.len());
    for goal in goals {
        if !graph.contains(goal) {
            warn!("{}: goal {:?} is not in the graph", algorithm, goal);
        } else if goal == start {
            warn!("{}: start and goal are both {:?}, nothing to search", algorithm, goal);
        } else if !valid.contains(goal) {
            valid.push(goal.clone());
        }
    }

    if !goals.is_empty() && valid.is_empty() {
        return None;
    }
    Some(valid)
}

/// Fail unless the graph's costs have exactly `expected` components.
pub(crate) fn require_arity<G>(graph: &G, algorithm: &'static str, expected: usize) -> Result<()>
where
    G: Graphable + ?Sized,
{
    if graph.arity() != expected {
        return Err(SearchError::UnsupportedArity {
            algorithm,
            expected,
            found: graph.arity(),
        });
    }
    Ok(())
}

/// Implementation of single-objective search, using generic components.
///
/// Uses a generic queue (Q) and a generic cache (C) to provide a single
/// foundation for Dijkstra, A* and the blind traversals.
#[derive(Debug)]
pub(crate) struct SearchAlgorithm<Q, C> {
    queue: Q,
    cache: C,
    sequence: usize,
}

impl<N, Q, C> SearchAlgorithm<Q, C>
where
    N: Node,
    Q: SearchQueue<Candidate = Scored<N>> + Default,
    C: Cache<N>,
{
    pub(crate) fn new() -> Self {
        Self {
            queue: Q::default(),
            cache: C::default(),
            sequence: 0,
        }
    }

    fn push(&mut self, vertex: N, distance: Weight, priority: Weight, via: Option<N>) {
        self.sequence += 1;
        self.queue.push(Scored {
            priority,
            sequence: self.sequence,
            distance,
            vertex,
            via,
        });
    }

    /// Run from `start` until every target has been settled, or until
    /// the queue runs dry when there are no targets.
    ///
    /// `heuristic` is added to the distance to form the priority; a
    /// vertex it returns `None` for is never queued.
    pub(crate) fn run<G, H>(
        mut self,
        graph: &G,
        start: &N,
        targets: &[N],
        objective: usize,
        observer: &mut Observer<'_, N>,
        mut heuristic: H,
    ) -> Result<C>
    where
        G: Graphable<Node = N> + ?Sized,
        H: FnMut(&N) -> Option<Weight>,
    {
        let mut remaining: HashSet<&N> = targets.iter().collect();

        if let Some(h) = heuristic(start) {
            self.cache.offer(start, 0);
            self.push(start.clone(), 0, h, None);
        }

        while let Some(candidate) = self.queue.pop() {
            if !self
                .cache
                .settle(&candidate.vertex, candidate.distance, candidate.via.as_ref())
            {
                continue;
            }

            observer.explore(
                &candidate.vertex,
                &Cost::from([candidate.distance]),
                self.queue.len(),
            );

            remaining.remove(&candidate.vertex);
            if !targets.is_empty() && remaining.is_empty() {
                break;
            }

            for (next, cost) in graph.outgoing(&candidate.vertex) {
                let weight = cost.get(objective).ok_or(SearchError::ArityMismatch {
                    expected: objective + 1,
                    found: cost.arity(),
                })?;
                let distance = candidate.distance.saturating_add(weight);

                if !self.cache.offer(next, distance) {
                    continue;
                }
                if let Some(h) = heuristic(next) {
                    self.push(
                        next.clone(),
                        distance,
                        distance.saturating_add(h),
                        Some(candidate.vertex.clone()),
                    );
                }
            }
        }

        Ok(self.cache)
    }
}
