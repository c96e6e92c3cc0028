//! Stock heuristics and vertex selectors.

use std::collections::{HashMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::dijkstra::lower_bounds;
use crate::cost::{Cost, Weight};
use crate::errors::Result;
use crate::graph::{Graphable, Node};
use crate::traits::{CostHeuristic, Heuristic, VertexSelector};

/// Number of edges on the shortest unweighted path to the goal.
///
/// Computed with one backwards breadth-first search per goal, the
/// first time that goal is asked about.
#[derive(Debug)]
pub struct HopCount<'g, G>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    hops: HashMap<G::Node, HashMap<G::Node, Weight>>,
}

impl<'g, G> HopCount<'g, G>
where
    G: Graphable + ?Sized,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            hops: HashMap::new(),
        }
    }
}

fn hops_to<G>(graph: &G, goal: &G::Node) -> HashMap<G::Node, Weight>
where
    G: Graphable + ?Sized,
{
    let mut hops = HashMap::new();
    let mut queue = VecDeque::new();
    hops.insert(goal.clone(), 0);
    queue.push_back((goal, 0));

    while let Some((vertex, n)) = queue.pop_front() {
        for previous in graph.predecessors(vertex) {
            if !hops.contains_key(previous) {
                hops.insert(previous.clone(), n + 1);
                queue.push_back((previous, n + 1));
            }
        }
    }
    hops
}

impl<'g, G> Heuristic<G::Node> for HopCount<'g, G>
where
    G: Graphable + ?Sized,
{
    fn estimate(&mut self, vertex: &G::Node, goal: &G::Node) -> Option<Weight> {
        let graph = self.graph;
        self.hops
            .entry(goal.clone())
            .or_insert_with(|| hops_to(graph, goal))
            .get(vertex)
            .copied()
    }
}

/// Always estimates zero, turning A* into Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl<N> Heuristic<N> for ZeroHeuristic {
    fn estimate(&mut self, _vertex: &N, _goal: &N) -> Option<Weight> {
        Some(0)
    }
}

/// No estimate at all: the empty cost leaves `g` unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCost;

impl<N> CostHeuristic<N> for ZeroCost {
    fn estimate(&mut self, _vertex: &N, _goals: &[N]) -> Cost {
        Cost::empty()
    }
}

/// Component-wise minimum over the costs of a vertex's outgoing edges.
///
/// Zero at goals, infinite at dead ends.
#[derive(Debug)]
pub struct MinOutgoing<'g, G>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    cache: HashMap<G::Node, Cost>,
}

impl<'g, G> MinOutgoing<'g, G>
where
    G: Graphable + ?Sized,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
        }
    }
}

impl<'g, G> CostHeuristic<G::Node> for MinOutgoing<'g, G>
where
    G: Graphable + ?Sized,
{
    fn estimate(&mut self, vertex: &G::Node, goals: &[G::Node]) -> Cost {
        if goals.contains(vertex) {
            return Cost::zero(self.graph.arity());
        }

        let graph = self.graph;
        self.cache
            .entry(vertex.clone())
            .or_insert_with(|| {
                let mut minimum: Option<Vec<Weight>> = None;
                for (_, cost) in graph.outgoing(vertex) {
                    let components = cost.components();
                    match minimum.as_mut() {
                        None => minimum = Some(components.to_vec()),
                        Some(m) => m
                            .iter_mut()
                            .zip(components)
                            .for_each(|(m, c)| *m = (*m).min(*c)),
                    }
                }
                minimum.map(Cost::from).unwrap_or(Cost::Infinite)
            })
            .clone()
    }
}

/// Exact per-objective distances to the nearest goal, each computed
/// independently on the reversed graph.
///
/// The bounds are computed for the goals given to [IdealPoint::new];
/// the goals passed to `estimate` are ignored. Vertices which cannot
/// reach any goal are estimated as infinite.
#[derive(Debug, Clone)]
pub struct IdealPoint<N> {
    bounds: HashMap<N, Cost>,
}

impl<N> IdealPoint<N>
where
    N: Node,
{
    pub fn new<G>(graph: &G, goals: &[N]) -> Result<Self>
    where
        G: Graphable<Node = N> + ?Sized,
    {
        Ok(Self {
            bounds: lower_bounds(graph, goals)?,
        })
    }
}

impl<N> CostHeuristic<N> for IdealPoint<N>
where
    N: Node,
{
    fn estimate(&mut self, vertex: &N, _goals: &[N]) -> Cost {
        self.bounds.get(vertex).cloned().unwrap_or(Cost::Infinite)
    }
}

/// Picks uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<N> VertexSelector<N> for RandomSelector {
    fn select(&mut self, candidates: &[&N]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..candidates.len()))
    }
}

/// Always picks the first candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl<N> VertexSelector<N> for FirstSelector {
    fn select(&mut self, candidates: &[&N]) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}
