//! NAMOA*, the label-setting multi-objective A*.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use log::debug;

use super::labels::{LabelArena, LabelId, SolutionCosts};
use super::{validate_endpoints, GoalPruning, SearchOptions};
use crate::cost::Cost;
use crate::errors::Result;
use crate::graph::Graphable;
use crate::heuristic::ZeroCost;
use crate::metrics::{Metrics, Observer};
use crate::solution::Solutions;
use crate::traits::{CostHeuristic, Search};

const NAME: &str = "NAMOA*";

/// Open labels ordered by lexicographic `f`, then by age.
type Open = BinaryHeap<Reverse<(Cost, usize, LabelId)>>;

/// Labels of one vertex, split into those still open and those
/// already expanded.
#[derive(Debug, Default)]
struct VertexLabels {
    open: Vec<LabelId>,
    closed: Vec<LabelId>,
}

/// Multi-objective A* keeping a set of non-dominated labels per vertex.
///
/// A label whose cost is dominated by (or equal to) another label of the
/// same vertex is never created, and a new label discards the open and
/// closed labels it dominates. Labels are expanded in lexicographic
/// order of `f = g + h`, and those whose `f` is dominated by the
/// solutions found so far are filtered out.
///
/// With a single goal, labels reaching it are not expanded further.
#[derive(Debug)]
pub struct Namoa<'g, G, H = ZeroCost>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    heuristic: H,
    pruning: GoalPruning,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
    arena: LabelArena<G::Node>,
}

impl<'g, G> Namoa<'g, G>
where
    G: Graphable + ?Sized,
{
    /// NAMOA* without a heuristic.
    pub fn new(graph: &'g G) -> Self {
        Namoa::with_heuristic(graph, ZeroCost)
    }
}

impl<'g, G, H> Namoa<'g, G, H>
where
    G: Graphable + ?Sized,
    H: CostHeuristic<G::Node>,
{
    pub fn with_heuristic(graph: &'g G, heuristic: H) -> Self {
        let options = SearchOptions::default();
        Self {
            graph,
            heuristic,
            pruning: options.pruning,
            observer: Observer::new(NAME, options.progress),
            solutions: Solutions::new(),
            arena: LabelArena::new(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.pruning = options.pruning;
        self.observer.set_progress(options.progress);
        self
    }

    pub fn set_inspector<F>(&mut self, inspector: F)
    where
        F: FnMut(&G::Node, &Cost) + 'g,
    {
        self.observer.set_inspector(inspector);
    }

    /// Number of labels created by the last run.
    pub fn label_count(&self) -> usize {
        self.arena.len()
    }

    fn search(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<SolutionCosts<G::Node>> {
        let graph = self.graph;
        let expand_goals = goals.len() > 1;
        let mut found = SolutionCosts::new(self.pruning, goals);
        let mut labels: HashMap<G::Node, VertexLabels> = HashMap::new();
        let mut open = Open::new();
        let mut sequence = 0;

        let g = Cost::zero(graph.arity());
        let f = g.try_add(&self.heuristic.estimate(start, goals))?;
        if f.is_infinite() {
            return Ok(found);
        }
        let id = self.arena.push(start.clone(), g, None);
        labels.entry(start.clone()).or_default().open.push(id);
        open.push(Reverse((f, sequence, id)));

        while let Some(Reverse((f, _, id))) = open.pop() {
            let vertex = self.arena[id].vertex.clone();
            let g = self.arena[id].cost.clone();

            // Dropped when a dominating label was created.
            let entry = labels.entry(vertex.clone()).or_default();
            let position = match entry.open.iter().position(|&l| l == id) {
                Some(position) => position,
                None => continue,
            };
            entry.open.swap_remove(position);

            if found.prunes(&f)? {
                continue;
            }
            entry.closed.push(id);
            self.observer.explore(&vertex, &g, open.len());

            if found.is_goal(&vertex) {
                if found.admits(&vertex, &g)? {
                    found.record(&vertex, id, g.clone())?;
                }
                if !expand_goals {
                    continue;
                }
            }

            for (next, edge) in graph.outgoing(&vertex) {
                let g_next = g.try_add(edge)?;

                let known = labels.entry(next.clone()).or_default();
                let mut covered = false;
                for &other in known.open.iter().chain(known.closed.iter()) {
                    if self.arena[other].cost.dominates_or_equals(&g_next)? {
                        covered = true;
                        break;
                    }
                }
                if covered {
                    continue;
                }

                let f_next = g_next.try_add(&self.heuristic.estimate(next, goals))?;
                if f_next.is_infinite() || found.prunes(&f_next)? {
                    continue;
                }

                let arena = &self.arena;
                let mut dominated = |other: &LabelId| -> Result<bool> {
                    g_next.dominates(&arena[*other].cost)
                };
                known.open = retain(&known.open, &mut dominated)?;
                known.closed = retain(&known.closed, &mut dominated)?;

                let next_id = self.arena.push(next.clone(), g_next, Some(id));
                known.open.push(next_id);
                sequence += 1;
                open.push(Reverse((f_next, sequence, next_id)));
            }
        }

        Ok(found)
    }
}

/// Keep the labels `dominated` rejects.
fn retain<F>(labels: &[LabelId], dominated: &mut F) -> Result<Vec<LabelId>>
where
    F: FnMut(&LabelId) -> Result<bool>,
{
    let mut kept = Vec::with_capacity(labels.len());
    for label in labels {
        if !dominated(label)? {
            kept.push(*label);
        }
    }
    Ok(kept)
}

impl<'g, G, H> Search<G::Node> for Namoa<'g, G, H>
where
    G: Graphable + ?Sized,
    H: CostHeuristic<G::Node>,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        self.solutions.clear();
        self.arena.clear();
        self.observer.start();

        let goals = match validate_endpoints(self.graph, NAME, start, goals) {
            Some(goals) if !goals.is_empty() => goals,
            _ => {
                log::warn!("{}: no goal to search for", NAME);
                self.observer.finish();
                return Ok(());
            }
        };

        let found = self.search(start, &goals)?;
        debug!("{}: {} labels created", NAME, self.arena.len());
        found.store(NAME, self.graph, &self.arena, start, &mut self.solutions)?;

        self.observer.finish();
        Ok(())
    }

    fn solutions(&self) -> &Solutions<G::Node> {
        &self.solutions
    }

    fn metrics(&self) -> &Metrics {
        self.observer.metrics()
    }
}
