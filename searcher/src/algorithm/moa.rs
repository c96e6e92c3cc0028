//! MOA*, the vertex-selecting multi-objective A*.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use super::labels::{LabelArena, LabelId, SolutionCosts};
use super::{validate_endpoints, GoalPruning, SearchOptions};
use crate::cost::Cost;
use crate::errors::Result;
use crate::graph::Graphable;
use crate::heuristic::{RandomSelector, ZeroCost};
use crate::metrics::{Metrics, Observer};
use crate::solution::Solutions;
use crate::traits::{CostHeuristic, Search, VertexSelector};

const NAME: &str = "MOA*";

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: LabelId,
    expanded: bool,
}

/// Multi-objective A* which selects whole vertices rather than labels.
///
/// Every iteration builds ND, the open vertices owning an `f` value that
/// is dominated neither by another open `f` value nor by a solution. A
/// goal in ND is always preferred; otherwise the [VertexSelector] picks
/// one. All labels of the chosen vertex not yet expanded are then
/// expanded together. A closed vertex is reopened whenever it gets a new
/// non-dominated label, so the search is label-correcting.
#[derive(Debug)]
pub struct Moa<'g, G, H = ZeroCost, S = RandomSelector>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    heuristic: H,
    selector: S,
    pruning: GoalPruning,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
    arena: LabelArena<G::Node>,
    estimates: HashMap<G::Node, Cost>,
}

impl<'g, G> Moa<'g, G>
where
    G: Graphable + ?Sized,
{
    /// MOA* without a heuristic, choosing among ND at random.
    pub fn new(graph: &'g G) -> Self {
        Moa::with_strategy(graph, ZeroCost, RandomSelector::default())
    }
}

impl<'g, G, H, S> Moa<'g, G, H, S>
where
    G: Graphable + ?Sized,
    H: CostHeuristic<G::Node>,
    S: VertexSelector<G::Node>,
{
    pub fn with_strategy(graph: &'g G, heuristic: H, selector: S) -> Self {
        let options = SearchOptions::default();
        Self {
            graph,
            heuristic,
            selector,
            pruning: options.pruning,
            observer: Observer::new(NAME, options.progress),
            solutions: Solutions::new(),
            arena: LabelArena::new(),
            estimates: HashMap::new(),
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

    fn estimate(&mut self, vertex: &G::Node, goals: &[G::Node]) -> Cost {
        let heuristic = &mut self.heuristic;
        self.estimates
            .entry(vertex.clone())
            .or_insert_with(|| heuristic.estimate(vertex, goals))
            .clone()
    }

    /// The `f` values of the labels of `vertex` still to be expanded,
    /// leaving out those the solutions already rule out.
    fn pending_estimates(
        &mut self,
        vertex: &G::Node,
        entries: &[Entry],
        goals: &[G::Node],
        found: &SolutionCosts<G::Node>,
    ) -> Result<Vec<Cost>> {
        let h = self.estimate(vertex, goals);
        let mut estimates = Vec::new();
        for entry in entries.iter().filter(|e| !e.expanded) {
            let f = self.arena[entry.id].cost.try_add(&h)?;
            if !f.is_infinite() && !found.prunes(&f)? {
                estimates.push(f);
            }
        }
        Ok(estimates)
    }

    /// Open vertices with at least one non-dominated `f` value.
    fn non_dominated(
        &mut self,
        open: &BTreeSet<G::Node>,
        labels: &HashMap<G::Node, Vec<Entry>>,
        goals: &[G::Node],
        found: &SolutionCosts<G::Node>,
    ) -> Result<Vec<G::Node>> {
        let mut fronts = Vec::with_capacity(open.len());
        for vertex in open {
            let entries = labels.get(vertex).map(Vec::as_slice).unwrap_or_default();
            let estimates = self.pending_estimates(vertex, entries, goals, found)?;
            if !estimates.is_empty() {
                fronts.push((vertex, estimates));
            }
        }

        let all: Vec<&Cost> = fronts.iter().flat_map(|(_, f)| f.iter()).collect();
        let mut nd = Vec::new();
        'vertices: for (vertex, estimates) in fronts.iter() {
            for f in estimates {
                let mut dominated = false;
                for other in all.iter() {
                    if other.dominates(f)? {
                        dominated = true;
                        break;
                    }
                }
                if !dominated {
                    nd.push((*vertex).clone());
                    continue 'vertices;
                }
            }
        }
        Ok(nd)
    }

    fn search(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<SolutionCosts<G::Node>> {
        let graph = self.graph;
        let expand_goals = goals.len() > 1;
        let mut found = SolutionCosts::new(self.pruning, goals);
        let mut labels: HashMap<G::Node, Vec<Entry>> = HashMap::new();
        let mut open = BTreeSet::new();

        let id = self.arena.push(start.clone(), Cost::zero(graph.arity()), None);
        labels.insert(start.clone(), vec![Entry { id, expanded: false }]);
        open.insert(start.clone());

        loop {
            let nd = self.non_dominated(&open, &labels, goals, &found)?;
            let goals_nd: Vec<&G::Node> = nd.iter().filter(|v| found.is_goal(v)).collect();
            let candidates: Vec<&G::Node> = if goals_nd.is_empty() {
                nd.iter().collect()
            } else {
                goals_nd
            };

            let vertex = match self.selector.select(&candidates) {
                Some(index) => match candidates.get(index) {
                    Some(&vertex) => vertex.clone(),
                    None => break,
                },
                None => break,
            };
            open.remove(&vertex);

            let h = self.estimate(&vertex, goals);
            let mut pending = Vec::new();
            for entry in labels.entry(vertex.clone()).or_default().iter_mut() {
                if !entry.expanded {
                    entry.expanded = true;
                    pending.push(entry.id);
                }
            }

            for id in pending {
                let g = self.arena[id].cost.clone();
                if found.prunes(&g.try_add(&h)?)? {
                    continue;
                }
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

                    let mut covered = false;
                    for entry in labels.get(next).into_iter().flatten() {
                        if self.arena[entry.id].cost.dominates_or_equals(&g_next)? {
                            covered = true;
                            break;
                        }
                    }
                    if covered {
                        continue;
                    }

                    let f_next = g_next.try_add(&self.estimate(next, goals))?;
                    if f_next.is_infinite() || found.prunes(&f_next)? {
                        continue;
                    }

                    let known = labels.entry(next.clone()).or_default();
                    let mut kept = Vec::with_capacity(known.len());
                    for entry in known.drain(..) {
                        if !g_next.dominates(&self.arena[entry.id].cost)? {
                            kept.push(entry);
                        }
                    }
                    let next_id = self.arena.push(next.clone(), g_next, Some(id));
                    kept.push(Entry {
                        id: next_id,
                        expanded: false,
                    });
                    *known = kept;
                    open.insert(next.clone());
                }
            }
        }

        Ok(found)
    }
}

impl<'g, G, H, S> Search<G::Node> for Moa<'g, G, H, S>
where
    G: Graphable + ?Sized,
    H: CostHeuristic<G::Node>,
    S: VertexSelector<G::Node>,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        self.solutions.clear();
        self.arena.clear();
        self.estimates.clear();
        self.observer.start();

        let goals = match validate_endpoints(self.graph, NAME, start, goals) {
            Some(goals) if !goals.is_empty() => goals,
            _ => {
                warn!("{}: no goal to search for", NAME);
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
