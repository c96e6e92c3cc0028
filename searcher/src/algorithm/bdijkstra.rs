//! Bi-objective label-setting Dijkstra.
//!
//! The heap holds at most one tentative label per vertex: the
//! lexicographically smallest one known that is not dominated by the
//! labels already made permanent there. Labels become permanent in
//! lexicographic order, so the permanent labels of a vertex have strictly
//! decreasing second components, and a new label is dominated by (or
//! equal to) one of them exactly when its second component is not below
//! that of the last one. Whenever a label is popped, the next candidate
//! for the same vertex is rebuilt from the permanent labels of its
//! predecessors.

use std::collections::HashMap;

use log::debug;

use super::heap::LabelHeap;
use super::labels::{backtrack, Label, LabelArena, LabelId};
use super::{require_arity, validate_endpoints, SearchOptions};
use crate::cost::Cost;
use crate::errors::Result;
use crate::graph::{GraphPath, Graphable};
use crate::metrics::{Metrics, Observer};
use crate::solution::{Destination, Solutions};
use crate::traits::Search;

const NAME: &str = "BDijkstra";

#[derive(Debug)]
pub struct BDijkstra<'g, G>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
    arena: LabelArena<G::Node>,
    permanent: HashMap<G::Node, Vec<LabelId>>,
}

impl<'g, G> BDijkstra<'g, G>
where
    G: Graphable + ?Sized,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            observer: Observer::new(NAME, SearchOptions::default().progress),
            solutions: Solutions::new(),
            arena: LabelArena::new(),
            permanent: HashMap::new(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.observer.set_progress(options.progress);
        self
    }

    pub fn set_inspector<F>(&mut self, inspector: F)
    where
        F: FnMut(&G::Node, &Cost) + 'g,
    {
        self.observer.set_inspector(inspector);
    }

    /// Costs of the permanent labels at `vertex` after the last run,
    /// in lexicographic order.
    pub fn pareto_costs(&self, vertex: &G::Node) -> Vec<Cost> {
        self.permanent
            .get(vertex)
            .into_iter()
            .flatten()
            .map(|&id| self.arena[id].cost.clone())
            .collect()
    }

    fn last_cost(&self, vertex: &G::Node) -> Option<&Cost> {
        self.permanent
            .get(vertex)
            .and_then(|labels| labels.last())
            .map(|&id| &self.arena[id].cost)
    }

    /// Is `cost` dominated by, or equal to, a permanent label at `vertex`?
    fn is_settled(&self, vertex: &G::Node, cost: &Cost) -> Result<bool> {
        match self.last_cost(vertex) {
            Some(last) => Ok(cost.pair()?.1 >= last.pair()?.1),
            None => Ok(false),
        }
    }

    /// Smallest extension of a predecessor's permanent label which
    /// is not yet settled at `vertex`.
    fn next_candidate(&self, vertex: &G::Node) -> Result<Option<Label<G::Node>>> {
        let mut best: Option<Label<G::Node>> = None;

        for previous in self.graph.predecessors(vertex) {
            let edge = match self.graph.weight(previous, vertex) {
                Some(edge) => edge,
                None => continue,
            };
            for &id in self.permanent.get(previous).into_iter().flatten() {
                let cost = self.arena[id].cost.try_add(edge)?;
                if self.is_settled(vertex, &cost)? {
                    continue;
                }
                if best.as_ref().map_or(true, |b| cost < b.cost) {
                    best = Some(Label {
                        vertex: vertex.clone(),
                        cost,
                        predecessor: Some(id),
                    });
                }
            }
        }
        Ok(best)
    }

    fn relax(&self, heap: &mut LabelHeap<G::Node>, label: Label<G::Node>) -> Result<()> {
        if self.is_settled(&label.vertex, &label.cost)? {
            return Ok(());
        }

        let queued = heap.get(&label.vertex).map(|l| l.cost.clone());
        match queued {
            None => heap.push(label),
            Some(queued) if label.cost < queued => {
                if label.cost.dominates(&queued)? {
                    heap.decrease_key(label)
                } else {
                    heap.remove(&label.vertex);
                    heap.push(label)
                }
            }
            // Found again by `next_candidate` once the queued label is popped.
            Some(_) => Ok(()),
        }
    }

    fn search(&mut self, start: &G::Node) -> Result<()> {
        let graph = self.graph;
        let mut heap = LabelHeap::new();
        heap.push(Label {
            vertex: start.clone(),
            cost: Cost::zero(graph.arity()),
            predecessor: None,
        })?;

        while let Some(label) = heap.pop() {
            self.observer.explore(&label.vertex, &label.cost, heap.len());

            let vertex = label.vertex.clone();
            let cost = label.cost.clone();
            let id = self.arena.push(label.vertex, label.cost, label.predecessor);
            self.permanent.entry(vertex.clone()).or_default().push(id);

            if let Some(candidate) = self.next_candidate(&vertex)? {
                heap.push(candidate)?;
            }

            for (next, edge) in graph.outgoing(&vertex) {
                let extended = Label {
                    vertex: next.clone(),
                    cost: cost.try_add(edge)?,
                    predecessor: Some(id),
                };
                self.relax(&mut heap, extended)?;
            }
        }
        Ok(())
    }

    fn paths_to(&self, vertex: &G::Node) -> Result<Vec<GraphPath<G::Node>>> {
        let mut paths = Vec::new();
        for &id in self.permanent.get(vertex).into_iter().flatten() {
            paths.push(backtrack(self.graph, &self.arena, id)?);
        }
        Ok(paths)
    }
}

impl<'g, G> Search<G::Node> for BDijkstra<'g, G>
where
    G: Graphable + ?Sized,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        require_arity(self.graph, NAME, 2)?;

        self.solutions.clear();
        self.arena.clear();
        self.permanent.clear();
        self.observer.start();

        let goals = match validate_endpoints(self.graph, NAME, start, goals) {
            Some(goals) => goals,
            None => {
                self.observer.finish();
                return Ok(());
            }
        };

        self.search(start)?;
        debug!(
            "{}: {} permanent labels over {} vertices",
            NAME,
            self.arena.len(),
            self.permanent.len()
        );

        if goals.is_empty() {
            let mut reached: Vec<&G::Node> =
                self.permanent.keys().filter(|v| *v != start).collect();
            reached.sort();

            let mut paths = Vec::new();
            for vertex in reached {
                paths.extend(self.paths_to(vertex)?);
            }
            self.solutions.set(Destination::Any, paths);
        } else {
            for goal in goals {
                let paths = self.paths_to(&goal)?;
                if paths.is_empty() {
                    log::warn!("{}: no path from {:?} to {:?}", NAME, start, goal);
                }
                self.solutions.set(Destination::Vertex(goal), paths);
            }
        }

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

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::SearchError;
    use crate::graph::Graph;

    fn fixture(source: &str) -> Graph<String> {
        source.parse().unwrap()
    }

    fn v(name: &str) -> String {
        name.to_string()
    }

    fn is_antichain(costs: &[Cost]) -> bool {
        costs
            .iter()
            .all(|a| costs.iter().all(|b| !a.dominates(b).unwrap()))
    }

    #[test]
    fn namoa_graph() {
        let graph = fixture(include_str!("../../fixtures/namoa.txt"));
        let mut search = BDijkstra::new(&graph);
        search.run(&v("s"), &[v("y")]).unwrap();

        let result = search.result(&v("y"));
        assert_eq!(result.costs(), vec![Cost::from([4, 10]), Cost::from([9, 3])]);
        let routes: Vec<String> = result
            .solutions()
            .iter()
            .map(|s| s.path.to_string())
            .collect();
        assert_eq!(routes, vec!["s -> n2 -> n4 -> y", "s -> n2 -> n5 -> y"]);

        assert_eq!(search.pareto_costs(&v("n4")), vec![Cost::from([3, 5])]);
        assert_eq!(search.pareto_costs(&v("n6")), vec![Cost::from([7, 8])]);
        for vertex in graph.vertices() {
            assert!(is_antichain(&search.pareto_costs(vertex)));
        }
    }

    #[test]
    fn moa_graph() {
        let graph = fixture(include_str!("../../fixtures/moa.txt"));
        let mut search = BDijkstra::new(&graph);
        search.run(&v("s"), &[v("y1"), v("y2"), v("y3")]).unwrap();

        assert_eq!(search.solutions().cost(&v("s"), &v("y1")), vec![Cost::from([4, 11])]);
        assert_eq!(search.solutions().cost(&v("s"), &v("y2")), vec![Cost::from([7, 7])]);
        assert_eq!(
            search.result(&v("y3")).costs(),
            vec![Cost::from([5, 11]), Cost::from([6, 7]), Cost::from([9, 5])]
        );
    }

    #[test]
    fn everything() {
        let graph = fixture(include_str!("../../fixtures/namoa.txt"));
        let mut search = BDijkstra::new(&graph);
        search.run(&v("s"), &[]).unwrap();

        assert_eq!(
            search.solutions().cost(&v("s"), &v("y")),
            vec![Cost::from([4, 10]), Cost::from([9, 3])]
        );
        assert_eq!(search.solutions().cost(&v("s"), &v("n5")), vec![Cost::from([8, 2])]);
    }

    #[test]
    fn arity() {
        let graph = fixture(include_str!("../../fixtures/astar.txt"));
        let mut search = BDijkstra::new(&graph);
        assert!(matches!(
            search.run(&v("a"), &[v("f")]),
            Err(SearchError::UnsupportedArity { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn soft_failures() {
        let graph = fixture(include_str!("../../fixtures/namoa.txt"));
        let mut search = BDijkstra::new(&graph);

        search.run(&v("y"), &[v("s")]).unwrap();
        assert!(!search.result(&v("s")).is_found());

        search.run(&v("s"), &[v("s")]).unwrap();
        assert!(search.solutions().is_empty());
        assert_eq!(search.metrics().explored(), 0);
    }
}
