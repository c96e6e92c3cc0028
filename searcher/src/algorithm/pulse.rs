//! PULSE, a depth-first branch and bound for two objectives.
//!
//! Before searching towards a goal, one Dijkstra run per objective on the
//! reversed graph gives a lower bound on the remaining cost from every
//! vertex, along with the best path for each objective. Evaluating each
//! of those paths on the other objective yields the nadir point, which
//! bounds every efficient solution.
//!
//! A partial path is abandoned when it closes a cycle, when its bound
//! leaves the nadir box, when its bound is dominated by a solution, or
//! when its cost is dominated by an earlier visit to the same vertex.

use std::collections::HashMap;

use log::{debug, warn};

use super::dijkstra::{forward_path, Dijkstra};
use super::{require_arity, validate_endpoints, SearchOptions};
use crate::cost::{Cost, CostSet, Weight};
use crate::errors::{Result, SearchError};
use crate::graph::{Graph, GraphPath, Graphable, Node};
use crate::metrics::{Metrics, Observer};
use crate::solution::{Destination, Solutions};
use crate::traits::Search;

const NAME: &str = "PULSE";

/// A pending visit: `vertex` reached at `cost` by the first `depth`
/// vertices of the current path.
#[derive(Debug)]
struct Frame<N> {
    vertex: N,
    cost: Cost,
    depth: usize,
}

/// Lower bounds towards one goal, and the nadir point of the start.
#[derive(Debug)]
struct Bounds<N> {
    remaining: HashMap<N, Cost>,
    nadir: Cost,
}

#[derive(Debug)]
pub struct Pulse<'g, G>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
    nadirs: HashMap<G::Node, Cost>,
}

impl<'g, G> Pulse<'g, G>
where
    G: Graphable + ?Sized,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            observer: Observer::new(NAME, SearchOptions::default().progress),
            solutions: Solutions::new(),
            nadirs: HashMap::new(),
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

    /// The nadir point used for `goal` in the last run.
    pub fn nadir(&self, goal: &G::Node) -> Option<&Cost> {
        self.nadirs.get(goal)
    }

    /// Returns `None` when `goal` cannot be reached from `start`.
    fn bounds(&self, start: &G::Node, goal: &G::Node) -> Result<Option<Bounds<G::Node>>> {
        let reversed = Graph::from_graphable(self.graph)?.reversed();
        let mut remaining: HashMap<G::Node, Vec<Weight>> = HashMap::new();
        let mut best_paths = Vec::with_capacity(2);

        for objective in 0..2 {
            let projected = reversed.project(objective)?;
            let mut dijkstra =
                Dijkstra::new(&projected).with_options(SearchOptions::default().with_progress(0));
            dijkstra.explore(goal, &[])?;

            for (vertex, distance) in dijkstra.distances() {
                remaining
                    .entry(vertex.clone())
                    .or_insert_with(|| vec![0; 2])[objective] = distance;
            }
            match forward_path(&dijkstra, start) {
                Some(nodes) => best_paths.push(walk(self.graph, &nodes)?),
                None => return Ok(None),
            }
        }

        // Each objective's best path, judged by the other objective.
        let nadir = Cost::from([
            best_paths[1].cost().pair()?.0,
            best_paths[0].cost().pair()?.1,
        ]);
        Ok(Some(Bounds {
            remaining: remaining
                .into_iter()
                .map(|(vertex, bound)| (vertex, Cost::from(bound)))
                .collect(),
            nadir,
        }))
    }

    fn search(&mut self, start: &G::Node, goal: &G::Node) -> Result<Vec<GraphPath<G::Node>>> {
        let bounds = match self.bounds(start, goal)? {
            Some(bounds) => bounds,
            None => return Ok(Vec::new()),
        };
        debug!("{}: nadir point towards {:?} is {}", NAME, goal, bounds.nadir);
        let (nadir_first, nadir_second) = bounds.nadir.pair()?;
        self.nadirs.insert(goal.clone(), bounds.nadir.clone());

        let graph = self.graph;
        let mut efficient: Vec<GraphPath<G::Node>> = Vec::new();
        let mut labels: HashMap<G::Node, CostSet> = HashMap::new();
        let mut path: Vec<G::Node> = Vec::new();
        let mut stack = vec![Frame {
            vertex: start.clone(),
            cost: Cost::zero(2),
            depth: 0,
        }];

        while let Some(Frame {
            vertex,
            cost,
            depth,
        }) = stack.pop()
        {
            path.truncate(depth);
            self.observer.explore(&vertex, &cost, stack.len());

            if &vertex == goal {
                if !covered(&efficient, &cost)? {
                    let mut kept = Vec::with_capacity(efficient.len() + 1);
                    for solution in efficient.drain(..) {
                        if !cost.dominates(solution.cost())? {
                            kept.push(solution);
                        }
                    }
                    path.push(vertex);
                    kept.push(walk(graph, &path)?);
                    efficient = kept;
                }
                continue;
            }

            if path.contains(&vertex) {
                continue;
            }

            let bound = match bounds.remaining.get(&vertex) {
                Some(bound) => cost.try_add(bound)?,
                None => continue,
            };
            let (first, second) = bound.pair()?;
            if first > nadir_first || second > nadir_second {
                continue;
            }
            if dominated(&efficient, &bound)? {
                continue;
            }

            let seen = labels.entry(vertex.clone()).or_default();
            if seen.dominates(&cost)? {
                continue;
            }
            seen.insert(cost.clone())?;

            path.push(vertex.clone());
            let depth = path.len();
            for (next, edge) in graph.outgoing(&vertex).into_iter().rev() {
                stack.push(Frame {
                    vertex: next.clone(),
                    cost: cost.try_add(edge)?,
                    depth,
                });
            }
        }

        efficient.sort_by(|a, b| a.cost().cmp(b.cost()));
        Ok(efficient)
    }
}

fn dominated<N>(efficient: &[GraphPath<N>], cost: &Cost) -> Result<bool> {
    for solution in efficient {
        if solution.cost().dominates(cost)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn covered<N>(efficient: &[GraphPath<N>], cost: &Cost) -> Result<bool> {
    for solution in efficient {
        if solution.cost().dominates_or_equals(cost)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The path through `nodes`, with the edge costs of `graph`.
fn walk<G, N>(graph: &G, nodes: &[N]) -> Result<GraphPath<N>>
where
    G: Graphable<Node = N> + ?Sized,
    N: Node,
{
    let (origin, rest) = nodes
        .split_first()
        .ok_or_else(|| SearchError::Backtrack("empty path".to_string()))?;

    let mut path = GraphPath::new(origin.clone());
    let mut previous = origin;
    for node in rest {
        let edge = graph
            .weight(previous, node)
            .ok_or_else(|| SearchError::Backtrack(format!("{:?} -> {:?}", previous, node)))?;
        path.push(node.clone(), edge.clone())?;
        previous = node;
    }
    Ok(path)
}

impl<'g, G> Search<G::Node> for Pulse<'g, G>
where
    G: Graphable + ?Sized,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        require_arity(self.graph, NAME, 2)?;

        self.solutions.clear();
        self.nadirs.clear();
        self.observer.start();

        let goals = match validate_endpoints(self.graph, NAME, start, goals) {
            Some(goals) if !goals.is_empty() => goals,
            _ => {
                warn!("{}: no goal to search for", NAME);
                self.observer.finish();
                return Ok(());
            }
        };

        for goal in goals {
            let paths = self.search(start, &goal)?;
            if paths.is_empty() {
                warn!("{}: no path from {:?} to {:?}", NAME, start, goal);
            }
            self.solutions.set(Destination::Vertex(goal), paths);
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

    fn fixture(source: &str) -> Graph<String> {
        source.parse().unwrap()
    }

    fn v(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn namoa_graph() {
        let graph = fixture(include_str!("../../fixtures/namoa.txt"));
        let mut pulse = Pulse::new(&graph);
        pulse.run(&v("s"), &[v("y")]).unwrap();

        assert_eq!(pulse.nadir(&v("y")), Some(&Cost::from([9, 10])));
        let result = pulse.result(&v("y"));
        assert_eq!(result.costs(), vec![Cost::from([4, 10]), Cost::from([9, 3])]);
        let routes: Vec<String> = result
            .solutions()
            .iter()
            .map(|s| s.path.to_string())
            .collect();
        assert_eq!(routes, vec!["s -> n2 -> n4 -> y", "s -> n2 -> n5 -> y"]);
    }

    #[test]
    fn goals_are_independent() {
        let graph = fixture(include_str!("../../fixtures/moa.txt"));
        let mut pulse = Pulse::new(&graph);
        pulse.run(&v("s"), &[v("y1"), v("y2"), v("y3")]).unwrap();

        assert_eq!(pulse.solutions().cost(&v("s"), &v("y1")), vec![Cost::from([4, 11])]);
        assert_eq!(pulse.solutions().cost(&v("s"), &v("y2")), vec![Cost::from([7, 7])]);
        assert_eq!(
            pulse.result(&v("y3")).costs(),
            vec![Cost::from([5, 11]), Cost::from([6, 7]), Cost::from([9, 5])]
        );
    }

    #[test]
    fn cycles() {
        let mut graph = Graph::new(2);
        graph.add_edge('s', 'a', [1, 1]).unwrap();
        graph.add_edge('a', 's', [0, 0]).unwrap();
        graph.add_edge('a', 'b', [0, 0]).unwrap();
        graph.add_edge('b', 'a', [0, 0]).unwrap();
        graph.add_edge('b', 't', [1, 3]).unwrap();
        graph.add_edge('a', 't', [3, 1]).unwrap();

        let mut pulse = Pulse::new(&graph);
        pulse.run(&'s', &['t']).unwrap();
        assert_eq!(
            pulse.result(&'t').costs(),
            vec![Cost::from([2, 4]), Cost::from([4, 2])]
        );
    }

    #[test]
    fn arity() {
        let graph = fixture(include_str!("../../fixtures/dijkstra.txt"));
        let mut pulse = Pulse::new(&graph);
        assert!(matches!(
            pulse.run(&v("a"), &[v("f")]),
            Err(SearchError::UnsupportedArity { found: 1, .. })
        ));
    }

    #[test]
    fn soft_failures() {
        let graph = fixture(include_str!("../../fixtures/namoa.txt"));
        let mut pulse = Pulse::new(&graph);

        pulse.run(&v("y"), &[v("s")]).unwrap();
        assert!(!pulse.result(&v("s")).is_found());
        assert!(pulse.nadir(&v("s")).is_none());

        pulse.run(&v("s"), &[]).unwrap();
        assert!(pulse.solutions().is_empty());
    }
}
