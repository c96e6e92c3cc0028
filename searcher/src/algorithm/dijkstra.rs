//! Dijkstra's Algorithm

use std::collections::{BinaryHeap, HashMap};
use std::default::Default;

use log::{debug, warn};

use super::cache::{BestDistance, Cache};
use super::score::Scored;
use super::{validate_endpoints, SearchAlgorithm, SearchOptions, SearchQueue};
use crate::cost::{Cost, Weight};
use crate::errors::{Result, SearchError};
use crate::graph::{Graph, Graphable, Node};
use crate::metrics::{Metrics, Observer};
use crate::solution::{Destination, Solutions};
use crate::traits::Search;

/// A priority queue to always search the next shortest path
/// by measured distance.
#[derive(Debug)]
pub(crate) struct DijkstraQueue<N> {
    queue: BinaryHeap<Scored<N>>,
}

impl<N> Default for DijkstraQueue<N> {
    fn default() -> Self {
        DijkstraQueue {
            queue: BinaryHeap::new(),
        }
    }
}

impl<N> SearchQueue for DijkstraQueue<N> {
    type Candidate = Scored<N>;

    fn pop(&mut self) -> Option<Self::Candidate> {
        self.queue.pop()
    }

    fn push(&mut self, item: Self::Candidate) {
        self.queue.push(item);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Single-objective Dijkstra over one component of the edge costs.
///
/// Dijkstra's algorithm behaves like a breadth first search, but always
/// searches the next shortest path even when paths end up with varying
/// lengths. Without goals the whole reachable graph is explored and one
/// shortest path per vertex is stored under [Destination::Any].
#[derive(Debug)]
pub struct Dijkstra<'g, G>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    objective: usize,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
    cache: BestDistance<G::Node>,
}

impl<'g, G> Dijkstra<'g, G>
where
    G: Graphable + ?Sized,
{
    pub fn new(graph: &'g G) -> Self {
        let options = SearchOptions::default();
        Self {
            graph,
            objective: 0,
            observer: Observer::new("Dijkstra", options.progress),
            solutions: Solutions::new(),
            cache: BestDistance::default(),
        }
    }

    /// Minimize cost component `objective` instead of the first one.
    pub fn objective(mut self, objective: usize) -> Self {
        self.objective = objective;
        self
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

    /// Settle vertices from `start` without storing any solutions.
    ///
    /// Stops once every goal is settled, or explores everything
    /// reachable when there are none.
    pub fn explore(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        if self.objective >= self.graph.arity() {
            return Err(SearchError::ArityMismatch {
                expected: self.graph.arity(),
                found: self.objective + 1,
            });
        }

        let graph = self.graph;
        self.cache = SearchAlgorithm::<DijkstraQueue<G::Node>, BestDistance<G::Node>>::new().run(
            graph,
            start,
            goals,
            self.objective,
            &mut self.observer,
            |_| Some(0),
        )?;
        Ok(())
    }

    /// Shortest distance to `vertex` found by the last run.
    pub fn distance(&self, vertex: &G::Node) -> Option<Weight> {
        self.cache.settled().get(vertex).map(|s| s.distance)
    }

    pub fn distances(&self) -> impl Iterator<Item = (&G::Node, Weight)> {
        self.cache
            .settled()
            .iter()
            .map(|(vertex, s)| (vertex, s.distance))
    }

    /// Vertex preceding `vertex` on its shortest path.
    pub fn predecessor(&self, vertex: &G::Node) -> Option<&G::Node> {
        self.cache
            .settled()
            .get(vertex)
            .and_then(|s| s.via.as_ref())
    }

    pub fn predecessors(&self) -> impl Iterator<Item = (&G::Node, &G::Node)> {
        self.cache
            .settled()
            .iter()
            .filter_map(|(vertex, s)| s.via.as_ref().map(|via| (vertex, via)))
    }
}

impl<'g, G> Search<G::Node> for Dijkstra<'g, G>
where
    G: Graphable + ?Sized,
{
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn run(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        self.solutions.clear();
        self.cache = BestDistance::default();
        self.observer.start();

        let goals = match validate_endpoints(self.graph, self.name(), start, goals) {
            Some(goals) => goals,
            None => {
                self.observer.finish();
                return Ok(());
            }
        };

        self.explore(start, &goals)?;

        if goals.is_empty() {
            let mut reached: Vec<&G::Node> = self
                .cache
                .settled()
                .keys()
                .filter(|v| *v != start)
                .collect();
            reached.sort();

            let mut paths = Vec::with_capacity(reached.len());
            for vertex in reached {
                if let Some(path) = self.cache.path(self.graph, vertex)? {
                    paths.push(path);
                }
            }
            debug!("Dijkstra: {} vertices reached from {:?}", paths.len(), start);
            self.solutions.set(Destination::Any, paths);
        } else {
            for goal in goals {
                match self.cache.path(self.graph, &goal)? {
                    Some(path) => self.solutions.add(Destination::Vertex(goal), path),
                    None => warn!("Dijkstra: no path from {:?} to {:?}", start, goal),
                }
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

/// Per-objective lower bounds on the cost from every vertex to the
/// nearest of `goals`.
///
/// Each objective is minimized independently with Dijkstra on the
/// reversed graph. Vertices which cannot reach a goal are left out.
pub fn lower_bounds<G>(graph: &G, goals: &[G::Node]) -> Result<HashMap<G::Node, Cost>>
where
    G: Graphable + ?Sized,
{
    let arity = graph.arity();
    let reversed = Graph::from_graphable(graph)?.reversed();
    let mut bounds: HashMap<G::Node, Vec<Weight>> = HashMap::new();

    for objective in 0..arity {
        let projected = reversed.project(objective)?;
        for goal in goals.iter().filter(|g| projected.contains(g)) {
            let mut dijkstra = Dijkstra::new(&projected)
                .with_options(SearchOptions::default().with_progress(0));
            dijkstra.explore(goal, &[])?;

            for (vertex, distance) in dijkstra.distances() {
                let bound = bounds
                    .entry(vertex.clone())
                    .or_insert_with(|| vec![Weight::MAX; arity]);
                bound[objective] = bound[objective].min(distance);
            }
        }
    }

    Ok(bounds
        .into_iter()
        .map(|(vertex, bound)| (vertex, Cost::from(bound)))
        .collect())
}

/// Walk the predecessors recorded by a Dijkstra run on a reversed graph,
/// which lead from `vertex` towards the run's start.
pub(crate) fn forward_path<N: Node, G>(dijkstra: &Dijkstra<'_, G>, vertex: &N) -> Option<Vec<N>>
where
    G: Graphable<Node = N> + ?Sized,
{
    dijkstra.distance(vertex)?;
    let mut nodes = vec![vertex.clone()];
    let mut current = vertex;
    while let Some(next) = dijkstra.predecessor(current) {
        if nodes.len() > dijkstra.cache.settled().len() {
            return None;
        }
        nodes.push(next.clone());
        current = next;
    }
    Some(nodes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture() -> Graph<String> {
        include_str!("../../fixtures/dijkstra.txt").parse().unwrap()
    }

    fn v(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn all_destinations() {
        let graph = fixture();
        let mut dijkstra = Dijkstra::new(&graph);
        dijkstra.run(&v("a"), &[]).unwrap();

        let expected = [("b", 2), ("c", 12), ("d", 7), ("e", 8), ("f", 9)];
        for (vertex, distance) in expected.iter() {
            assert_eq!(dijkstra.distance(&v(vertex)), Some(*distance));
            let costs = dijkstra.solutions().cost(&v("a"), &v(vertex));
            assert_eq!(costs, vec![Cost::from([*distance])]);
        }
        assert_eq!(dijkstra.distance(&v("a")), Some(0));

        let solutions = dijkstra.solutions();
        assert_eq!(solutions.get(&v("c")).map(|p| p.len()), Some(5));
        assert_eq!(solutions.min_cost(&v("a")), Some(Cost::from([2])));

        match dijkstra.result(&v("c")) {
            crate::SearchResult::Found(found) => {
                assert_eq!(found[0].path.to_string(), "a -> b -> d -> f -> c");
            }
            crate::SearchResult::NoSolution => panic!("No path to c"),
        }

        assert_eq!(dijkstra.predecessor(&v("c")), Some(&v("f")));
        assert_eq!(dijkstra.predecessors().count(), 5);
        assert!(dijkstra.metrics().explored() >= 6);
    }

    #[test]
    fn round_trip() {
        let graph = fixture();
        let mut dijkstra = Dijkstra::new(&graph);
        dijkstra.run(&v("a"), &[]).unwrap();

        for (_, paths) in dijkstra.solutions().all() {
            for path in paths {
                let total: Weight = path
                    .edges()
                    .map(|(s, t, _)| graph.weight(s, t).unwrap().components()[0])
                    .sum();
                assert_eq!(path.cost(), &Cost::from([total]));
            }
        }
    }

    #[test]
    fn goals() {
        let graph = fixture();
        let mut dijkstra = Dijkstra::new(&graph);
        dijkstra.run(&v("a"), &[v("d"), v("e")]).unwrap();

        assert_eq!(dijkstra.solutions().cost(&v("a"), &v("d")), vec![Cost::from([7])]);
        assert_eq!(dijkstra.solutions().cost(&v("a"), &v("e")), vec![Cost::from([8])]);
        assert!(!dijkstra.result(&v("c")).is_found());
        // Stops as soon as both goals are settled.
        assert_eq!(dijkstra.distance(&v("c")), None);
    }

    #[test]
    fn soft_failures() {
        let graph = fixture();
        let mut dijkstra = Dijkstra::new(&graph);

        dijkstra.run(&v("a"), &[v("a")]).unwrap();
        assert!(dijkstra.solutions().is_empty());

        dijkstra.run(&v("x"), &[v("f")]).unwrap();
        assert!(dijkstra.solutions().is_empty());

        dijkstra.run(&v("a"), &[v("x")]).unwrap();
        assert!(dijkstra.solutions().is_empty());

        dijkstra.run(&v("c"), &[v("a")]).unwrap();
        assert!(!dijkstra.result(&v("a")).is_found());
    }

    #[test]
    fn objective() {
        let graph: Graph<String> = include_str!("../../fixtures/namoa.txt").parse().unwrap();
        let mut dijkstra = Dijkstra::new(&graph).objective(1);
        dijkstra.run(&v("s"), &[v("y")]).unwrap();
        assert_eq!(dijkstra.solutions().cost(&v("s"), &v("y")), vec![Cost::from([9, 3])]);

        let mut dijkstra = Dijkstra::new(&graph).objective(2);
        assert!(dijkstra.run(&v("s"), &[v("y")]).is_err());
    }

    #[test]
    fn bounds() {
        let graph: Graph<String> = include_str!("../../fixtures/namoa.txt").parse().unwrap();
        let bounds = lower_bounds(&graph, &[v("y")]).unwrap();
        assert_eq!(bounds[&v("s")], Cost::from([4, 3]));
        assert_eq!(bounds[&v("n1")], Cost::from([3, 4]));
        assert_eq!(bounds[&v("y")], Cost::from([0, 0]));
        assert_eq!(bounds.len(), 8);
    }
}
