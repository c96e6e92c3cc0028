use log::warn;

use super::cache::{BestDistance, Cache};
use super::dijkstra::DijkstraQueue;
use super::{validate_endpoints, SearchAlgorithm, SearchOptions};
use crate::cost::Cost;
use crate::errors::Result;
use crate::graph::Graphable;
use crate::heuristic::HopCount;
use crate::metrics::{Metrics, Observer};
use crate::solution::{Destination, Solutions};
use crate::traits::{Heuristic, Search};

/// A* over the first cost component.
///
/// Candidates are ordered by distance plus the heuristic estimate. A
/// vertex reached more cheaply after it was expanded is expanded again,
/// so an admissible heuristic gives optimal paths even when it is not
/// consistent. Each goal gets its own search.
#[derive(Debug)]
pub struct AStar<'g, G, H = HopCount<'g, G>>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    heuristic: H,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
}

impl<'g, G> AStar<'g, G>
where
    G: Graphable + ?Sized,
{
    /// A* with the hop count heuristic.
    pub fn new(graph: &'g G) -> Self {
        AStar::with_heuristic(graph, HopCount::new(graph))
    }
}

impl<'g, G, H> AStar<'g, G, H>
where
    G: Graphable + ?Sized,
    H: Heuristic<G::Node>,
{
    pub fn with_heuristic(graph: &'g G, heuristic: H) -> Self {
        Self {
            graph,
            heuristic,
            observer: Observer::new("A*", SearchOptions::default().progress),
            solutions: Solutions::new(),
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
}

impl<'g, G, H> Search<G::Node> for AStar<'g, G, H>
where
    G: Graphable + ?Sized,
    H: Heuristic<G::Node>,
{
    fn name(&self) -> &'static str {
        "A*"
    }

    fn run(&mut self, start: &G::Node, goals: &[G::Node]) -> Result<()> {
        self.solutions.clear();
        self.observer.start();

        let goals = match validate_endpoints(self.graph, self.name(), start, goals) {
            Some(goals) => goals,
            None => {
                self.observer.finish();
                return Ok(());
            }
        };
        if goals.is_empty() {
            warn!("A*: no goal given, nothing to search for");
        }

        let graph = self.graph;
        for goal in goals {
            let heuristic = &mut self.heuristic;
            let cache = SearchAlgorithm::<DijkstraQueue<G::Node>, BestDistance<G::Node>>::new()
                .run(
                    graph,
                    start,
                    std::slice::from_ref(&goal),
                    0,
                    &mut self.observer,
                    |vertex| heuristic.estimate(vertex, &goal),
                )?;

            match cache.path(graph, &goal)? {
                Some(path) => self.solutions.add(Destination::Vertex(goal), path),
                None => warn!("A*: no path from {:?} to {:?}", start, goal),
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
