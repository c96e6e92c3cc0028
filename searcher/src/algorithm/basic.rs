//! Blind traversals: breadth-first and depth-first search.

use std::marker::PhantomData;

use log::{debug, warn};

use super::cache::{Cache, FirstVisit};
use super::score::Scored;
use super::{validate_endpoints, SearchAlgorithm, SearchOptions, SearchQueue};
use crate::cost::Cost;
use crate::errors::Result;
use crate::graph::Graphable;
use crate::metrics::{Metrics, Observer};
use crate::solution::{Destination, Solutions};
use crate::traits::Search;

pub use bfs::BreadthQueue;
pub use dfs::DepthQueue;

/// A queue which decides the traversal order.
pub trait Frontier<N>: SearchQueue<Candidate = Scored<N>> + Default {
    const NAME: &'static str;
}

mod bfs {
    use std::collections::VecDeque;
    use std::default::Default;

    use super::Frontier;
    use crate::algorithm::score::Scored;
    use crate::algorithm::SearchQueue;

    #[derive(Debug)]
    pub struct BreadthQueue<S> {
        queue: VecDeque<S>,
    }

    impl<S> SearchQueue for BreadthQueue<S> {
        type Candidate = S;

        fn pop(&mut self) -> Option<Self::Candidate> {
            self.queue.pop_front()
        }

        fn push(&mut self, item: Self::Candidate) {
            self.queue.push_back(item);
        }

        fn len(&self) -> usize {
            self.queue.len()
        }
    }

    impl<S> Default for BreadthQueue<S> {
        fn default() -> Self {
            BreadthQueue {
                queue: VecDeque::new(),
            }
        }
    }

    impl<N> Frontier<N> for BreadthQueue<Scored<N>> {
        const NAME: &'static str = "BFS";
    }
}

mod dfs {
    use std::collections::VecDeque;
    use std::default::Default;

    use super::Frontier;
    use crate::algorithm::score::Scored;
    use crate::algorithm::SearchQueue;

    #[derive(Debug)]
    pub struct DepthQueue<S> {
        queue: VecDeque<S>,
    }

    impl<S> Default for DepthQueue<S> {
        fn default() -> Self {
            DepthQueue {
                queue: VecDeque::new(),
            }
        }
    }

    impl<S> SearchQueue for DepthQueue<S> {
        type Candidate = S;

        fn pop(&mut self) -> Option<Self::Candidate> {
            self.queue.pop_front()
        }

        fn push(&mut self, item: Self::Candidate) {
            self.queue.push_front(item);
        }

        fn len(&self) -> usize {
            self.queue.len()
        }
    }

    impl<N> Frontier<N> for DepthQueue<Scored<N>> {
        const NAME: &'static str = "DFS";
    }
}

/// Traversal tree search, where the visiting order is determined by
/// the frontier queue (Q). The first visit to a vertex wins.
///
/// Paths carry the real edge costs, but are not optimal in general.
#[derive(Debug)]
pub struct Traversal<'g, G, Q>
where
    G: Graphable + ?Sized,
{
    graph: &'g G,
    observer: Observer<'g, G::Node>,
    solutions: Solutions<G::Node>,
    frontier: PhantomData<Q>,
}

/// Breadth-first search: paths with the fewest edges.
pub type Bfs<'g, G> = Traversal<'g, G, BreadthQueue<Scored<<G as Graphable>::Node>>>;

/// Depth-first search with an explicit stack.
pub type Dfs<'g, G> = Traversal<'g, G, DepthQueue<Scored<<G as Graphable>::Node>>>;

impl<'g, G, Q> Traversal<'g, G, Q>
where
    G: Graphable + ?Sized,
    Q: Frontier<G::Node>,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            observer: Observer::new(Q::NAME, SearchOptions::default().progress),
            solutions: Solutions::new(),
            frontier: PhantomData,
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

impl<'g, G, Q> Search<G::Node> for Traversal<'g, G, Q>
where
    G: Graphable + ?Sized,
    Q: Frontier<G::Node>,
{
    fn name(&self) -> &'static str {
        Q::NAME
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

        let graph = self.graph;
        let cache = SearchAlgorithm::<Q, FirstVisit<G::Node>>::new().run(
            graph,
            start,
            &goals,
            0,
            &mut self.observer,
            |_| Some(0),
        )?;

        if goals.is_empty() {
            let mut reached: Vec<&G::Node> =
                cache.settled().keys().filter(|v| *v != start).collect();
            reached.sort();

            let mut paths = Vec::with_capacity(reached.len());
            for vertex in reached {
                if let Some(path) = cache.path(graph, vertex)? {
                    paths.push(path);
                }
            }
            debug!("{}: {} vertices reached from {:?}", Q::NAME, paths.len(), start);
            self.solutions.set(Destination::Any, paths);
        } else {
            for goal in goals {
                match cache.path(graph, &goal)? {
                    Some(path) => self.solutions.add(Destination::Vertex(goal), path),
                    None => warn!("{}: no path from {:?} to {:?}", Q::NAME, start, goal),
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::Graph;

    fn fixture() -> Graph<String> {
        include_str!("../../fixtures/dijkstra.txt").parse().unwrap()
    }

    fn v(name: &str) -> String {
        name.to_string()
    }

    fn route(search: &impl Search<String>, goal: &str) -> String {
        search.result(&v(goal)).solutions()[0].path.to_string()
    }

    #[test]
    fn breadth_first() {
        let graph = fixture();
        let mut bfs = Bfs::new(&graph);
        bfs.run(&v("a"), &[v("f")]).unwrap();

        assert_eq!(bfs.name(), "BFS");
        assert_eq!(route(&bfs, "f"), "a -> b -> d -> f");
        assert_eq!(bfs.solutions().cost(&v("a"), &v("f")), vec![Cost::from([9])]);
    }

    #[test]
    fn depth_first() {
        let graph = fixture();
        let mut dfs = Dfs::new(&graph);
        dfs.run(&v("a"), &[v("f")]).unwrap();

        assert_eq!(dfs.name(), "DFS");
        assert_eq!(route(&dfs, "f"), "a -> c -> e -> f");
        assert_eq!(dfs.solutions().cost(&v("a"), &v("f")), vec![Cost::from([20])]);
    }

    #[test]
    fn everything() {
        let graph = fixture();
        let mut bfs = Bfs::new(&graph);
        bfs.run(&v("a"), &[]).unwrap();

        assert_eq!(bfs.solutions().get(&v("e")).map(|p| p.len()), Some(5));
        assert_eq!(route(&bfs, "c"), "a -> c");
        assert_eq!(bfs.metrics().explored(), 6);
    }

    #[test]
    fn soft_failures() {
        let graph = fixture();
        let mut dfs = Dfs::new(&graph);
        dfs.run(&v("q"), &[]).unwrap();
        assert!(dfs.solutions().is_empty());

        dfs.run(&v("e"), &[v("a")]).unwrap();
        assert!(!dfs.result(&v("a")).is_found());
    }
}
