//! Single- and multi-objective shortest path search over weighted
//! directed graphs.
//!
//! Graphs are read through the [Graphable] trait, and every algorithm
//! implements [Search]: run it from a start vertex towards some goals, then
//! read the paths it found from its [Solutions]. Edge costs are vectors
//! ([Cost]) compared by Pareto dominance, so multi-objective searches
//! return every non-dominated path rather than a single best one.
//!
//! ```
//! use searcher::{Graph, Namoa, Search};
//!
//! let graph: Graph<String> = "s a 1 4\na t 1 4\ns t 5 1".parse().unwrap();
//! let mut namoa = Namoa::new(&graph);
//! namoa.run(&"s".to_string(), &["t".to_string()]).unwrap();
//! assert_eq!(namoa.result(&"t".to_string()).len(), 2);
//! ```

pub mod algorithm;
pub mod cost;
mod errors;
pub mod graph;
pub mod heuristic;
pub mod metrics;
pub mod solution;
mod traits;

pub use cost::{Cost, CostSet, Dominance, Weight};
pub use errors::{Result, SearchError};
pub use graph::{Edge, Graph, GraphPath, Graphable, Node};
pub use metrics::{Metrics, Observer};
pub use solution::{Destination, SearchResult, Solution, Solutions};
pub use traits::{CostHeuristic, Heuristic, Search, VertexSelector};

pub use algorithm::astar::AStar;
pub use algorithm::basic::{Bfs, Dfs, Traversal};
pub use algorithm::bdijkstra::BDijkstra;
pub use algorithm::dijkstra::Dijkstra;
pub use algorithm::heap::LabelHeap;
pub use algorithm::moa::Moa;
pub use algorithm::namoa::Namoa;
pub use algorithm::pulse::Pulse;
pub use algorithm::{validate_endpoints, GoalPruning, SearchOptions};

#[cfg(test)]
mod test {
    use super::*;
    use crate::heuristic::{FirstSelector, IdealPoint, RandomSelector, ZeroCost};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_graph(rng: &mut StdRng) -> Graph<u32> {
        let vertices = rng.gen_range(2..10);
        let mut graph = Graph::new(2);
        for v in 0..vertices {
            graph.add_vertex(v);
        }
        for _ in 0..rng.gen_range(1..26) {
            let source = rng.gen_range(0..vertices);
            let target = rng.gen_range(0..vertices);
            let cost: [Weight; 2] = [rng.gen_range(0..7), rng.gen_range(0..7)];
            graph.add_edge(source, target, cost).unwrap();
        }
        graph
    }

    fn front<S: Search<u32>>(search: &S, goal: u32) -> Vec<Cost> {
        search.result(&goal).costs()
    }

    #[test]
    fn multi_objective_agreement() {
        let mut rng = StdRng::seed_from_u64(2019);

        for _ in 0..200 {
            let graph = random_graph(&mut rng);
            let goals: Vec<u32> = (1..graph.len() as u32).collect();

            let mut bdijkstra = BDijkstra::new(&graph);
            bdijkstra.run(&0, &goals).unwrap();
            let mut namoa = Namoa::new(&graph);
            namoa.run(&0, &goals).unwrap();
            let mut moa = Moa::with_strategy(&graph, ZeroCost, RandomSelector::seeded(7));
            moa.run(&0, &goals).unwrap();

            for &goal in &goals {
                let expected = front(&bdijkstra, goal);
                assert_eq!(front(&namoa, goal), expected, "NAMOA* to {}", goal);
                assert_eq!(front(&moa, goal), expected, "MOA* to {}", goal);

                let mut single = Namoa::new(&graph);
                single.run(&0, &[goal]).unwrap();
                assert_eq!(front(&single, goal), expected, "single goal {}", goal);

                let mut pulse = Pulse::new(&graph);
                pulse.run(&0, &[goal]).unwrap();
                assert_eq!(front(&pulse, goal), expected, "PULSE to {}", goal);
            }
        }
    }

    #[test]
    fn pulse_within_namoa() {
        let graph: Graph<String> = include_str!("../fixtures/moa.txt").parse().unwrap();
        let start = "s".to_string();

        for goal in ["y1", "y2", "y3"].iter().map(|g| g.to_string()) {
            let mut namoa = Namoa::new(&graph);
            namoa.run(&start, &[goal.clone()]).unwrap();
            let mut pulse = Pulse::new(&graph);
            pulse.run(&start, &[goal.clone()]).unwrap();

            let reference = namoa.result(&goal).costs();
            for cost in pulse.result(&goal).costs() {
                assert!(reference
                    .iter()
                    .any(|r| r.dominates_or_equals(&cost).unwrap()));
            }
        }
    }

    #[test]
    fn informed_searches_agree() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let graph = random_graph(&mut rng);
            let goal = graph.len() as u32 - 1;
            if goal == 0 {
                continue;
            }

            let mut blind = Namoa::new(&graph);
            blind.run(&0, &[goal]).unwrap();

            let ideal = IdealPoint::new(&graph, &[goal]).unwrap();
            let mut informed = Namoa::with_heuristic(&graph, ideal.clone());
            informed.run(&0, &[goal]).unwrap();
            assert_eq!(front(&informed, goal), front(&blind, goal));

            let mut moa = Moa::with_strategy(&graph, ideal, FirstSelector);
            moa.run(&0, &[goal]).unwrap();
            assert_eq!(front(&moa, goal), front(&blind, goal));
        }
    }

    #[test]
    fn single_objective_agreement() {
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let graph = random_graph(&mut rng).project(0).unwrap();
            let mut dijkstra = Dijkstra::new(&graph);
            dijkstra.run(&0, &[]).unwrap();

            for goal in 1..graph.len() as u32 {
                let mut astar = AStar::with_heuristic(&graph, heuristic::ZeroHeuristic);
                astar.run(&0, &[goal]).unwrap();
                let mut namoa = Namoa::new(&graph);
                namoa.run(&0, &[goal]).unwrap();

                let best = dijkstra.distance(&goal).map(|d| vec![Cost::from([d])]);
                let best = best.unwrap_or_default();
                assert_eq!(front(&astar, goal), best);
                assert_eq!(front(&namoa, goal), best);
            }
        }
    }
}
