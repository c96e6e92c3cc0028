//! Runs the searches on a parsed graph and collects what they found.

use std::fmt;

use anyhow::Error;
use itertools::Itertools;
use log::info;

use searcher::heuristic::{IdealPoint, RandomSelector, ZeroCost};
use searcher::{
    AStar, BDijkstra, Bfs, Cost, Destination, Dfs, Dijkstra, GoalPruning, Graph, Graphable,
    Metrics, Moa, Namoa, Pulse, Search, SearchOptions, SearchResult,
};

/// What to search for, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    pub start: String,
    pub goals: Vec<String>,
    pub pruning: GoalPruning,
    pub seed: Option<u64>,
    pub informed: bool,
}

impl Experiment {
    pub fn new<S: Into<String>>(start: S, goals: &[&str]) -> Self {
        Self {
            start: start.into(),
            goals: goals.iter().map(|g| g.to_string()).collect(),
            pruning: GoalPruning::default(),
            seed: None,
            informed: false,
        }
    }

    fn options(&self) -> SearchOptions {
        SearchOptions::default().with_pruning(self.pruning)
    }

    /// The requested goals, or every other vertex when none were given.
    fn goals_or_all(&self, graph: &Graph<String>) -> Vec<String> {
        if !self.goals.is_empty() {
            return self.goals.clone();
        }
        graph
            .vertices()
            .into_iter()
            .filter(|v| **v != self.start)
            .cloned()
            .collect()
    }

    fn selector(&self) -> RandomSelector {
        self.seed.map(RandomSelector::seeded).unwrap_or_default()
    }
}

/// Everything one algorithm found in one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub algorithm: &'static str,
    pub outcomes: Vec<(Destination<String>, SearchResult<String>)>,
    pub metrics: Metrics,
}

impl Report {
    /// Collect the results of `search` for the goals of `experiment`.
    ///
    /// Without goals, every wildcard entry is reported per destination.
    pub fn new<S: Search<String>>(search: &S, experiment: &Experiment) -> Self {
        let outcomes = if experiment.goals.is_empty() {
            search
                .solutions()
                .all()
                .flat_map(|(_, paths)| paths.iter().map(|p| p.destination().clone()))
                .unique()
                .sorted()
                .map(|vertex| {
                    let result = search.result(&vertex);
                    (Destination::Vertex(vertex), result)
                })
                .collect()
        } else {
            experiment
                .goals
                .iter()
                .map(|goal| (Destination::Vertex(goal.clone()), search.result(goal)))
                .collect()
        };

        Self {
            algorithm: search.name(),
            outcomes,
            metrics: search.metrics().clone(),
        }
    }

    /// Costs found for `destination`, in lexicographic order.
    pub fn costs(&self, destination: &Destination<String>) -> Vec<Cost> {
        self.outcomes
            .iter()
            .find(|(d, _)| d == destination)
            .map(|(_, result)| result.costs())
            .unwrap_or_default()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.algorithm)?;
        for (destination, result) in &self.outcomes {
            match result {
                SearchResult::NoSolution => writeln!(f, "  {}: no path", destination)?,
                SearchResult::Found(solutions) => {
                    writeln!(f, "  {}: {} solution(s)", destination, solutions.len())?;
                    for solution in solutions {
                        writeln!(f, "    {:<12} {}", solution.cost.to_string(), solution.path)?;
                    }
                }
            }
        }
        writeln!(f, "  {}", self.metrics)
    }
}

/// Pareto fronts of several algorithms over the same goals.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub reports: Vec<Report>,
    pub goals: Vec<String>,
}

impl Comparison {
    /// Goals for which at least two algorithms found different fronts.
    pub fn disagreements(&self) -> Vec<&String> {
        self.goals
            .iter()
            .filter(|goal| {
                let destination = Destination::Vertex((*goal).clone());
                !self
                    .reports
                    .iter()
                    .map(|report| report.costs(&destination))
                    .all_equal()
            })
            .collect()
    }

    pub fn agrees(&self) -> bool {
        self.disagreements().is_empty()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.reports {
            writeln!(f, "{:<10} {}", report.algorithm, report.metrics)?;
        }

        let disagreements = self.disagreements();
        for goal in &self.goals {
            let destination = Destination::Vertex(goal.clone());
            if disagreements.contains(&goal) {
                writeln!(f, "{}: DISAGREE", goal)?;
                for report in &self.reports {
                    let front = report.costs(&destination).iter().join(" ");
                    writeln!(f, "  {:<10} {}", report.algorithm, front)?;
                }
            } else {
                let front = self
                    .reports
                    .first()
                    .map(|report| report.costs(&destination).iter().join(" "))
                    .unwrap_or_default();
                writeln!(f, "{}: agree {}", goal, front)?;
            }
        }
        Ok(())
    }
}

fn announce(algorithm: &str, graph: &Graph<String>, experiment: &Experiment) {
    info!(
        "{}: {} vertices, {} edges, from {} to [{}]",
        algorithm,
        graph.len(),
        graph.edge_count(),
        experiment.start,
        experiment.goals.iter().join(", ")
    );
}

pub fn run_dijkstra(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("dijkstra", graph, experiment);
    let mut search = Dijkstra::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_astar(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("astar", graph, experiment);
    let mut search = AStar::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_bfs(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("bfs", graph, experiment);
    let mut search = Bfs::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_dfs(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("dfs", graph, experiment);
    let mut search = Dfs::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_bdijkstra(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("bdijkstra", graph, experiment);
    let mut search = BDijkstra::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_namoa(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("namoa", graph, experiment);
    if experiment.informed && !experiment.goals.is_empty() {
        let heuristic = IdealPoint::new(graph, &experiment.goals)?;
        let mut search = Namoa::with_heuristic(graph, heuristic).with_options(experiment.options());
        search.run(&experiment.start, &experiment.goals)?;
        return Ok(Report::new(&search, experiment));
    }

    let mut search = Namoa::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_moa(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("moa", graph, experiment);
    if experiment.informed && !experiment.goals.is_empty() {
        let heuristic = IdealPoint::new(graph, &experiment.goals)?;
        let mut search = Moa::with_strategy(graph, heuristic, experiment.selector())
            .with_options(experiment.options());
        search.run(&experiment.start, &experiment.goals)?;
        return Ok(Report::new(&search, experiment));
    }

    let mut search = Moa::with_strategy(graph, ZeroCost, experiment.selector())
        .with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

pub fn run_pulse(graph: &Graph<String>, experiment: &Experiment) -> Result<Report, Error> {
    announce("pulse", graph, experiment);
    let mut search = Pulse::new(graph).with_options(experiment.options());
    search.run(&experiment.start, &experiment.goals)?;
    Ok(Report::new(&search, experiment))
}

/// Run every multi-objective search towards the same goals.
///
/// The bi-objective searches are left out unless the graph has exactly
/// two objectives. Goal pruning is always per goal, so every algorithm
/// returns the complete front of every goal.
pub fn run_compare(graph: &Graph<String>, experiment: &Experiment) -> Result<Comparison, Error> {
    let goals = experiment.goals_or_all(graph);
    let experiment = Experiment {
        goals: goals.clone(),
        pruning: GoalPruning::PerGoal,
        ..experiment.clone()
    };

    let mut reports = Vec::new();
    if graph.arity() == 2 {
        reports.push(run_bdijkstra(graph, &experiment)?);
    }
    reports.push(run_namoa(graph, &experiment)?);
    reports.push(run_moa(graph, &experiment)?);
    if graph.arity() == 2 {
        reports.push(run_pulse(graph, &experiment)?);
    }

    Ok(Comparison { reports, goals })
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture(source: &str) -> Graph<String> {
        source.parse().unwrap()
    }

    fn goal(name: &str) -> Destination<String> {
        Destination::Vertex(name.to_string())
    }

    #[test]
    fn astar_report() {
        let graph = fixture(include_str!("../searcher/fixtures/astar.txt"));
        let report = run_astar(&graph, &Experiment::new("a", &["f"])).unwrap();

        assert_eq!(report.algorithm, "A*");
        assert_eq!(report.costs(&goal("f")), vec![Cost::from([10])]);
        let text = report.to_string();
        assert!(text.contains("a -> c -> d -> f"), "{}", text);
    }

    #[test]
    fn dijkstra_everything() {
        let graph = fixture(include_str!("../searcher/fixtures/dijkstra.txt"));
        let report = run_dijkstra(&graph, &Experiment::new("a", &[])).unwrap();

        let reached: Vec<String> = report.outcomes.iter().map(|(d, _)| d.to_string()).collect();
        assert_eq!(reached, vec!["b", "c", "d", "e", "f"]);
        assert_eq!(report.costs(&goal("f")), vec![Cost::from([9])]);
    }

    #[test]
    fn missing_goal() {
        let graph = fixture(include_str!("../searcher/fixtures/namoa.txt"));
        let report = run_namoa(&graph, &Experiment::new("y", &["s"])).unwrap();

        assert!(report.costs(&goal("s")).is_empty());
        assert!(report.to_string().contains("s: no path"));
    }

    #[test]
    fn informed_moa() {
        let graph = fixture(include_str!("../searcher/fixtures/namoa.txt"));
        let mut experiment = Experiment::new("s", &["y"]);
        experiment.informed = true;
        experiment.seed = Some(11);

        let report = run_moa(&graph, &experiment).unwrap();
        assert_eq!(
            report.costs(&goal("y")),
            vec![Cost::from([4, 10]), Cost::from([9, 3])]
        );
    }

    #[test]
    fn shared_pruning() {
        let graph = fixture(include_str!("../searcher/fixtures/moa.txt"));
        let mut experiment = Experiment::new("s", &["y1", "y2", "y3"]);
        experiment.pruning = GoalPruning::Shared;

        let report = run_namoa(&graph, &experiment).unwrap();
        assert!(report.costs(&goal("y2")).is_empty());
        assert_eq!(
            report.costs(&goal("y3")),
            vec![Cost::from([6, 7]), Cost::from([9, 5])]
        );
    }

    #[test]
    fn comparison() {
        let graph = fixture(include_str!("../searcher/fixtures/moa.txt"));
        let mut experiment = Experiment::new("s", &["y1", "y2", "y3"]);
        experiment.pruning = GoalPruning::Shared;
        experiment.seed = Some(5);

        let comparison = run_compare(&graph, &experiment).unwrap();
        let names: Vec<&str> = comparison.reports.iter().map(|r| r.algorithm).collect();
        assert_eq!(names, vec!["BDijkstra", "NAMOA*", "MOA*", "PULSE"]);
        assert!(comparison.agrees());
        assert!(comparison.to_string().contains("y2: agree (7, 7)"));
    }

    #[test]
    fn comparison_without_goals() {
        let graph = fixture(include_str!("../searcher/fixtures/namoa.txt"));
        let comparison = run_compare(&graph, &Experiment::new("s", &[])).unwrap();

        assert_eq!(comparison.goals.len(), graph.len() - 1);
        assert!(comparison.agrees());
    }

    #[test]
    fn disagreement() {
        let graph = fixture(include_str!("../searcher/fixtures/namoa.txt"));
        let experiment = Experiment::new("s", &["y"]);
        let mut wrong = run_namoa(&graph, &experiment).unwrap();
        wrong.algorithm = "broken";
        wrong.outcomes[0].1 = SearchResult::NoSolution;

        let comparison = Comparison {
            reports: vec![run_bdijkstra(&graph, &experiment).unwrap(), wrong],
            goals: vec!["y".to_string()],
        };
        assert!(!comparison.agrees());
        assert!(comparison.to_string().contains("y: DISAGREE"));
    }

    #[test]
    fn arity_is_an_error() {
        let graph = fixture(include_str!("../searcher/fixtures/astar.txt"));
        assert!(run_pulse(&graph, &Experiment::new("a", &["f"])).is_err());

        let comparison = run_compare(&graph, &Experiment::new("a", &["f"])).unwrap();
        assert_eq!(comparison.reports.len(), 2);
        assert!(comparison.agrees());
    }
}
