#![deny(clippy::all)]

use clap::{value_t, App, Arg, ArgMatches};

use lazy_static::lazy_static;
use log::debug;
use paste::paste;
use thiserror::Error;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};

use searcher::{GoalPruning, Graph, Graphable};

pub mod experiments;

use experiments::Experiment;

type Error = anyhow::Error;
type Runner = Box<dyn (Fn(&Graph<String>, &Experiment) -> Result<String, Error>) + Send + Sync>;

fn render<T: fmt::Display>(outcome: Result<T, Error>) -> Result<String, Error> {
    outcome.map(|report| report.to_string())
}

macro_rules! algorithm {
    ($name:ident) => {
        paste! {
            (
                stringify!($name),
                Box::new(|graph: &Graph<String>, experiment: &Experiment| {
                    render(experiments::[<run_ $name>](graph, experiment))
                }) as Runner,
            )
        }
    };
}

macro_rules! fixture {
    ($name:ident) => {
        (
            stringify!($name),
            include_str!(concat!("../searcher/fixtures/", stringify!($name), ".txt")),
        )
    };
}

lazy_static! {
    static ref RUNNERS: BTreeMap<&'static str, Runner> = {
        let runners: Vec<(&'static str, Runner)> = vec![
            algorithm!(dijkstra),
            algorithm!(astar),
            algorithm!(bfs),
            algorithm!(dfs),
            algorithm!(bdijkstra),
            algorithm!(namoa),
            algorithm!(moa),
            algorithm!(pulse),
            algorithm!(compare),
        ];
        runners.into_iter().collect()
    };

    static ref FIXTURES: BTreeMap<&'static str, &'static str> = {
        vec![
            fixture!(astar),
            fixture!(dijkstra),
            fixture!(namoa),
            fixture!(moa),
        ]
        .into_iter()
        .collect()
    };
}

pub fn algorithms() -> Vec<&'static str> {
    RUNNERS.keys().copied().collect()
}

pub fn fixtures() -> Vec<&'static str> {
    FIXTURES.keys().copied().collect()
}

pub fn app() -> App<'static, 'static> {
    App::new("pathbench")
        .version("0.1")
        .author("Alex Rudy <opensource@alexrudy.net>")
        .about("Run shortest path searches over an edge list")
        .arg(
            Arg::with_name("algorithm")
                .value_name("ALGORITHM")
                .help("dijkstra, astar, bfs, dfs, bdijkstra, namoa, moa, pulse or compare")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start")
                .value_name("START")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("goals")
                .value_name("GOAL")
                .multiple(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .value_name("INPUT")
                .help("Edge list, one `source target w1 [w2 ...]` per line, or - for stdin")
                .takes_value(true)
                .conflicts_with("fixture"),
        )
        .arg(
            Arg::with_name("fixture")
                .short("f")
                .long("fixture")
                .value_name("FIXTURE")
                .help("Built-in graph: astar, dijkstra, namoa or moa")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("bidirectional")
                .long("bidirectional")
                .help("Every edge can also be travelled backwards"),
        )
        .arg(
            Arg::with_name("shared-pruning")
                .long("shared-pruning")
                .help("Solutions for one goal may prune paths to the others"),
        )
        .arg(
            Arg::with_name("informed")
                .long("informed")
                .help("Guide NAMOA* and MOA* with exact per-objective bounds"),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("N")
                .help("Seed for the MOA* vertex selector")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("More logging, repeat for more"),
        )
}

pub fn solver(matches: &ArgMatches) -> Result<(), Error> {
    let name = matches.value_of("algorithm").unwrap_or_default();
    let runner = RUNNERS
        .get(name)
        .ok_or_else(|| CliError::AlgorithmNotFound(name.to_string()))?;

    let source = read_graph(matches.value_of("input"), matches.value_of("fixture"))?;
    let graph: Graph<String> = source.parse()?;
    let graph = graph.bidirectional(matches.is_present("bidirectional"));
    debug!(
        "Loaded {} vertices and {} edges with {} objective(s)",
        graph.len(),
        graph.edge_count(),
        graph.arity()
    );

    let experiment = experiment(matches)?;
    print!("{}", runner(&graph, &experiment)?);
    Ok(())
}

fn experiment(matches: &ArgMatches) -> Result<Experiment, Error> {
    let seed = if matches.is_present("seed") {
        Some(value_t!(matches, "seed", u64)?)
    } else {
        None
    };

    Ok(Experiment {
        start: matches.value_of("start").unwrap_or_default().to_string(),
        goals: matches
            .values_of("goals")
            .map(|goals| goals.map(String::from).collect())
            .unwrap_or_default(),
        pruning: if matches.is_present("shared-pruning") {
            GoalPruning::Shared
        } else {
            GoalPruning::PerGoal
        },
        seed,
        informed: matches.is_present("informed"),
    })
}

type BoxedRead = Box<dyn Read + 'static>;

pub fn get_input_reader(filename: &str) -> Result<BoxedRead, Error> {
    let reader: BoxedRead = match filename {
        "-" => Box::new(io::stdin()),
        path => {
            let f = File::open(path).map_err(|e| CliError::InputNotFound(path.to_string(), e))?;
            Box::new(f)
        }
    };
    Ok(reader)
}

/// The edge list named by the command line, defaulting to the NAMOA graph.
pub fn read_graph(input: Option<&str>, fixture: Option<&str>) -> Result<String, Error> {
    match (input, fixture) {
        (Some(path), _) => {
            let mut source = String::new();
            get_input_reader(path)?.read_to_string(&mut source)?;
            Ok(source)
        }
        (None, fixture) => {
            let name = fixture.unwrap_or("namoa");
            let source = FIXTURES
                .get(name)
                .ok_or_else(|| CliError::FixtureNotFound(name.to_string()))?;
            Ok(source.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No algorithm named {0}")]
    AlgorithmNotFound(String),

    #[error("No built-in graph named {0}")]
    FixtureNotFound(String),

    #[error("Input not found: {0}")]
    InputNotFound(String, #[source] io::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(args: &[&str]) -> Result<(), Error> {
        let mut argv = vec!["pathbench"];
        argv.extend_from_slice(args);
        let matches = app().get_matches_from_safe(argv)?;
        solver(&matches)
    }

    #[test]
    fn registry() {
        assert_eq!(
            algorithms(),
            vec!["astar", "bdijkstra", "bfs", "compare", "dfs", "dijkstra", "moa", "namoa", "pulse"]
        );
        assert_eq!(fixtures(), vec!["astar", "dijkstra", "moa", "namoa"]);
    }

    #[test]
    fn runners() {
        let graph: Graph<String> = read_graph(None, Some("moa")).unwrap().parse().unwrap();
        let experiment = Experiment::new("s", &["y2"]);

        for name in ["bdijkstra", "namoa", "moa", "pulse"] {
            let output = RUNNERS[name](&graph, &experiment).unwrap();
            assert!(output.contains("(7, 7)"), "{}: {}", name, output);
        }
        let output = RUNNERS["compare"](&graph, &experiment).unwrap();
        assert!(output.contains("y2: agree (7, 7)"), "{}", output);
    }

    #[test]
    fn arguments() {
        let matches = app()
            .get_matches_from_safe(vec![
                "pathbench",
                "moa",
                "s",
                "y1",
                "y3",
                "--shared-pruning",
                "--seed",
                "4",
                "-vv",
            ])
            .unwrap();

        let experiment = experiment(&matches).unwrap();
        assert_eq!(experiment.start, "s");
        assert_eq!(experiment.goals, vec!["y1", "y3"]);
        assert_eq!(experiment.pruning, GoalPruning::Shared);
        assert_eq!(experiment.seed, Some(4));
        assert!(!experiment.informed);
        assert_eq!(matches.occurrences_of("verbose"), 2);
    }

    #[test]
    fn failures() {
        let err = run(&["walk", "s", "y"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::AlgorithmNotFound(_))
        ));

        let err = run(&["namoa", "s", "y", "-f", "maze"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::FixtureNotFound(_))
        ));

        let err = run(&["namoa", "s", "y", "-i", "/nonexistent/graph.txt"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::InputNotFound(..))
        ));

        assert!(run(&["pulse", "a", "f", "-f", "astar"]).is_err());
        assert!(run(&["namoa", "s", "y", "--seed", "many"]).is_err());
    }

    #[test]
    fn soft_failures_succeed() {
        assert!(run(&["namoa", "s", "nowhere"]).is_ok());
        assert!(run(&["dijkstra", "a", "-f", "dijkstra"]).is_ok());
        assert!(run(&["bfs", "y", "s", "--bidirectional"]).is_ok());
    }
}
