//! Graph storage and queries.
//!
//! The search algorithms only ever read a graph through [Graphable];
//! [Graph] is the in-memory implementation used by the command line
//! runner and the tests.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::cost::Cost;
use crate::errors::{Result, SearchError};

mod edge;
mod path;
mod traits;

pub use edge::Edge;
pub use path::GraphPath;
pub use traits::{Graphable, Node};

/// A weighted directed graph with a fixed cost arity.
///
/// When bidirectional, every stored edge can also be travelled in
/// reverse with the same cost, unless an explicit reverse edge
/// was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph<N>
where
    N: Node,
{
    arity: usize,
    bidirectional: bool,
    forward: BTreeMap<N, BTreeMap<N, Cost>>,
    backward: BTreeMap<N, BTreeSet<N>>,
}

impl<N> Graph<N>
where
    N: Node,
{
    /// Create an empty graph whose edges carry `arity` cost components.
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            bidirectional: false,
            forward: BTreeMap::new(),
            backward: BTreeMap::new(),
        }
    }

    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// Build a graph from an iterator of edges.
    pub fn from_edges<I, E>(arity: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge<N>>,
    {
        let mut graph = Self::new(arity);
        for edge in edges {
            let edge = edge.into();
            graph.add_edge(edge.source, edge.target, edge.cost)?;
        }
        Ok(graph)
    }

    /// Copy any other graph into an in-memory graph, mirroring
    /// included.
    pub fn from_graphable<G>(other: &G) -> Result<Self>
    where
        G: Graphable<Node = N> + ?Sized,
    {
        let mut graph = Self::new(other.arity());
        for vertex in other.vertices() {
            graph.add_vertex(vertex.clone());
            for (target, cost) in other.outgoing(vertex) {
                graph.add_edge(vertex.clone(), target.clone(), cost.clone())?;
            }
        }
        Ok(graph)
    }

    /// Insert a vertex, returning whether it was new.
    pub fn add_vertex(&mut self, vertex: N) -> bool {
        if self.forward.contains_key(&vertex) {
            return false;
        }
        self.backward.entry(vertex.clone()).or_default();
        self.forward.insert(vertex, BTreeMap::new());
        true
    }

    /// Insert or replace an edge.
    ///
    /// Self-loops are never stored: both endpoints are still added as
    /// vertices, and `false` is returned.
    pub fn add_edge<C: Into<Cost>>(&mut self, source: N, target: N, cost: C) -> Result<bool> {
        let cost = cost.into();
        if cost.is_infinite() || cost.arity() != self.arity {
            return Err(SearchError::ArityMismatch {
                expected: self.arity,
                found: cost.arity(),
            });
        }

        self.add_vertex(source.clone());
        self.add_vertex(target.clone());
        if source == target {
            return Ok(false);
        }

        self.backward
            .entry(target.clone())
            .or_default()
            .insert(source.clone());
        self.forward.entry(source).or_default().insert(target, cost);
        Ok(true)
    }

    /// Remove a stored edge, returning its cost.
    pub fn remove_edge(&mut self, source: &N, target: &N) -> Option<Cost> {
        let cost = self.forward.get_mut(source)?.remove(target)?;
        if let Some(sources) = self.backward.get_mut(target) {
            sources.remove(source);
        }
        Some(cost)
    }

    /// The same graph with every edge pointing the other way.
    pub fn reversed(&self) -> Self {
        let mut graph = Self::new(self.arity).bidirectional(self.bidirectional);
        for (source, targets) in &self.forward {
            graph.add_vertex(source.clone());
            for (target, cost) in targets {
                graph
                    .forward
                    .entry(target.clone())
                    .or_default()
                    .insert(source.clone(), cost.clone());
                graph
                    .backward
                    .entry(source.clone())
                    .or_default()
                    .insert(target.clone());
            }
        }
        graph
    }

    /// A single-objective view keeping only cost component `objective`.
    pub fn project(&self, objective: usize) -> Result<Self> {
        if objective >= self.arity {
            return Err(SearchError::ArityMismatch {
                expected: self.arity,
                found: objective + 1,
            });
        }

        let mut graph = Self::new(1).bidirectional(self.bidirectional);
        for (source, target, cost) in self.edges() {
            graph.add_vertex(source.clone());
            let weight = cost.components()[objective];
            graph.add_edge(source.clone(), target.clone(), [weight])?;
        }
        for vertex in self.forward.keys() {
            graph.add_vertex(vertex.clone());
        }
        Ok(graph)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Number of stored edges, not counting mirrored ones.
    pub fn edge_count(&self) -> usize {
        self.forward.values().map(|t| t.len()).sum()
    }

    /// Stored edges in vertex order.
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N, &Cost)> {
        self.forward.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |(target, cost)| (source, target, cost))
        })
    }
}

impl<N> Graphable for Graph<N>
where
    N: Node,
{
    type Node = N;

    fn arity(&self) -> usize {
        self.arity
    }

    fn vertices(&self) -> Vec<&N> {
        self.forward.keys().collect()
    }

    fn contains(&self, vertex: &N) -> bool {
        self.forward.contains_key(vertex)
    }

    fn successors(&self, vertex: &N) -> Vec<&N> {
        let mut successors: BTreeSet<&N> = self
            .forward
            .get(vertex)
            .into_iter()
            .flat_map(|targets| targets.keys())
            .collect();
        if self.bidirectional {
            successors.extend(self.backward.get(vertex).into_iter().flatten());
        }
        successors.into_iter().collect()
    }

    fn predecessors(&self, vertex: &N) -> Vec<&N> {
        let mut predecessors: BTreeSet<&N> =
            self.backward.get(vertex).into_iter().flatten().collect();
        if self.bidirectional {
            predecessors.extend(
                self.forward
                    .get(vertex)
                    .into_iter()
                    .flat_map(|targets| targets.keys()),
            );
        }
        predecessors.into_iter().collect()
    }

    fn weight(&self, source: &N, target: &N) -> Option<&Cost> {
        let stored = self.forward.get(source).and_then(|t| t.get(target));
        if stored.is_some() || !self.bidirectional {
            return stored;
        }
        self.forward.get(target).and_then(|t| t.get(source))
    }
}

/// Parses a whitespace separated edge list, one `source target w1 [w2 ...]`
/// per line. Blank lines and `#` comments are ignored.
impl FromStr for Graph<String> {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let mut graph: Option<Graph<String>> = None;

        for (i, line) in s.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let parse_error = |reason: String| SearchError::Parse {
                line: i + 1,
                reason,
            };

            let edge: Edge<String> = line.parse().map_err(parse_error)?;
            let graph = graph.get_or_insert_with(|| Graph::new(edge.cost.arity()));
            if edge.cost.arity() != graph.arity {
                return Err(parse_error(format!(
                    "expected {} weights, found {}",
                    graph.arity,
                    edge.cost.arity()
                )));
            }
            graph
                .add_edge(edge.source, edge.target, edge.cost)
                .map_err(|e| parse_error(e.to_string()))?;
        }

        graph.ok_or(SearchError::Parse {
            line: 0,
            reason: "graph has no edges".to_string(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example() -> Graph<String> {
        "
        # two objectives
        s n1 1 2
        s n2 2 1
        n1 y 3 3   # trailing comment
        n2 y 1 5
        "
        .parse()
        .unwrap()
    }

    fn names(vertices: Vec<&String>) -> Vec<&str> {
        vertices.into_iter().map(|v| v.as_str()).collect()
    }

    #[test]
    fn parse() {
        let graph = example();
        assert_eq!(graph.arity(), 2);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(
            graph.weight(&"n2".to_string(), &"y".to_string()),
            Some(&Cost::from([1, 5]))
        );
    }

    #[test]
    fn parse_errors() {
        let err = "a b 1 2\nb c 1".parse::<Graph<String>>().unwrap_err();
        assert!(matches!(err, SearchError::Parse { line: 2, .. }));

        let err = "a b 1\nb c x".parse::<Graph<String>>().unwrap_err();
        assert!(matches!(err, SearchError::Parse { line: 2, .. }));

        assert!("# nothing here".parse::<Graph<String>>().is_err());
    }

    #[test]
    fn queries() {
        let graph = example();
        let s = "s".to_string();
        let y = "y".to_string();

        assert_eq!(names(graph.successors(&s)), vec!["n1", "n2"]);
        assert_eq!(names(graph.predecessors(&y)), vec!["n1", "n2"]);
        assert!(graph.successors(&y).is_empty());
        assert!(graph.successors(&"missing".to_string()).is_empty());
        assert!(graph.weight(&y, &s).is_none());
        assert_eq!(graph.outgoing(&s).len(), 2);
    }

    #[test]
    fn bidirectional() {
        let mut graph = Graph::new(1).bidirectional(true);
        graph.add_edge('a', 'b', [4]).unwrap();
        graph.add_edge('b', 'c', [2]).unwrap();
        graph.add_edge('c', 'b', [7]).unwrap();

        assert_eq!(graph.successors(&'b'), vec![&'a', &'c']);
        assert_eq!(graph.weight(&'b', &'a'), Some(&Cost::from([4])));
        assert_eq!(graph.weight(&'c', &'b'), Some(&Cost::from([7])));
        assert_eq!(graph.weight(&'b', &'c'), Some(&Cost::from([2])));
        assert_eq!(graph.predecessors(&'a'), vec![&'b']);
    }

    #[test]
    fn edits() {
        let mut graph = Graph::new(2);
        assert!(graph.add_edge(1, 2, [1, 1]).unwrap());
        assert!(!graph.add_edge(2, 2, [1, 1]).unwrap());
        assert!(graph.add_edge(1, 2, [1]).is_err());
        assert_eq!(graph.edge_count(), 1);

        assert_eq!(graph.remove_edge(&1, &2), Some(Cost::from([1, 1])));
        assert_eq!(graph.remove_edge(&1, &2), None);
        assert!(graph.predecessors(&2).is_empty());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn reverse_and_project() {
        let graph = example();
        let reversed = graph.reversed();
        let s = "s".to_string();
        let y = "y".to_string();

        assert_eq!(names(reversed.successors(&y)), vec!["n1", "n2"]);
        assert_eq!(
            reversed.weight(&"n1".to_string(), &s),
            Some(&Cost::from([1, 2]))
        );

        let second = reversed.project(1).unwrap();
        assert_eq!(second.arity(), 1);
        assert_eq!(
            second.weight(&"y".to_string(), &"n2".to_string()),
            Some(&Cost::from([5]))
        );
        assert_eq!(second.len(), graph.len());
        assert!(graph.project(2).is_err());

        let copy = Graph::from_graphable(&graph).unwrap();
        assert_eq!(copy, graph);
    }
}
