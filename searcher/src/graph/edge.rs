use std::fmt;
use std::str::FromStr;

use crate::cost::{Cost, Weight};

/// A directed, weighted edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge<N> {
    pub source: N,
    pub target: N,
    pub cost: Cost,
}

impl<N> Edge<N> {
    pub fn new<C: Into<Cost>>(source: N, target: N, cost: C) -> Self {
        Self {
            source,
            target,
            cost: cost.into(),
        }
    }

    pub fn is_loop(&self) -> bool
    where
        N: PartialEq,
    {
        self.source == self.target
    }
}

impl<N> From<(N, N, Cost)> for Edge<N> {
    fn from(edge: (N, N, Cost)) -> Self {
        Edge {
            source: edge.0,
            target: edge.1,
            cost: edge.2,
        }
    }
}

impl<N: fmt::Display> fmt::Display for Edge<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.source, self.target, self.cost)
    }
}

/// Parses `source target w1 [w2 ...]`.
impl FromStr for Edge<String> {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();

        let source = fields.next().ok_or_else(|| "missing source".to_string())?;
        let target = fields.next().ok_or_else(|| "missing target".to_string())?;

        let weights = fields
            .map(|w| {
                w.parse::<Weight>()
                    .map_err(|e| format!("invalid weight {:?}: {}", w, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if weights.is_empty() {
            return Err(format!("edge {} -> {} has no weights", source, target));
        }

        Ok(Edge::new(source.to_string(), target.to_string(), weights))
    }
}
