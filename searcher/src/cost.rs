//! Vector costs and the Pareto dominance algebra.
//!
//! Every multi-objective search compares costs thousands of times per
//! run, so the comparisons here work on borrowed slices and never
//! allocate. Costs with up to four components are stored inline.

use std::fmt;
use std::iter::FromIterator;

use smallvec::SmallVec;

use crate::errors::{Result, SearchError};

/// Data type used for a single cost component.
pub type Weight = u64;

type Components = SmallVec<[Weight; 4]>;

/// A cost vector with a fixed number of non-negative components,
/// or the distinguished infinite cost.
///
/// The derived ordering is lexicographic (with every finite cost below
/// [Cost::Infinite]). It is only used to order results deterministically;
/// dominance is a separate, partial relation, see [Cost::compare].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cost {
    Finite(Components),
    Infinite,
}

/// Outcome of a Pareto comparison between two costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// Left is no worse everywhere and strictly better somewhere.
    Dominates,
    /// Right dominates left.
    DominatedBy,
    Equal,
    Incomparable,
}

impl Cost {
    pub fn new<I>(components: I) -> Self
    where
        I: IntoIterator<Item = Weight>,
    {
        Cost::Finite(components.into_iter().collect())
    }

    /// The zero vector with `arity` components.
    pub fn zero(arity: usize) -> Self {
        Cost::Finite(SmallVec::from_elem(0, arity))
    }

    /// The empty vector, used as "no information yet".
    pub fn empty() -> Self {
        Cost::Finite(SmallVec::new())
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Cost::Infinite)
    }

    /// True for the empty vector. The infinite cost is not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Cost::Finite(c) => c.is_empty(),
            Cost::Infinite => false,
        }
    }

    /// Number of components. The infinite cost has none.
    pub fn arity(&self) -> usize {
        self.components().len()
    }

    pub fn components(&self) -> &[Weight] {
        match self {
            Cost::Finite(c) => c,
            Cost::Infinite => &[],
        }
    }

    pub fn get(&self, objective: usize) -> Option<Weight> {
        self.components().get(objective).copied()
    }

    /// The first two components, used as a lexicographic key.
    pub fn pair(&self) -> Result<(Weight, Weight)> {
        match self.components() {
            [first, second] if !self.is_infinite() => Ok((*first, *second)),
            c => Err(SearchError::ArityMismatch {
                expected: 2,
                found: c.len(),
            }),
        }
    }

    /// Component-wise addition.
    ///
    /// The empty vector is the identity and anything plus the infinite
    /// cost is infinite.
    pub fn try_add(&self, other: &Cost) -> Result<Cost> {
        match (self, other) {
            (Cost::Infinite, _) | (_, Cost::Infinite) => Ok(Cost::Infinite),
            (Cost::Finite(a), Cost::Finite(b)) => {
                if a.is_empty() {
                    return Ok(other.clone());
                }
                if b.is_empty() {
                    return Ok(self.clone());
                }
                check_arity(a, b)?;
                Ok(Cost::Finite(
                    a.iter().zip(b.iter()).map(|(x, y)| x.saturating_add(*y)).collect(),
                ))
            }
        }
    }

    /// Component-wise subtraction, failing instead of going below zero.
    pub fn try_sub(&self, other: &Cost) -> Result<Cost> {
        let negative = || SearchError::NegativeCost {
            minuend: self.to_string(),
            subtrahend: other.to_string(),
        };

        match (self, other) {
            (Cost::Infinite, Cost::Finite(_)) => Ok(Cost::Infinite),
            (_, Cost::Infinite) => Err(negative()),
            (Cost::Finite(a), Cost::Finite(b)) => {
                if b.is_empty() {
                    return Ok(self.clone());
                }
                check_arity(a, b)?;
                a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| x.checked_sub(*y).ok_or_else(negative))
                    .collect::<Result<Components>>()
                    .map(Cost::Finite)
            }
        }
    }

    /// Pareto comparison of two costs.
    ///
    /// Fails only when two non-empty finite costs have different arities.
    pub fn compare(&self, other: &Cost) -> Result<Dominance> {
        let (a, b) = match (self, other) {
            (Cost::Infinite, Cost::Infinite) => return Ok(Dominance::Incomparable),
            (Cost::Infinite, Cost::Finite(b)) if b.is_empty() => {
                return Ok(Dominance::Incomparable)
            }
            (Cost::Finite(a), Cost::Infinite) if a.is_empty() => {
                return Ok(Dominance::Incomparable)
            }
            (Cost::Infinite, Cost::Finite(_)) => return Ok(Dominance::DominatedBy),
            (Cost::Finite(_), Cost::Infinite) => return Ok(Dominance::Dominates),
            (Cost::Finite(a), Cost::Finite(b)) => (a, b),
        };

        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ok(Dominance::Equal),
            (true, false) => return Ok(Dominance::DominatedBy),
            (false, true) => return Ok(Dominance::Dominates),
            (false, false) => {}
        }
        check_arity(a, b)?;

        let mut better = false;
        let mut worse = false;
        for (x, y) in a.iter().zip(b.iter()) {
            if x < y {
                better = true;
            } else if x > y {
                worse = true;
            }
            if better && worse {
                return Ok(Dominance::Incomparable);
            }
        }

        Ok(match (better, worse) {
            (true, false) => Dominance::Dominates,
            (false, true) => Dominance::DominatedBy,
            (false, false) => Dominance::Equal,
            (true, true) => Dominance::Incomparable,
        })
    }

    /// Does this cost Pareto-dominate `other`?
    pub fn dominates(&self, other: &Cost) -> Result<bool> {
        Ok(self.compare(other)? == Dominance::Dominates)
    }

    /// Is this cost Pareto-dominated by `other`?
    pub fn is_dominated_by(&self, other: &Cost) -> Result<bool> {
        Ok(self.compare(other)? == Dominance::DominatedBy)
    }

    /// Dominates `other` or is equal to it.
    pub fn dominates_or_equals(&self, other: &Cost) -> Result<bool> {
        Ok(matches!(
            self.compare(other)?,
            Dominance::Dominates | Dominance::Equal
        ))
    }
}

fn check_arity(a: &[Weight], b: &[Weight]) -> Result<()> {
    if a.len() != b.len() {
        return Err(SearchError::ArityMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(())
}

impl From<Vec<Weight>> for Cost {
    fn from(components: Vec<Weight>) -> Self {
        Cost::Finite(components.into())
    }
}

impl<const N: usize> From<[Weight; N]> for Cost {
    fn from(components: [Weight; N]) -> Self {
        Cost::new(components)
    }
}

impl FromIterator<Weight> for Cost {
    fn from_iter<I: IntoIterator<Item = Weight>>(iter: I) -> Self {
        Cost::new(iter)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Infinite => write!(f, "inf"),
            Cost::Finite(c) => {
                write!(f, "(")?;
                for (i, w) in c.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", w)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A set of mutually non-dominated costs.
///
/// Inserting a cost evicts every member it dominates; a cost which is
/// dominated by (or equal to) a member is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostSet {
    costs: Vec<Cost>,
}

impl CostSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cost, returning whether it was kept.
    pub fn insert(&mut self, cost: Cost) -> Result<bool> {
        if self.covers(&cost)? {
            return Ok(false);
        }

        let mut kept = Vec::with_capacity(self.costs.len() + 1);
        for existing in self.costs.drain(..) {
            if !cost.dominates(&existing)? {
                kept.push(existing);
            }
        }
        kept.push(cost);
        self.costs = kept;
        Ok(true)
    }

    /// Does any member dominate `cost`?
    pub fn dominates(&self, cost: &Cost) -> Result<bool> {
        for existing in &self.costs {
            if existing.dominates(cost)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Does any member dominate or equal `cost`?
    pub fn covers(&self, cost: &Cost) -> Result<bool> {
        for existing in &self.costs {
            if existing.dominates_or_equals(cost)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn contains(&self, cost: &Cost) -> bool {
        self.costs.contains(cost)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cost> {
        self.costs.iter()
    }

    /// Members in lexicographic order.
    pub fn sorted(&self) -> Vec<Cost> {
        let mut costs = self.costs.clone();
        costs.sort();
        costs
    }
}

/// Filter `costs` down to its non-dominated members.
///
/// Keeps the first occurrence of duplicated costs and preserves the
/// input order otherwise.
pub fn non_dominated_subset(costs: &[Cost]) -> Result<Vec<Cost>> {
    let mut subset = Vec::new();
    for (i, cost) in costs.iter().enumerate() {
        let mut keep = true;
        for (j, other) in costs.iter().enumerate() {
            match other.compare(cost)? {
                Dominance::Dominates => keep = false,
                Dominance::Equal if j < i => keep = false,
                _ => {}
            }
            if !keep {
                break;
            }
        }
        if keep {
            subset.push(cost.clone());
        }
    }
    Ok(subset)
}

/// Is the set `costs` dominated by the set `by`?
///
/// True when a single member of `by` dominates every member of `costs`.
/// An empty `by` dominates nothing, and an empty `costs` is dominated by
/// any non-empty set.
pub fn set_dominated(costs: &[Cost], by: &[Cost]) -> Result<bool> {
    if by.is_empty() {
        return Ok(false);
    }
    if costs.is_empty() {
        return Ok(true);
    }

    'candidates: for candidate in by {
        for cost in costs {
            if !candidate.dominates(cost)? {
                continue 'candidates;
            }
        }
        return Ok(true);
    }
    Ok(false)
}
