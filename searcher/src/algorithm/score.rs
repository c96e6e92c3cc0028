use std::cmp::{Ord, Ordering, PartialOrd};

use crate::cost::Weight;

/// A queued vertex in a single-objective search.
///
/// Ordered so that a [std::collections::BinaryHeap] pops the lowest
/// priority first, and the earliest queued among equal priorities.
#[derive(Debug, Clone)]
pub struct Scored<N> {
    pub(crate) priority: Weight,
    pub(crate) sequence: usize,
    pub(crate) distance: Weight,
    pub(crate) vertex: N,
    pub(crate) via: Option<N>,
}

impl<N> Scored<N> {
    fn key(&self) -> (Weight, usize) {
        (self.priority, self.sequence)
    }
}

impl<N> PartialEq for Scored<N> {
    fn eq(&self, other: &Self) -> bool {
        self.key().eq(&other.key())
    }
}

impl<N> Eq for Scored<N> {}

impl<N> Ord for Scored<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key()).reverse()
    }
}

impl<N> PartialOrd for Scored<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
