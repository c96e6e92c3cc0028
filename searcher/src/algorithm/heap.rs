//! Indexed binary heap of bi-objective labels.
//!
//! Holds at most one label per vertex, keyed lexicographically by the
//! two cost components. A vertex to position index makes decrease-key
//! and removal O(log n) without lazy deletion, so the heap never holds
//! stale entries.

use std::collections::HashMap;

use super::labels::Label;
use crate::cost::Weight;
use crate::errors::{Result, SearchError};
use crate::graph::Node;

#[derive(Debug, Clone)]
struct Entry<N> {
    key: (Weight, Weight),
    sequence: usize,
    label: Label<N>,
}

impl<N> Entry<N> {
    fn rank(&self) -> ((Weight, Weight), usize) {
        (self.key, self.sequence)
    }
}

#[derive(Debug, Clone)]
pub struct LabelHeap<N>
where
    N: Node,
{
    entries: Vec<Entry<N>>,
    positions: HashMap<N, usize>,
    sequence: usize,
}

impl<N> Default for LabelHeap<N>
where
    N: Node,
{
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            sequence: 0,
        }
    }
}

impl<N> LabelHeap<N>
where
    N: Node,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_vertex(&self, vertex: &N) -> bool {
        self.positions.contains_key(vertex)
    }

    /// The label queued for `vertex`.
    pub fn get(&self, vertex: &N) -> Option<&Label<N>> {
        self.positions.get(vertex).map(|&i| &self.entries[i].label)
    }

    /// The lexicographically smallest label.
    pub fn peek(&self) -> Option<&Label<N>> {
        self.entries.first().map(|e| &e.label)
    }

    fn entry(&mut self, label: Label<N>) -> Result<Entry<N>> {
        let key = label.cost.pair()?;
        self.sequence += 1;
        Ok(Entry {
            key,
            sequence: self.sequence,
            label,
        })
    }

    /// Queue a label for a vertex which has none.
    pub fn push(&mut self, label: Label<N>) -> Result<()> {
        if self.contains_vertex(&label.vertex) {
            return Err(SearchError::VertexQueued(format!("{:?}", label.vertex)));
        }

        let entry = self.entry(label)?;
        let index = self.entries.len();
        self.positions.insert(entry.label.vertex.clone(), index);
        self.entries.push(entry);
        self.sift_up(index);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Label<N>> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let entry = self.entries.pop()?;
        self.positions.remove(&entry.label.vertex);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(entry.label)
    }

    /// Replace the queued label of a vertex with one whose cost
    /// dominates it.
    pub fn decrease_key(&mut self, label: Label<N>) -> Result<()> {
        let index = *self
            .positions
            .get(&label.vertex)
            .ok_or_else(|| SearchError::VertexNotQueued(format!("{:?}", label.vertex)))?;

        let old = &self.entries[index].label;
        if !label.cost.dominates(&old.cost)? {
            return Err(SearchError::NotImproving {
                vertex: format!("{:?}", label.vertex),
                old: old.cost.to_string(),
                new: label.cost.to_string(),
            });
        }

        self.entries[index] = self.entry(label)?;
        self.sift_up(index);
        Ok(())
    }

    /// Remove the label queued for `vertex`.
    pub fn remove(&mut self, vertex: &N) -> Option<Label<N>> {
        let index = *self.positions.get(vertex)?;
        let last = self.entries.len() - 1;
        self.swap(index, last);
        let entry = self.entries.pop()?;
        self.positions.remove(&entry.label.vertex);

        if index < self.entries.len() {
            let index = self.sift_up(index);
            self.sift_down(index);
        }
        Some(entry.label)
    }

    /// Check the heap order and the position index.
    pub fn is_valid(&self) -> bool {
        let ordered = (1..self.entries.len())
            .all(|i| self.entries[(i - 1) / 2].rank() <= self.entries[i].rank());
        let indexed = self.positions.len() == self.entries.len()
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(i, e)| self.positions.get(&e.label.vertex) == Some(&i));
        ordered && indexed
    }

    fn less(&self, i: usize, j: usize) -> bool {
        self.entries[i].rank() < self.entries[j].rank()
    }

    fn swap(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        self.entries.swap(i, j);
        for k in [i, j] {
            if let Some(p) = self.positions.get_mut(&self.entries[k].label.vertex) {
                *p = k;
            }
        }
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less(index, parent) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < self.entries.len() && self.less(left, smallest) {
                smallest = left;
            }
            if right < self.entries.len() && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cost::Cost;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn label(vertex: char, c1: Weight, c2: Weight) -> Label<char> {
        Label {
            vertex,
            cost: Cost::from([c1, c2]),
            predecessor: None,
        }
    }

    fn vertex(label: Option<Label<char>>) -> Option<char> {
        label.map(|l| l.vertex)
    }

    #[test]
    fn operations() {
        let mut heap = LabelHeap::new();
        for (v, c1, c2) in [('a', 1, 1), ('b', 2, 2), ('c', 0, 0), ('d', 3, 1), ('e', 1, 5)] {
            heap.push(label(v, c1, c2)).unwrap();
            assert!(heap.is_valid());
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek().map(|l| l.vertex), Some('c'));

        assert_eq!(vertex(heap.pop()), Some('c'));
        assert!(heap.is_valid());
        assert!(!heap.contains_vertex(&'c'));

        heap.decrease_key(label('d', 1, 0)).unwrap();
        assert!(heap.is_valid());
        assert_eq!(heap.peek().map(|l| l.vertex), Some('d'));
        assert_eq!(heap.get(&'d').map(|l| l.cost.clone()), Some(Cost::from([1, 0])));

        assert!(matches!(
            heap.decrease_key(label('b', 2, 3)),
            Err(SearchError::NotImproving { .. })
        ));
        assert!(matches!(
            heap.decrease_key(label('b', 2, 2)),
            Err(SearchError::NotImproving { .. })
        ));
        assert!(matches!(
            heap.decrease_key(label('z', 0, 0)),
            Err(SearchError::VertexNotQueued(_))
        ));
        assert!(matches!(
            heap.push(label('a', 0, 0)),
            Err(SearchError::VertexQueued(_))
        ));

        assert_eq!(vertex(heap.remove(&'e')), Some('e'));
        assert!(heap.remove(&'e').is_none());
        assert!(heap.is_valid());

        assert_eq!(vertex(heap.pop()), Some('d'));
        assert_eq!(vertex(heap.pop()), Some('a'));
        assert_eq!(vertex(heap.pop()), Some('b'));
        assert!(heap.pop().is_none());
        assert!(heap.is_empty());
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut heap = LabelHeap::new();
        heap.push(label('x', 2, 2)).unwrap();
        heap.push(label('y', 2, 2)).unwrap();
        heap.push(label('z', 1, 9)).unwrap();
        assert_eq!(vertex(heap.pop()), Some('z'));
        assert_eq!(vertex(heap.pop()), Some('x'));
        assert_eq!(vertex(heap.pop()), Some('y'));
    }

    #[test]
    fn wrong_arity() {
        let mut heap = LabelHeap::new();
        let bad = Label {
            vertex: 'a',
            cost: Cost::from([1, 2, 3]),
            predecessor: None,
        };
        assert!(heap.push(bad).is_err());
        assert!(heap.is_empty());
    }

    #[test]
    fn mixed_operations() {
        let mut rng = StdRng::seed_from_u64(2019);
        let mut heap = LabelHeap::new();

        for _ in 0..2_000 {
            let vertex = rng.gen_range(0..64u32);
            let c1 = rng.gen_range(0..50);
            let c2 = rng.gen_range(0..50);
            let cost = Cost::from([c1, c2]);
            let new = Label {
                vertex,
                cost: cost.clone(),
                predecessor: None,
            };

            match rng.gen_range(0..4) {
                0 => {
                    heap.pop();
                }
                1 => {
                    heap.remove(&vertex);
                }
                _ => match heap.get(&vertex).map(|l| l.cost.clone()) {
                    None => heap.push(new).unwrap(),
                    Some(old) if cost.dominates(&old).unwrap() => heap.decrease_key(new).unwrap(),
                    Some(_) => assert!(heap.decrease_key(new).is_err()),
                },
            }
            assert!(heap.is_valid());
        }

        let mut previous = None;
        while let Some(label) = heap.pop() {
            let key = label.cost.pair().unwrap();
            if let Some(previous) = previous {
                assert!(previous <= key);
            }
            previous = Some(key);
        }
    }
}
