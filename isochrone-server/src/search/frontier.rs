//! Frontier queue: the work list driving the search.
//!
//! A min-heap on elapsed minutes. There is no decrease-key; stale entries are
//! left in the heap and skipped when popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<T> {
    trip_mins: f64,
    seq: u64,
    item: T,
}

// Reversed so that `BinaryHeap` (a max-heap) pops the smallest time first.
// Equal times pop in insertion order.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .trip_mins
            .total_cmp(&self.trip_mins)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

/// Priority queue keyed by elapsed minutes, ascending.
pub struct FrontierQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> FrontierQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, trip_mins: f64, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            trip_mins,
            seq,
            item,
        });
    }

    /// Remove and return the entry with the least elapsed time.
    pub fn pop(&mut self) -> Option<(f64, T)> {
        self.heap.pop().map(|e| (e.trip_mins, e.item))
    }

    pub fn peek(&self) -> Option<(f64, &T)> {
        self.heap.peek().map(|e| (e.trip_mins, &e.item))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for FrontierQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_smallest_first() {
        let mut q = FrontierQueue::new();
        q.push(5.0, "c");
        q.push(1.0, "a");
        q.push(3.0, "b");

        assert_eq!(q.len(), 3);
        assert_eq!(q.peek(), Some((1.0, &"a")));
        assert_eq!(q.pop(), Some((1.0, "a")));
        assert_eq!(q.pop(), Some((3.0, "b")));
        assert_eq!(q.pop(), Some((5.0, "c")));
        assert_eq!(q.pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn ties_pop_in_insertion_order() {
        let mut q = FrontierQueue::new();
        q.push(2.0, "first");
        q.push(2.0, "second");
        q.push(0.5, "zero");
        q.push(2.0, "third");

        let order: Vec<_> = std::iter::from_fn(|| q.pop()).map(|(_, s)| s).collect();
        assert_eq!(order, vec!["zero", "first", "second", "third"]);
    }
}
