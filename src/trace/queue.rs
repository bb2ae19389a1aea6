// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Queue disciplines and the visited-item tracker used by traversals.

use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::hash::Hash;

/// A queue item paired with its weight and insertion rank.
///
/// Orders by weight, breaking ties in favor of the item queued first, so
/// that a weighted traversal stays deterministic.
struct Weighted<T> {
    weight: usize,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Weighted<T> {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl<T> Eq for Weighted<T> {}

impl<T> PartialOrd for Weighted<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Weighted<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

enum Discipline<T> {
    Fifo(VecDeque<T>),
    Lifo(Vec<T>),
    Weighted {
        heap: BinaryHeap<Weighted<T>>,
        weight: Box<dyn Fn(&T) -> usize>,
        seq: u64,
    },
}

/// The queue of pending items of a traversal.
///
/// The discipline decides the traversal order: breadth-first, depth-first,
/// or highest weight first.
pub struct TraversalQueue<T> {
    discipline: Discipline<T>,
}

impl<T> TraversalQueue<T> {
    /// Creates a breadth-first queue.
    pub fn fifo() -> Self {
        TraversalQueue {
            discipline: Discipline::Fifo(VecDeque::new()),
        }
    }

    /// Creates a depth-first queue.
    pub fn lifo() -> Self {
        TraversalQueue {
            discipline: Discipline::Lifo(Vec::new()),
        }
    }

    /// Creates a queue that pops the highest-weighted item first, with ties
    /// broken by insertion order.
    pub fn weighted(weight: impl Fn(&T) -> usize + 'static) -> Self {
        TraversalQueue {
            discipline: Discipline::Weighted {
                heap: BinaryHeap::new(),
                weight: Box::new(weight),
                seq: 0,
            },
        }
    }

    /// Adds an item to the queue.
    pub fn push(&mut self, item: T) {
        match &mut self.discipline {
            Discipline::Fifo(queue) => queue.push_back(item),
            Discipline::Lifo(stack) => stack.push(item),
            Discipline::Weighted { heap, weight, seq } => {
                heap.push(Weighted {
                    weight: weight(&item),
                    seq: *seq,
                    item,
                });
                *seq += 1;
            }
        }
    }

    /// Removes and returns the next item, per the queue's discipline.
    pub fn pop(&mut self) -> Option<T> {
        match &mut self.discipline {
            Discipline::Fifo(queue) => queue.pop_front(),
            Discipline::Lifo(stack) => stack.pop(),
            Discipline::Weighted { heap, .. } => heap.pop().map(|weighted| weighted.item),
        }
    }

    /// Whether the queue holds no items.
    pub fn is_empty(&self) -> bool {
        match &self.discipline {
            Discipline::Fifo(queue) => queue.is_empty(),
            Discipline::Lifo(stack) => stack.is_empty(),
            Discipline::Weighted { heap, .. } => heap.is_empty(),
        }
    }

    /// Removes all items from the queue.
    pub fn clear(&mut self) {
        match &mut self.discipline {
            Discipline::Fifo(queue) => queue.clear(),
            Discipline::Lifo(stack) => stack.clear(),
            Discipline::Weighted { heap, .. } => heap.clear(),
        }
    }
}

/// Remembers which items a traversal has already visited.
pub struct Tracker<T> {
    visited: HashSet<T>,
}

impl<T: Eq + Hash> Tracker<T> {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Tracker {
            visited: HashSet::new(),
        }
    }

    /// Records a visit. Returns whether this is the first visit.
    pub fn visit(&mut self, item: T) -> bool {
        self.visited.insert(item)
    }

    /// Whether the item has been visited.
    pub fn has_visited(&self, item: &T) -> bool {
        self.visited.contains(item)
    }

    /// Forgets all visits.
    pub fn clear(&mut self) {
        self.visited.clear();
    }
}

impl<T: Eq + Hash> Default for Tracker<T> {
    fn default() -> Self {
        Tracker::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = TraversalQueue::fifo();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_lifo_order() {
        let mut queue = TraversalQueue::lifo();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(1));
    }

    #[test]
    fn test_weighted_order() {
        let mut queue = TraversalQueue::weighted(|&item: &usize| item % 10);
        queue.push(13);
        queue.push(21);
        queue.push(33);
        queue.push(12);
        assert_eq!(queue.pop(), Some(13));
        // equal weights pop in insertion order
        assert_eq!(queue.pop(), Some(33));
        assert_eq!(queue.pop(), Some(12));
        assert_eq!(queue.pop(), Some(21));
    }

    #[test]
    fn test_tracker() {
        let mut tracker = Tracker::new();
        assert!(tracker.visit("a"));
        assert!(!tracker.visit("a"));
        assert!(tracker.has_visited(&"a"));
        assert!(!tracker.has_visited(&"b"));
        tracker.clear();
        assert!(tracker.visit("a"));
    }
}
