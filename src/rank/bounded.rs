// src/rank/bounded.rs
//! Capacity-limited ranking that keeps the best `capacity` elements.

use super::ranking::Ranking;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Heap slot ordered so that the worst element is the heap maximum.
#[derive(Debug, Clone)]
struct Slot<T> {
    score: f64,
    seq: u64,
    stamp: u64,
    item: T,
}

impl<T> Slot<T> {
    fn badness(&self, other: &Self) -> Ordering {
        // lower score is worse; among ties the later insertion is worse
        other
            .score
            .total_cmp(&self.score)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.badness(other) == Ordering::Equal && self.stamp == other.stamp
    }
}

impl<T> Eq for Slot<T> {}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Slot<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.badness(other).then(self.stamp.cmp(&other.stamp))
    }
}

/// Keeps at most `capacity` elements, evicting the worst on overflow.
///
/// The worst element is tracked by a max-heap of "badness" with lazy deletion:
/// every score change pushes a new slot and stale slots are dropped when they
/// surface. After every mutation the heap top is a live slot, so `worst` is
/// available through `&self`.
#[derive(Clone)]
pub struct BoundedRanking<T> {
    ranking: Ranking<T>,
    capacity: usize,
    heap: BinaryHeap<Slot<T>>,
    stamps: HashMap<T, u64>,
    next_stamp: u64,
}

impl<T: Eq + Hash + Clone> BoundedRanking<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ranking: Ranking::new(),
            capacity,
            heap: BinaryHeap::new(),
            stamps: HashMap::new(),
            next_stamp: 0,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records the score if the element is already held, if there is room,
    /// or if the score strictly beats the current worst (which is evicted).
    /// Returns whether the element was accepted.
    pub fn set_score(&mut self, element: T, score: f64) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let present = self.ranking.contains(&element);
        if !present && self.ranking.len() >= self.capacity {
            match self.worst_score() {
                Some(worst) if score > worst => {}
                _ => return false,
            }
        }

        self.ranking.set_score(element.clone(), score);
        self.track(element, score);
        if self.ranking.len() > self.capacity {
            self.evict_worst();
        }
        self.settle();
        self.compact_if_bloated();
        true
    }

    /// Adds `increment` to the held score (0 if absent), subject to the same
    /// acceptance rule as [`BoundedRanking::set_score`].
    pub fn inc_score(&mut self, element: T, increment: f64) -> bool {
        let current = self.ranking.score(&element).unwrap_or(0.0);
        self.set_score(element, current + increment)
    }

    pub fn remove(&mut self, element: &T) -> Option<f64> {
        let score = self.ranking.remove(element)?;
        self.stamps.remove(element);
        self.settle();
        Some(score)
    }

    #[must_use]
    pub fn worst(&self) -> Option<&T> {
        self.heap.peek().map(|slot| &slot.item)
    }

    #[must_use]
    pub fn worst_score(&self) -> Option<f64> {
        self.heap.peek().map(|slot| slot.score)
    }

    /// Read access to the held elements in rank order.
    #[must_use]
    pub fn as_ranking(&self) -> &Ranking<T> {
        &self.ranking
    }

    #[must_use]
    pub fn into_ranking(self) -> Ranking<T> {
        self.ranking
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.ranking.contains(element)
    }

    #[must_use]
    pub fn score(&self, element: &T) -> Option<f64> {
        self.ranking.score(element)
    }

    fn track(&mut self, element: T, score: f64) {
        let Some(seq) = self.ranking.insertion_seq(&element) else {
            return;
        };
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        self.stamps.insert(element.clone(), stamp);
        self.heap.push(Slot { score, seq, stamp, item: element });
    }

    fn evict_worst(&mut self) {
        self.settle();
        if let Some(slot) = self.heap.pop() {
            self.ranking.remove(&slot.item);
            self.stamps.remove(&slot.item);
        }
    }

    fn is_live(&self, slot: &Slot<T>) -> bool {
        self.stamps.get(&slot.item) == Some(&slot.stamp)
    }

    /// Drops stale slots until the top is live.
    fn settle(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.is_live(top) {
                break;
            }
            self.heap.pop();
        }
    }

    fn compact_if_bloated(&mut self) {
        if self.heap.len() <= 2 * self.ranking.len() + 16 {
            return;
        }
        let heap = std::mem::take(&mut self.heap);
        self.heap = heap.into_iter().filter(|slot| self.is_live(slot)).collect();
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> fmt::Debug for BoundedRanking<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedRanking")
            .field("capacity", &self.capacity)
            .field("ranking", &self.ranking)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_until_full_then_only_better() {
        let mut b = BoundedRanking::new(2);
        assert!(b.set_score("a", 1.0));
        assert!(b.set_score("b", 2.0));
        assert!(!b.set_score("c", 1.0), "ties with the worst are rejected");
        assert!(!b.set_score("c", 0.5));
        assert!(b.set_score("c", 3.0));
        assert_eq!(b.len(), 2);
        assert!(!b.contains(&"a"), "worst evicted");
        assert_eq!(b.as_ranking().to_vec(), vec!["c", "b"]);
    }

    #[test]
    fn test_zero_capacity_accepts_nothing() {
        let mut b = BoundedRanking::new(0);
        assert!(!b.set_score(1, 100.0));
        assert!(b.is_empty());
        assert_eq!(b.worst(), None);
    }

    #[test]
    fn test_present_element_always_updates() {
        let mut b = BoundedRanking::new(2);
        b.set_score("a", 5.0);
        b.set_score("b", 4.0);
        assert!(b.set_score("a", 0.0), "held elements may drop below the worst");
        assert_eq!(b.worst(), Some(&"a"));
        assert_eq!(b.worst_score(), Some(0.0));
    }

    #[test]
    fn test_worst_rederived_after_updating_worst() {
        let mut b = BoundedRanking::new(3);
        b.set_score("a", 1.0);
        b.set_score("b", 2.0);
        b.set_score("c", 3.0);
        assert_eq!(b.worst(), Some(&"a"));

        b.set_score("a", 10.0);
        assert_eq!(b.worst(), Some(&"b"), "old worst climbed above the others");
        assert!(!b.set_score("d", 2.0));
        assert!(b.set_score("d", 2.5));
        assert_eq!(b.worst(), Some(&"d"));
        assert!(!b.contains(&"b"));
    }

    #[test]
    fn test_worst_rederived_after_remove() {
        let mut b = BoundedRanking::new(3);
        b.set_score(1, 1.0);
        b.set_score(2, 2.0);
        b.set_score(3, 3.0);
        assert_eq!(b.remove(&1), Some(1.0));
        assert_eq!(b.worst(), Some(&2));
        assert_eq!(b.remove(&1), None);
        assert!(b.set_score(4, -1.0), "room again after removal");
        assert_eq!(b.worst(), Some(&4));
    }

    #[test]
    fn test_worst_matches_ranking_last_under_ties() {
        let mut b = BoundedRanking::new(3);
        b.set_score("x", 1.0);
        b.set_score("y", 1.0);
        b.set_score("z", 1.0);
        assert_eq!(b.worst(), b.as_ranking().last());
        assert!(b.set_score("w", 1.5));
        assert!(!b.contains(&"z"), "latest of the tied block evicted");
        assert_eq!(b.worst(), b.as_ranking().last());
    }

    #[test]
    fn test_capacity_never_exceeded_under_churn() {
        let mut b = BoundedRanking::new(5);
        for round in 0_u32..200 {
            let key = round % 17;
            b.inc_score(key, f64::from(round % 7) - 3.0);
            assert!(b.len() <= 5);
            assert_eq!(b.worst(), b.as_ranking().last());
        }
        assert!(b.heap.len() <= 2 * b.len() + 17);
    }
}
