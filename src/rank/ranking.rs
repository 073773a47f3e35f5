// src/rank/ranking.rs
//! Score-ordered collections with a lazily memoized order.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

#[derive(Debug, Clone, Copy)]
struct Entry {
    score: f64,
    seq: u64,
}

#[derive(Debug, Clone)]
struct Order<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

/// Elements sorted by descending score.
///
/// Equal scores keep first-insertion order: an element that was inserted
/// earlier ranks higher. Overwriting a score keeps the original insertion slot;
/// removing and re-inserting takes a new one.
#[derive(Clone)]
pub struct Ranking<T> {
    scores: HashMap<T, Entry>,
    next_seq: u64,
    order: OnceCell<Order<T>>,
}

impl<T: Eq + Hash + Clone> Ranking<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scores: HashMap::new(),
            next_seq: 0,
            order: OnceCell::new(),
        }
    }

    /// Scores every element with `f`, in iteration order.
    pub fn from_fn<I, F>(elements: I, mut f: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> f64,
    {
        let mut ranking = Self::new();
        for element in elements {
            let score = f(&element);
            ranking.set_score(element, score);
        }
        ranking
    }

    pub fn set_score(&mut self, element: T, score: f64) {
        self.order.take();
        if let Some(entry) = self.scores.get_mut(&element) {
            entry.score = score;
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.scores.insert(element, Entry { score, seq });
    }

    /// Adds `increment` to the score, treating a missing element as 0.
    pub fn inc_score(&mut self, element: T, increment: f64) {
        let current = self.score(&element).unwrap_or(0.0);
        self.set_score(element, current + increment);
    }

    /// Returns the removed element's score.
    pub fn remove(&mut self, element: &T) -> Option<f64> {
        let removed = self.scores.remove(element)?;
        self.order.take();
        Some(removed.score)
    }

    #[must_use]
    pub fn score(&self, element: &T) -> Option<f64> {
        self.scores.get(element).map(|e| e.score)
    }

    pub(crate) fn insertion_seq(&self, element: &T) -> Option<u64> {
        self.scores.get(element).map(|e| e.seq)
    }

    #[must_use]
    pub fn contains(&self, element: &T) -> bool {
        self.scores.contains_key(element)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// All elements, best first.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.order().items
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// `(element, score)` pairs, best first.
    pub fn entries(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        self.iter().filter_map(|t| self.score(t).map(|s| (t, s)))
    }

    #[must_use]
    pub fn best(&self) -> Option<&T> {
        self.get(1)
    }

    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best().and_then(|t| self.score(t))
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.get(self.len())
    }

    #[must_use]
    pub fn last_score(&self) -> Option<f64> {
        self.last().and_then(|t| self.score(t))
    }

    /// Element at 1-indexed `rank`.
    #[must_use]
    pub fn get(&self, rank: usize) -> Option<&T> {
        rank.checked_sub(1).and_then(|idx| self.as_slice().get(idx))
    }

    /// The best `k` elements (fewer if the ranking is shorter).
    #[must_use]
    pub fn top(&self, k: usize) -> &[T] {
        let items = self.as_slice();
        &items[..k.min(items.len())]
    }

    /// The worst `k` elements, still in descending order.
    #[must_use]
    pub fn bottom(&self, k: usize) -> &[T] {
        let items = self.as_slice();
        &items[items.len() - k.min(items.len())..]
    }

    /// 1-indexed rank of the element.
    #[must_use]
    pub fn position(&self, element: &T) -> Option<usize> {
        self.order().positions.get(element).map(|p| p + 1)
    }

    /// Highest rank whose score is within `delta` of the element's score,
    /// walking up through the contiguous block of near-equal scores.
    #[must_use]
    pub fn exaequo_position(&self, element: &T, delta: f64) -> Option<usize> {
        let score = self.score(element)?;
        let mut top = self.position(element)?;
        while top > 1 && self.is_within(top - 1, score, delta) {
            top -= 1;
        }
        Some(top)
    }

    /// Mean of the top and bottom ranks of the element's near-equal block.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_position(&self, element: &T, delta: f64) -> Option<f64> {
        let score = self.score(element)?;
        let top = self.exaequo_position(element, delta)?;
        let mut bottom = self.position(element)?;
        while bottom < self.len() && self.is_within(bottom + 1, score, delta) {
            bottom += 1;
        }
        Some((top + bottom) as f64 / 2.0)
    }

    fn is_within(&self, rank: usize, score: f64, delta: f64) -> bool {
        self.get(rank)
            .and_then(|t| self.score(t))
            .map_or(false, |s| (s - score).abs() <= delta)
    }

    fn order(&self) -> &Order<T> {
        self.order.get_or_init(|| {
            let mut ranked: Vec<(&T, Entry)> = self.scores.iter().map(|(t, e)| (t, *e)).collect();
            ranked.sort_by(|(_, a), (_, b)| b.score.total_cmp(&a.score).then(a.seq.cmp(&b.seq)));
            let items: Vec<T> = ranked.into_iter().map(|(t, _)| t.clone()).collect();
            let positions = items
                .iter()
                .enumerate()
                .map(|(pos, t)| (t.clone(), pos))
                .collect();
            Order { items, positions }
        })
    }
}

impl<T: Eq + Hash + Clone> Default for Ranking<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &'a Ranking<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Eq + Hash + Clone + fmt::Display> fmt::Display for Ranking<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, (t, score)) in self.entries().enumerate() {
            writeln!(f, "{}. {t} {score}", rank + 1)?;
        }
        Ok(())
    }
}

impl<T: Eq + Hash + Clone + fmt::Debug> fmt::Debug for Ranking<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Ranking<&'static str> {
        let mut r = Ranking::new();
        r.set_score("a", 1.0);
        r.set_score("b", 3.0);
        r.set_score("c", 2.0);
        r.set_score("d", 2.0);
        r
    }

    #[test]
    fn test_descending_order_with_insertion_tie_break() {
        let r = sample();
        assert_eq!(r.to_vec(), vec!["b", "c", "d", "a"]);
        assert_eq!(r.best(), Some(&"b"));
        assert_eq!(r.last(), Some(&"a"));
        assert_eq!(r.get(2), Some(&"c"));
        assert_eq!(r.get(0), None);
        assert_eq!(r.get(5), None);
    }

    #[test]
    fn test_overwrite_keeps_insertion_slot() {
        let mut r = sample();
        r.set_score("c", 5.0);
        r.set_score("c", 2.0);
        assert_eq!(r.to_vec(), vec!["b", "c", "d", "a"]);

        r.remove(&"c");
        r.set_score("c", 2.0);
        assert_eq!(r.to_vec(), vec!["b", "d", "c", "a"], "re-insert goes behind ties");
    }

    #[test]
    fn test_mutation_invalidates_order() {
        let mut r = sample();
        assert_eq!(r.best(), Some(&"b"));
        r.inc_score("a", 10.0);
        assert_eq!(r.best(), Some(&"a"));
        assert_eq!(r.best_score(), Some(11.0));
        r.inc_score("z", 0.5);
        assert_eq!(r.last(), Some(&"z"));
        assert_eq!(r.remove(&"z"), Some(0.5));
        assert_eq!(r.remove(&"z"), None);
    }

    #[test]
    fn test_top_and_bottom_clamp() {
        let r = sample();
        assert_eq!(r.top(2), ["b", "c"]);
        assert_eq!(r.bottom(2), ["d", "a"]);
        assert_eq!(r.top(10).len(), 4);
        assert_eq!(r.bottom(10).len(), 4);
    }

    #[test]
    fn test_block_positions() {
        let r = sample();
        assert_eq!(r.position(&"d"), Some(3));
        assert_eq!(r.exaequo_position(&"d", 1e-9), Some(2));
        assert_eq!(r.avg_position(&"d", 1e-9), Some(2.5));
        assert_eq!(r.avg_position(&"c", 1e-9), Some(2.5));
        assert_eq!(r.avg_position(&"b", 1e-9), Some(1.0));
        // a wide tolerance merges everything
        assert_eq!(r.exaequo_position(&"a", 5.0), Some(1));
        assert_eq!(r.avg_position(&"missing", 0.0), None);
    }

    #[test]
    fn test_from_fn_and_display() {
        let r = Ranking::from_fn(vec![1_u32, 2, 3], |&x| f64::from(x * x));
        assert_eq!(r.to_vec(), vec![3, 2, 1]);
        assert_eq!(r.to_string(), "1. 3 9\n2. 2 4\n3. 1 1\n");
    }
}
