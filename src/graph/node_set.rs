// src/graph/node_set.rs
//! Unordered sets of node identifiers.
//!
//! Backed by a hash set with a fixed-key hasher, so iteration order depends only
//! on the sequence of operations applied to the set. Random selection walks that
//! order, which keeps seeded runs reproducible.

use rand::Rng;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::BuildHasherDefault;

type NodeHasher = BuildHasherDefault<DefaultHasher>;

/// A mutable, unordered group of nodes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: HashSet<usize, NodeHasher>,
}

impl NodeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set of all nodes `0..n`.
    #[must_use]
    pub fn full(n: usize) -> Self {
        (0..n).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, node: usize) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns true if the node was not present before.
    pub fn insert(&mut self, node: usize) -> bool {
        self.nodes.insert(node)
    }

    /// Returns true if the node was present.
    pub fn remove(&mut self, node: usize) -> bool {
        self.nodes.remove(&node)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied()
    }

    /// Nodes in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.iter().collect();
        nodes.sort_unstable();
        nodes
    }

    /// First node in iteration order.
    #[must_use]
    pub fn any(&self) -> Option<usize> {
        self.iter().next()
    }

    pub fn remove_any(&mut self) -> Option<usize> {
        let node = self.any()?;
        self.nodes.remove(&node);
        Some(node)
    }

    /// Uniformly random member, found by skipping along the iteration order.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let skip = rng.gen_range(0..self.len());
        self.iter().nth(skip)
    }

    pub fn remove_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let node = self.random(rng)?;
        self.nodes.remove(&node);
        Some(node)
    }

    /// Uniformly random subset of `min(k, len)` members, drawn without replacement.
    pub fn random_subset<R: Rng + ?Sized>(&self, rng: &mut R, k: usize) -> NodeSet {
        let mut chosen = NodeSet::new();
        for _ in 0..k.min(self.len()) {
            let skip = rng.gen_range(0..self.len() - chosen.len());
            if let Some(node) = self.iter().filter(|v| !chosen.contains(*v)).nth(skip) {
                chosen.insert(node);
            }
        }
        chosen
    }

    /// Uniformly random `k`-subset of `0..n` (clamped to `n`).
    pub fn random_of_range<R: Rng + ?Sized>(rng: &mut R, k: usize, n: usize) -> NodeSet {
        let mut chosen = NodeSet::new();
        for t in 0..k.min(n) {
            let skip = rng.gen_range(0..n - t);
            if let Some(node) = (0..n).filter(|v| !chosen.contains(*v)).nth(skip) {
                chosen.insert(node);
            }
        }
        chosen
    }

    /// Adds every member of `other`.
    pub fn extend_from(&mut self, other: &NodeSet) {
        self.nodes.extend(other.iter());
    }

    /// Removes every member of `other`.
    pub fn remove_all(&mut self, other: &NodeSet) {
        for node in other.iter() {
            self.nodes.remove(&node);
        }
    }

    /// Keeps only members that are also in `other`.
    pub fn keep_only(&mut self, other: &NodeSet) {
        self.nodes.retain(|v| other.contains(*v));
    }

    pub fn retain<F: FnMut(usize) -> bool>(&mut self, mut keep: F) {
        self.nodes.retain(|v| keep(*v));
    }

    #[must_use]
    pub fn union(a: &NodeSet, b: &NodeSet) -> NodeSet {
        a.iter_union(b).collect()
    }

    #[must_use]
    pub fn difference(a: &NodeSet, b: &NodeSet) -> NodeSet {
        a.iter_difference(b).collect()
    }

    #[must_use]
    pub fn intersection(a: &NodeSet, b: &NodeSet) -> NodeSet {
        a.iter_intersection(b).collect()
    }

    /// Lazy union: all of the bigger operand, then the rest of the smaller.
    pub fn iter_union<'a>(&'a self, other: &'a NodeSet) -> impl Iterator<Item = usize> + 'a {
        let (small, big) = order_by_size(self, other);
        big.iter().chain(small.iter().filter(move |v| !big.contains(*v)))
    }

    /// Lazy difference `self \ other`.
    pub fn iter_difference<'a>(&'a self, other: &'a NodeSet) -> impl Iterator<Item = usize> + 'a {
        self.iter().filter(move |v| !other.contains(*v))
    }

    /// Lazy intersection driven by the smaller operand.
    pub fn iter_intersection<'a>(
        &'a self,
        other: &'a NodeSet,
    ) -> impl Iterator<Item = usize> + 'a {
        let (small, big) = order_by_size(self, other);
        small.iter().filter(move |v| big.contains(*v))
    }

    #[must_use]
    pub fn intersection_len(&self, other: &NodeSet) -> usize {
        self.iter_intersection(other).count()
    }
}

fn order_by_size<'a>(a: &'a NodeSet, b: &'a NodeSet) -> (&'a NodeSet, &'a NodeSet) {
    if a.len() < b.len() {
        (a, b)
    } else {
        (b, a)
    }
}

impl FromIterator<usize> for NodeSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = NodeSet::new();
        set.nodes.extend(iter);
        set
    }
}

impl Extend<usize> for NodeSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

impl<const N: usize> From<[usize; N]> for NodeSet {
    fn from(nodes: [usize; N]) -> Self {
        nodes.into_iter().collect()
    }
}

impl fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.sorted()).finish()
    }
}

impl fmt::Display for NodeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<String> = self.sorted().iter().map(ToString::to_string).collect();
        write!(f, "[{}]", nodes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_set_algebra() {
        let a = NodeSet::from([1, 2, 3, 4]);
        let b = NodeSet::from([3, 4, 5]);

        assert_eq!(NodeSet::union(&a, &b).sorted(), vec![1, 2, 3, 4, 5]);
        assert_eq!(NodeSet::difference(&a, &b).sorted(), vec![1, 2]);
        assert_eq!(NodeSet::intersection(&a, &b).sorted(), vec![3, 4]);
        assert_eq!(a.intersection_len(&b), 2);
        assert_eq!(b.iter_union(&a).count(), 5, "union iterator yields no duplicates");
    }

    #[test]
    fn test_in_place_updates() {
        let mut a = NodeSet::full(6);
        a.remove_all(&NodeSet::from([0, 5]));
        assert_eq!(a.sorted(), vec![1, 2, 3, 4]);

        a.keep_only(&NodeSet::from([2, 3, 9]));
        assert_eq!(a.sorted(), vec![2, 3]);

        a.extend_from(&NodeSet::from([7]));
        assert!(a.contains(7));
        assert_eq!(a.to_string(), "[2, 3, 7]");
    }

    #[test]
    fn test_random_members_come_from_set() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = NodeSet::from([10, 20, 30, 40, 50]);
        for _ in 0..50 {
            let v = set.random(&mut rng).unwrap();
            assert!(set.contains(v));
        }
        assert_eq!(NodeSet::new().random(&mut rng), None);
    }

    #[test]
    fn test_random_subset_is_distinct_and_clamped() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = NodeSet::full(8);

        let sub = set.random_subset(&mut rng, 5);
        assert_eq!(sub.len(), 5);
        assert!(sub.iter().all(|v| set.contains(v)));

        let all = set.random_subset(&mut rng, 20);
        assert_eq!(all, set, "k larger than the set returns the whole set");

        let ranged = NodeSet::random_of_range(&mut rng, 3, 4);
        assert_eq!(ranged.len(), 3);
        assert!(ranged.iter().all(|v| v < 4));
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let set = NodeSet::full(100);
        let a = set.random_subset(&mut StdRng::seed_from_u64(3), 10);
        let b = set.random_subset(&mut StdRng::seed_from_u64(3), 10);
        assert_eq!(a, b);
    }
}
