// src/graph/edge.rs
//! Edge values. Undirected edges compare equal regardless of endpoint order.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An immutable pair of endpoints plus a directedness flag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Edge {
    i: usize,
    j: usize,
    directed: bool,
}

impl Edge {
    #[must_use]
    pub fn new(i: usize, j: usize, directed: bool) -> Self {
        Self { i, j, directed }
    }

    #[must_use]
    pub fn undirected(i: usize, j: usize) -> Self {
        Self::new(i, j, false)
    }

    #[must_use]
    pub fn directed(i: usize, j: usize) -> Self {
        Self::new(i, j, true)
    }

    #[must_use]
    pub fn i(&self) -> usize {
        self.i
    }

    #[must_use]
    pub fn j(&self) -> usize {
        self.j
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.i == self.j
    }

    /// The endpoint opposite to `v`, if `v` is an endpoint.
    #[must_use]
    pub fn other(&self, v: usize) -> Option<usize> {
        if v == self.i {
            Some(self.j)
        } else if v == self.j {
            Some(self.i)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, v: usize) -> bool {
        self.i == v || self.j == v
    }

    /// True if the two edges share an endpoint.
    #[must_use]
    pub fn incident(&self, other: &Edge) -> bool {
        self.contains(other.i) || self.contains(other.j)
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.j, self.i, self.directed)
    }

    /// The pair used for equality, hashing and ordering.
    #[must_use]
    pub fn key(&self) -> (usize, usize) {
        if self.directed {
            (self.i, self.j)
        } else {
            (self.i.min(self.j), self.i.max(self.j))
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.directed == other.directed && self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.directed.hash(state);
        self.key().hash(state);
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then(self.directed.cmp(&other.directed))
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.key();
        if self.directed {
            write!(f, "<{a},{b}>")
        } else {
            write!(f, "({a},{b})")
        }
    }
}
