// src/graph/history.rs
//! Reversible edit records kept while a graph is recording history.

use super::edge::Edge;

/// A single successful edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Addition { i: usize, j: usize },
    Removal { i: usize, j: usize },
}

impl Change {
    #[must_use]
    pub fn endpoints(&self) -> (usize, usize) {
        match *self {
            Change::Addition { i, j } | Change::Removal { i, j } => (i, j),
        }
    }

    #[must_use]
    pub fn edge(&self, directed: bool) -> Edge {
        let (i, j) = self.endpoints();
        Edge::new(i, j, directed)
    }
}

/// LIFO stack of changes.
#[derive(Debug, Clone, Default)]
pub struct History {
    changes: Vec<Change>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn pop(&mut self) -> Option<Change> {
        self.changes.pop()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Change> {
        self.changes.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }
}
