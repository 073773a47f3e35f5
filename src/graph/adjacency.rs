// src/graph/adjacency.rs
//! Adjacency storage, chosen once at construction.

use super::node_set::NodeSet;

/// Per-node neighbor sets.
///
/// Undirected graphs mirror every edge into both successor lists and reuse them
/// as predecessors. Directed graphs keep a separate predecessor list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Adjacency {
    Symmetric { succs: Vec<NodeSet> },
    Split { succs: Vec<NodeSet>, preds: Vec<NodeSet> },
}

// Indexing is safe here: callers in graph::core range-check every node id
// against the vector length fixed at construction.
#[allow(clippy::indexing_slicing)]
impl Adjacency {
    #[must_use]
    pub fn new(n: usize, directed: bool) -> Self {
        let empty = || vec![NodeSet::new(); n];
        if directed {
            Adjacency::Split {
                succs: empty(),
                preds: empty(),
            }
        } else {
            Adjacency::Symmetric { succs: empty() }
        }
    }

    #[must_use]
    pub fn is_directed(&self) -> bool {
        matches!(self, Adjacency::Split { .. })
    }

    #[must_use]
    pub fn succs(&self, i: usize) -> &NodeSet {
        match self {
            Adjacency::Symmetric { succs } | Adjacency::Split { succs, .. } => &succs[i],
        }
    }

    #[must_use]
    pub fn preds(&self, i: usize) -> &NodeSet {
        match self {
            Adjacency::Symmetric { succs } => &succs[i],
            Adjacency::Split { preds, .. } => &preds[i],
        }
    }

    #[must_use]
    pub fn has_arc(&self, i: usize, j: usize) -> bool {
        self.succs(i).contains(j)
    }

    /// Stores the arc. The caller guarantees it is absent and `i != j`.
    pub fn link(&mut self, i: usize, j: usize) {
        match self {
            Adjacency::Symmetric { succs } => {
                succs[i].insert(j);
                succs[j].insert(i);
            }
            Adjacency::Split { succs, preds } => {
                succs[i].insert(j);
                preds[j].insert(i);
            }
        }
    }

    /// Drops the arc. The caller guarantees it is present.
    pub fn unlink(&mut self, i: usize, j: usize) {
        match self {
            Adjacency::Symmetric { succs } => {
                succs[i].remove(j);
                succs[j].remove(i);
            }
            Adjacency::Split { succs, preds } => {
                succs[i].remove(j);
                preds[j].remove(i);
            }
        }
    }

    /// Number of stored arcs, counting each undirected edge once.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        match self {
            Adjacency::Symmetric { succs } => succs.iter().map(NodeSet::len).sum::<usize>() / 2,
            Adjacency::Split { succs, .. } => succs.iter().map(NodeSet::len).sum(),
        }
    }

    /// Checks the mirror invariant between successor and predecessor lists.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self {
            Adjacency::Symmetric { succs } => succs.iter().enumerate().all(|(i, out)| {
                out.iter().all(|j| j != i && succs[j].contains(i))
            }),
            Adjacency::Split { succs, preds } => {
                let forward = succs.iter().enumerate().all(|(i, out)| {
                    out.iter().all(|j| j != i && preds[j].contains(i))
                });
                let backward = preds
                    .iter()
                    .enumerate()
                    .all(|(j, inc)| inc.iter().all(|i| succs[i].contains(j)));
                forward && backward
            }
        }
    }
}
