// src/transaction.rs
//! Apply-score-rollback evaluation of batches of edge toggles.
//!
//! A transaction runs against the live graph under history recording and is
//! rolled back afterwards, so candidates are scored without copying the graph.

use crate::error::{Result, ShieldError};
use crate::graph::{Edge, Graph};
use rand::Rng;
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

impl Graph {
    /// Runs `f` on this graph and undoes every edit it made, whether it
    /// succeeds or fails. Nests inside an already active recording by undoing
    /// only the edits made past the current history depth.
    ///
    /// # Errors
    /// Returns the closure's error, or `StateCorrupted` if the edits could not
    /// be undone (for example because the closure stopped the recording).
    pub fn transaction<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Graph) -> std::result::Result<T, E>,
        E: From<ShieldError>,
    {
        let nested = self.is_recording_history();
        let depth = self.history_size();
        if !nested {
            self.start_recording_history();
        }
        let epoch = self.history_epoch();

        let outcome = f(self);
        self.roll_back(nested, depth, epoch).map_err(E::from)?;
        outcome
    }

    fn roll_back(&mut self, nested: bool, depth: usize, epoch: u64) -> Result<()> {
        if !self.is_recording_history() {
            return Err(ShieldError::StateCorrupted(format!(
                "{}: recording stopped inside a transaction",
                self.name()
            )));
        }
        if self.history_epoch() != epoch {
            return Err(ShieldError::StateCorrupted(format!(
                "{}: recording restarted inside a transaction",
                self.name()
            )));
        }
        if nested {
            let size = self.history_size();
            if size < depth {
                return Err(ShieldError::StateCorrupted(format!(
                    "{}: history shrank below the transaction start ({size} < {depth})",
                    self.name()
                )));
            }
            self.revert_changes(size - depth)?;
        } else {
            self.reset_graph()?;
            self.stop_recording_history();
        }
        Ok(())
    }
}

/// An ordered batch of edge toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transaction {
    edges: Vec<Edge>,
}

impl Transaction {
    #[must_use]
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Toggles every edge in order.
    ///
    /// # Errors
    /// Returns `SelfLoop` for a loop edge, or the graph's error for a foreign
    /// edge. Edits made before the failing edge stay applied; run inside
    /// [`Graph::transaction`] to undo them.
    pub fn apply(&self, g: &mut Graph) -> Result<()> {
        for e in &self.edges {
            if e.is_loop() {
                return Err(ShieldError::SelfLoop(e.i()));
            }
            g.swap(e)?;
        }
        Ok(())
    }
}

impl FromIterator<Edge> for Transaction {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.edges.iter().map(Edge::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Every candidate with its score, in evaluation order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Evaluation {
    pub scored: Vec<(Transaction, f64)>,
    best: Option<usize>,
}

impl Evaluation {
    /// Highest-scoring candidate; the earliest one wins ties.
    #[must_use]
    pub fn best(&self) -> Option<(&Transaction, f64)> {
        self.best
            .and_then(|idx| self.scored.get(idx))
            .map(|(t, s)| (t, *s))
    }

    /// Highest-scoring candidate, choosing uniformly among ties. Scores tie
    /// when `total_cmp` says so, which keeps a NaN best reachable.
    pub fn best_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(&Transaction, f64)> {
        let (_, top) = self.best()?;
        let mut chosen = None;
        let mut ties = 0_u32;
        for (t, s) in self.scored.iter().filter(|(_, s)| s.total_cmp(&top).is_eq()) {
            ties += 1;
            if rng.gen_range(0..ties) == 0 {
                chosen = Some((t, *s));
            }
        }
        chosen
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scored.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scored.is_empty()
    }
}

/// Scores transactions against one graph, checking after each candidate that
/// the graph is back to its starting structure.
pub struct TransactionEvaluator<'g> {
    graph: &'g mut Graph,
    baseline: Graph,
}

impl<'g> TransactionEvaluator<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        let baseline = graph.clone();
        Self { graph, baseline }
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Applies `transaction`, scores the modified graph with `score`, rolls back.
    ///
    /// # Errors
    /// Returns the scoring or application error, or `StateCorrupted` if the
    /// graph does not match its starting structure afterwards.
    pub fn score<F>(&mut self, transaction: &Transaction, score: F) -> Result<f64>
    where
        F: FnOnce(&Graph) -> Result<f64>,
    {
        let value = self.graph.transaction(|g| {
            transaction.apply(g)?;
            score(g)
        });
        self.verify(transaction)?;
        let value = value?;
        trace!(%transaction, value, "transaction scored");
        Ok(value)
    }

    /// Scores every candidate and records the argmax.
    ///
    /// # Errors
    /// Stops at the first failing candidate, see [`TransactionEvaluator::score`].
    pub fn evaluate<I, F>(&mut self, candidates: I, mut score: F) -> Result<Evaluation>
    where
        I: IntoIterator<Item = Transaction>,
        F: FnMut(&Graph) -> Result<f64>,
    {
        let mut evaluation = Evaluation::default();
        let mut top = f64::NEG_INFINITY;
        for transaction in candidates {
            let value = self.score(&transaction, &mut score)?;
            if value > top || evaluation.best.is_none() {
                top = value;
                evaluation.best = Some(evaluation.scored.len());
            }
            evaluation.scored.push((transaction, value));
        }
        if let Some((t, s)) = evaluation.best() {
            debug!(candidates = evaluation.len(), best = %t, score = s, "transactions evaluated");
        }
        Ok(evaluation)
    }

    fn verify(&self, transaction: &Transaction) -> Result<()> {
        self.graph.verify_consistency()?;
        if self.graph.same_structure(&self.baseline) {
            Ok(())
        } else {
            Err(ShieldError::StateCorrupted(format!(
                "{}: not restored after {transaction}",
                self.graph.name()
            )))
        }
    }
}

/// All `k`-element subsets of `pool`, in lexicographic order of positions.
pub fn subsets<T: Clone>(pool: &[T], k: usize) -> Subsets<'_, T> {
    Subsets {
        pool,
        indices: (k <= pool.len()).then(|| (0..k).collect()),
    }
}

pub struct Subsets<'a, T> {
    pool: &'a [T],
    indices: Option<Vec<usize>>,
}

impl<T: Clone> Iterator for Subsets<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let indices = self.indices.as_mut()?;
        let current = indices.iter().filter_map(|&i| self.pool.get(i).cloned()).collect();

        let n = self.pool.len();
        let k = indices.len();
        // rightmost position that can still move right
        match (0..k).rev().find(|&pos| indices.get(pos).map_or(false, |&v| v < n - k + pos)) {
            Some(pos) => {
                let start = indices.get(pos).map_or(0, |&v| v + 1);
                for (offset, slot) in indices.iter_mut().skip(pos).enumerate() {
                    *slot = start + offset;
                }
            }
            None => self.indices = None,
        }
        Some(current)
    }
}
