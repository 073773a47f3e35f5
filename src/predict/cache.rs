// src/predict/cache.rs
//! Memoized predictor scores for one graph state.
//!
//! The cache remembers the identity and generation of the graph it was filled
//! against. Any edit bumps the generation, so the next lookup after an edit
//! discards every memoized score and starts over.

use super::LinkPredictor;
use crate::error::Result;
use crate::graph::{Edge, Graph, GraphId};
use crate::rank::{BoundedRanking, Ranking};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::trace;

#[derive(Debug, Default)]
struct CacheState {
    graph: Option<GraphId>,
    generation: u64,
    scores: HashMap<Edge, f64>,
}

impl CacheState {
    fn is_current(&self, g: &Graph) -> bool {
        self.graph == Some(g.id()) && self.generation == g.generation()
    }

    fn rebind(&mut self, g: &Graph) {
        if !self.scores.is_empty() {
            trace!(graph = %g.name(), dropped = self.scores.len(), "score cache invalidated");
        }
        self.graph = Some(g.id());
        self.generation = g.generation();
        self.scores.clear();
    }
}

/// Per-predictor score memo, safe to share across threads reading the same
/// unchanging graph.
pub struct ScoreCache<P> {
    predictor: P,
    state: RwLock<CacheState>,
}

impl<P: LinkPredictor> ScoreCache<P> {
    pub fn new(predictor: P) -> Self {
        Self {
            predictor,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn name(&self) -> &str {
        self.predictor.name()
    }

    /// Score of the candidate pair `(i, j)`: 0 for self-pairs and pairs that
    /// are already linked, otherwise the memoized predictor score.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range.
    pub fn score(&self, g: &Graph, i: usize, j: usize) -> Result<f64> {
        g.check_node(i)?;
        g.check_node(j)?;
        if i == j || g.has_arc(i, j) {
            return Ok(0.0);
        }
        Ok(self.memoized(g, i, j))
    }

    /// Raw memoized predictor score for any distinct pair, linked or not.
    ///
    /// # Errors
    /// Returns `NodeOutOfRange` if an endpoint is out of range.
    pub fn pair_score(&self, g: &Graph, i: usize, j: usize) -> Result<f64> {
        g.check_node(i)?;
        g.check_node(j)?;
        if i == j {
            return Ok(0.0);
        }
        Ok(self.memoized(g, i, j))
    }

    fn memoized(&self, g: &Graph, i: usize, j: usize) -> f64 {
        let key = g.edge(i, j);
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.is_current(g) {
                if let Some(&score) = state.scores.get(&key) {
                    return score;
                }
            }
        }
        let score = self.predictor.score(g, i, j);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.is_current(g) {
            state.rebind(g);
        }
        state.scores.insert(key, score);
        score
    }

    /// Every non-edge, best first.
    ///
    /// # Errors
    /// Propagates scoring errors; none are expected for a consistent graph.
    pub fn non_edges_ranking(&self, g: &Graph) -> Result<Ranking<Edge>> {
        let mut ranking = Ranking::new();
        for e in g.non_edges() {
            ranking.set_score(e, self.score(g, e.i(), e.j())?);
        }
        Ok(ranking)
    }

    /// The `k` best-scored non-edges.
    ///
    /// # Errors
    /// Propagates scoring errors; none are expected for a consistent graph.
    pub fn top_non_edges(&self, g: &Graph, k: usize) -> Result<BoundedRanking<Edge>> {
        let mut top = BoundedRanking::new(k);
        for e in g.non_edges() {
            top.set_score(e, self.score(g, e.i(), e.j())?);
        }
        Ok(top)
    }

    /// Every present edge by its raw pair score, best first.
    ///
    /// # Errors
    /// Propagates scoring errors; none are expected for a consistent graph.
    pub fn edges_ranking(&self, g: &Graph) -> Result<Ranking<Edge>> {
        let mut ranking = Ranking::new();
        for e in g.edges() {
            ranking.set_score(e, self.pair_score(g, e.i(), e.j())?);
        }
        Ok(ranking)
    }

    /// The `k` present edges with the highest raw pair score.
    ///
    /// # Errors
    /// Propagates scoring errors; none are expected for a consistent graph.
    pub fn top_edges(&self, g: &Graph, k: usize) -> Result<BoundedRanking<Edge>> {
        let mut top = BoundedRanking::new(k);
        for e in g.edges() {
            top.set_score(e, self.pair_score(g, e.i(), e.j())?);
        }
        Ok(top)
    }

    /// Number of memoized scores, including stale ones not yet discarded.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .scores
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the memo was filled against this exact graph state.
    pub fn is_current(&self, g: &Graph) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_current(g)
    }

    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = CacheState::default();
    }
}
