// src/predict/mod.rs
//! Pairwise link predictors and the per-graph score cache.

pub mod cache;
pub mod local;

pub use cache::ScoreCache;
pub use local::LocalIndex;

use crate::graph::Graph;

/// Scores how likely the pair `(i, j)` is to be linked. Higher is more likely.
///
/// Implementations may assume both endpoints are in range and distinct; the
/// [`ScoreCache`] checks that before calling.
pub trait LinkPredictor: Send + Sync {
    fn name(&self) -> &str;
    fn score(&self, graph: &Graph, i: usize, j: usize) -> f64;
}

impl<P: LinkPredictor + ?Sized> LinkPredictor for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, graph: &Graph, i: usize, j: usize) -> f64 {
        (**self).score(graph, i, j)
    }
}

impl<P: LinkPredictor + ?Sized> LinkPredictor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, graph: &Graph, i: usize, j: usize) -> f64 {
        (**self).score(graph, i, j)
    }
}

/// A named closure used as a predictor.
pub struct FnPredictor<F> {
    name: String,
    f: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&Graph, usize, usize) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> LinkPredictor for FnPredictor<F>
where
    F: Fn(&Graph, usize, usize) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, graph: &Graph, i: usize, j: usize) -> f64 {
        (self.f)(graph, i, j)
    }
}

/// All local similarity indices, boxed for heterogeneous use.
#[must_use]
pub fn all_local() -> Vec<Box<dyn LinkPredictor>> {
    LocalIndex::ALL
        .iter()
        .map(|&index| Box::new(index) as Box<dyn LinkPredictor>)
        .collect()
}

/// Looks a local index up by its canonical name.
#[must_use]
pub fn by_name(name: &str) -> Option<Box<dyn LinkPredictor>> {
    LocalIndex::from_name(name).map(|index| Box::new(index) as Box<dyn LinkPredictor>)
}
