// src/auc/mod.rs
//! Area under the ROC curve for link predictors.
//!
//! The positives are a set of hidden "probe" edges, the negatives every other
//! non-edge of the graph. The AUC is the probability that a random probe
//! scores strictly higher than a random negative, counting ties as one half.

pub mod exact;
pub mod probe;
pub mod sampled;

pub use probe::ProbeSet;

use crate::error::{Result, ShieldError};
use crate::graph::Graph;
use crate::montecarlo::MonteCarloConfig;
use crate::predict::{LinkPredictor, ScoreCache};
use crate::rank::Ranking;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AucMode {
    Exact,
    #[serde(alias = "mc")]
    MonteCarlo,
    #[default]
    Auto,
}

impl FromStr for AucMode {
    type Err = ShieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(Self::Exact),
            "mc" | "monte_carlo" | "montecarlo" => Ok(Self::MonteCarlo),
            "auto" => Ok(Self::Auto),
            other => Err(ShieldError::Config(format!("unknown AUC mode '{other}'"))),
        }
    }
}

impl fmt::Display for AucMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::MonteCarlo => "monte_carlo",
            Self::Auto => "auto",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AucConfig {
    #[serde(default)]
    pub mode: AucMode,
    /// `Auto` mode evaluates exactly on graphs with fewer nodes than this.
    #[serde(default = "default_exact_threshold")]
    pub exact_threshold: usize,
}

impl Default for AucConfig {
    fn default() -> Self {
        Self {
            mode: AucMode::default(),
            exact_threshold: default_exact_threshold(),
        }
    }
}

const fn default_exact_threshold() -> usize { 900 }

/// Evaluation method actually used for an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Exact,
    MonteCarlo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AucEstimate {
    pub auc: f64,
    pub method: Method,
    /// Sampled pairs; 0 for exact evaluation.
    pub iterations: usize,
    /// Always true for exact evaluation.
    pub converged: bool,
}

/// Mode selection plus Monte-Carlo settings and seed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AucEvaluator {
    pub settings: AucConfig,
    pub monte_carlo: MonteCarloConfig,
    pub seed: u64,
}

impl AucEvaluator {
    #[must_use]
    pub fn new(settings: AucConfig, monte_carlo: MonteCarloConfig, seed: u64) -> Self {
        Self {
            settings,
            monte_carlo,
            seed,
        }
    }

    /// The method `evaluate` would use on `g`.
    #[must_use]
    pub fn method_for(&self, g: &Graph) -> Method {
        match self.settings.mode {
            AucMode::Exact => Method::Exact,
            AucMode::MonteCarlo => Method::MonteCarlo,
            AucMode::Auto if g.size() < self.settings.exact_threshold => Method::Exact,
            AucMode::Auto => Method::MonteCarlo,
        }
    }

    /// # Errors
    /// Returns `InvalidProbe` if a probe is present in or foreign to `g`,
    /// `EmptyProbeSet`, `NoNegativePairs`, or a Monte-Carlo configuration error.
    pub fn evaluate<P: LinkPredictor>(
        &self,
        g: &Graph,
        probes: &ProbeSet,
        cache: &ScoreCache<P>,
    ) -> Result<AucEstimate> {
        let estimate = match self.method_for(g) {
            Method::Exact => AucEstimate {
                auc: exact::auc(g, probes, cache)?,
                method: Method::Exact,
                iterations: 0,
                converged: true,
            },
            Method::MonteCarlo => {
                let run = sampled::auc(g, probes, cache, &self.monte_carlo, self.seed)?;
                AucEstimate {
                    auc: run.estimate,
                    method: Method::MonteCarlo,
                    iterations: run.iterations,
                    converged: run.converged,
                }
            }
        };
        debug!(
            predictor = cache.name(),
            auc = estimate.auc,
            method = ?estimate.method,
            "auc evaluated"
        );
        Ok(estimate)
    }
}

/// AUC of every predictor on the same probe set, keyed by predictor name.
/// The best entry is the best achievable AUC among them.
///
/// # Errors
/// Fails on the first predictor whose evaluation fails.
pub fn rank_predictors<P: LinkPredictor>(
    g: &Graph,
    probes: &ProbeSet,
    predictors: &[P],
    evaluator: &AucEvaluator,
) -> Result<Ranking<String>> {
    let mut ranking = Ranking::new();
    for predictor in predictors {
        let cache = ScoreCache::new(predictor);
        let estimate = evaluator.evaluate(g, probes, &cache)?;
        ranking.set_score(predictor.name().to_string(), estimate.auc);
    }
    Ok(ranking)
}
