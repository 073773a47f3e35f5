// src/auc/sampled.rs
//! Monte-Carlo AUC: compare a random probe against a random negative pair.

use super::ProbeSet;
use crate::error::{Result, ShieldError};
use crate::graph::Graph;
use crate::montecarlo::{self, Convergence, Estimator, MonteCarloConfig};
use crate::predict::{LinkPredictor, ScoreCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Estimates the AUC, in parallel portions when `config.parallel` is set.
/// Runs with the same seed and runner repeat exactly.
///
/// # Errors
/// Returns `EmptyProbeSet`, `NoNegativePairs`, `InvalidProbe`, or `Config`
/// for an invalid Monte-Carlo configuration.
pub fn auc<P: LinkPredictor>(
    g: &Graph,
    probes: &ProbeSet,
    cache: &ScoreCache<P>,
    config: &MonteCarloConfig,
    seed: u64,
) -> Result<Convergence> {
    precheck(g, probes)?;
    let sampler = PairSampler { g, probes, cache };
    if config.parallel {
        montecarlo::run_parallel(config, seed, |rng| sampler.sample(rng))
    } else {
        let mut estimator = SampledAuc::new(sampler, StdRng::seed_from_u64(seed));
        montecarlo::run(config, &mut estimator)
    }
}

fn precheck(g: &Graph, probes: &ProbeSet) -> Result<()> {
    if probes.is_empty() {
        return Err(ShieldError::EmptyProbeSet);
    }
    probes.check(g)?;
    if g.non_edges_count() == probes.len() {
        return Err(ShieldError::NoNegativePairs);
    }
    Ok(())
}

struct PairSampler<'a, P> {
    g: &'a Graph,
    probes: &'a ProbeSet,
    cache: &'a ScoreCache<P>,
}

impl<P: LinkPredictor> PairSampler<'_, P> {
    /// 1 if the probe wins, 0.5 on a tie, 0 otherwise.
    #[allow(clippy::float_cmp)]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let Some(probe) = self.probes.random(rng) else {
            return 0.0;
        };
        let (i, j) = self.random_negative(rng);
        let positive = self.score(probe.i(), probe.j());
        let negative = self.score(i, j);
        if positive > negative {
            1.0
        } else if positive == negative {
            0.5
        } else {
            0.0
        }
    }

    /// Rejection sampling; `precheck` guarantees a negative exists.
    fn random_negative<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        let n = self.g.size();
        loop {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            if i == j || self.g.has_arc(i, j) || self.probes.contains(&self.g.edge(i, j)) {
                continue;
            }
            return (i, j);
        }
    }

    fn score(&self, i: usize, j: usize) -> f64 {
        // both endpoints come from the graph's node range
        self.cache.score(self.g, i, j).unwrap_or(0.0)
    }
}

/// Running mean of pairwise comparisons, driven by [`montecarlo::run`].
struct SampledAuc<'a, P> {
    sampler: PairSampler<'a, P>,
    rng: StdRng,
    sum: f64,
    count: usize,
}

impl<'a, P: LinkPredictor> SampledAuc<'a, P> {
    fn new(sampler: PairSampler<'a, P>, rng: StdRng) -> Self {
        Self {
            sampler,
            rng,
            sum: 0.0,
            count: 0,
        }
    }
}

impl<P: LinkPredictor> Estimator for SampledAuc<'_, P> {
    fn pre_process(&mut self) -> Result<()> {
        precheck(self.sampler.g, self.sampler.probes)
    }

    fn single_iteration(&mut self) {
        self.sum += self.sampler.sample(&mut self.rng);
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn control_sum(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}
