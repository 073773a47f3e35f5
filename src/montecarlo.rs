// src/montecarlo.rs
//! Sequential Monte-Carlo estimation with a convergence stopping rule.
//!
//! Iterations run in portions. After each portion the control sum is compared
//! with the one from the previous portion; the run stops once the change drops
//! below `precision` and at least `min_iterations` have been done, or when
//! `max_iterations` is reached.

use crate::error::{Result, ShieldError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    #[serde(default = "default_portion")]
    pub portion: usize,
    #[serde(default = "default_min_iterations")]
    pub min_iterations: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_precision")]
    pub precision: f64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            portion: default_portion(),
            min_iterations: default_min_iterations(),
            max_iterations: default_max_iterations(),
            precision: default_precision(),
            parallel: default_parallel(),
        }
    }
}

const fn default_portion() -> usize { 1000 }
const fn default_min_iterations() -> usize { 10_000 }
const fn default_max_iterations() -> usize { 1_000_000 }
const fn default_precision() -> f64 { 1e-5 }
const fn default_parallel() -> bool { true }

impl MonteCarloConfig {
    /// # Errors
    /// Returns `Config` if the portion is zero, the iteration cap is below one
    /// portion, or the precision is not a positive number.
    pub fn validate(&self) -> Result<()> {
        if self.portion == 0 {
            return Err(ShieldError::Config("monte_carlo.portion must be > 0".into()));
        }
        if self.max_iterations < self.portion {
            return Err(ShieldError::Config(format!(
                "monte_carlo.max_iterations ({}) must be >= portion ({})",
                self.max_iterations, self.portion
            )));
        }
        if self.precision.is_nan() || self.precision <= 0.0 {
            return Err(ShieldError::Config(format!(
                "monte_carlo.precision must be > 0, got {}",
                self.precision
            )));
        }
        Ok(())
    }
}

/// Outcome of a run. `estimate` is the control sum after the last portion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Convergence {
    pub estimate: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// A stateful estimator driven by [`run`].
pub trait Estimator {
    /// Called once before the first iteration.
    ///
    /// # Errors
    /// Aborts the run before any iteration.
    fn pre_process(&mut self) -> Result<()> {
        Ok(())
    }

    fn single_iteration(&mut self);

    /// Current value of the estimated quantity.
    fn control_sum(&self) -> f64;

    /// Called once after the last iteration.
    fn post_process(&mut self) {}
}

/// Runs `estimator` until convergence or the iteration cap.
///
/// # Errors
/// Returns `Config` for an invalid configuration, or whatever `pre_process` returns.
pub fn run<E: Estimator + ?Sized>(config: &MonteCarloConfig, estimator: &mut E) -> Result<Convergence> {
    config.validate()?;
    estimator.pre_process()?;
    let outcome = drive(config, |_, count| {
        for _ in 0..count {
            estimator.single_iteration();
        }
        estimator.control_sum()
    });
    estimator.post_process();
    Ok(outcome)
}

/// Estimates the mean of `sample` with one independent RNG stream per
/// iteration, derived from `seed` and the iteration index. Portions run on the
/// rayon pool when `config.parallel` is set; the result is the same either way.
///
/// # Errors
/// Returns `Config` for an invalid configuration.
#[allow(clippy::cast_precision_loss)]
pub fn run_parallel<F>(config: &MonteCarloConfig, seed: u64, sample: F) -> Result<Convergence>
where
    F: Fn(&mut StdRng) -> f64 + Sync,
{
    config.validate()?;
    let mut sum = 0.0;
    let draw = |k: usize| sample(&mut iteration_rng(seed, k));
    Ok(drive(config, |start, count| {
        let range = start..start + count;
        let values: Vec<f64> = if config.parallel {
            range.into_par_iter().map(draw).collect()
        } else {
            range.map(draw).collect()
        };
        // summed in iteration order so the result does not depend on scheduling
        sum += values.iter().sum::<f64>();
        sum / (start + count) as f64
    }))
}

/// Independent generator for iteration `k` of a run seeded with `seed`.
#[must_use]
pub fn iteration_rng(seed: u64, k: usize) -> StdRng {
    StdRng::seed_from_u64(splitmix64(seed ^ splitmix64(k as u64)))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Portion loop shared by both runners. `step(done, count)` performs `count`
/// more iterations after `done` and returns the new control sum.
fn drive<S>(config: &MonteCarloConfig, mut step: S) -> Convergence
where
    S: FnMut(usize, usize) -> f64,
{
    let mut iterations = 0;
    let mut previous: Option<f64> = None;
    let mut estimate = f64::NAN;
    let mut converged = false;

    while iterations < config.max_iterations {
        let count = config.portion.min(config.max_iterations - iterations);
        estimate = step(iterations, count);
        iterations += count;
        let delta = previous.map(|p| (estimate - p).abs());
        previous = Some(estimate);
        trace!(iterations, estimate, ?delta, "monte carlo portion");

        if iterations >= config.min_iterations && delta.map_or(false, |d| d < config.precision) {
            converged = true;
            break;
        }
    }

    debug!(iterations, estimate, converged, "monte carlo finished");
    Convergence {
        estimate,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    struct Constant {
        value: f64,
        calls: usize,
        finished: bool,
    }

    impl Estimator for Constant {
        fn single_iteration(&mut self) {
            self.calls += 1;
        }

        fn control_sum(&self) -> f64 {
            self.value
        }

        fn post_process(&mut self) {
            self.finished = true;
        }
    }

    fn config(portion: usize, min: usize, max: usize) -> MonteCarloConfig {
        MonteCarloConfig {
            portion,
            min_iterations: min,
            max_iterations: max,
            precision: 1e-5,
            parallel: false,
        }
    }

    #[test]
    fn test_stable_estimate_stops_at_minimum() {
        let mut est = Constant { value: 0.25, calls: 0, finished: false };
        let out = run(&config(100, 1000, 100_000), &mut est).unwrap();
        assert!(out.converged);
        assert_eq!(out.iterations, 1000);
        assert_eq!(est.calls, 1000);
        assert!(est.finished, "post_process runs");
        assert_eq!(out.estimate, 0.25);
    }

    #[test]
    fn test_cap_truncates_last_portion() {
        struct Drifting(f64);
        impl Estimator for Drifting {
            fn single_iteration(&mut self) {
                self.0 += 1.0;
            }
            fn control_sum(&self) -> f64 {
                self.0
            }
        }
        let out = run(&config(300, 0, 1000), &mut Drifting(0.0)).unwrap();
        assert!(!out.converged);
        assert_eq!(out.iterations, 1000, "never exceeds the cap");
        assert_eq!(out.estimate, 1000.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut est = Constant { value: 0.0, calls: 0, finished: false };
        assert!(run(&config(0, 0, 10), &mut est).is_err());
        assert!(run(&config(10, 0, 5), &mut est).is_err());
        let mut nan = config(10, 0, 100);
        nan.precision = f64::NAN;
        assert!(nan.validate().is_err());
        assert_eq!(est.calls, 0);
    }

    #[test]
    fn test_parallel_mean_is_schedule_independent() {
        let mut cfg = config(500, 5000, 50_000);
        let sample = |rng: &mut StdRng| rng.gen::<f64>();
        let sequential = run_parallel(&cfg, 7, sample).unwrap();
        cfg.parallel = true;
        let parallel = run_parallel(&cfg, 7, sample).unwrap();
        assert_eq!(sequential, parallel);
        assert!((parallel.estimate - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_streams_differ_per_iteration() {
        let a: u64 = iteration_rng(1, 0).gen();
        let b: u64 = iteration_rng(1, 1).gen();
        let c: u64 = iteration_rng(2, 0).gen();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, iteration_rng(1, 0).gen::<u64>());
    }
}
