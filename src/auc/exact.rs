// src/auc/exact.rs
//! Exact AUC by a single walk over the ranking of all non-edges.

use super::ProbeSet;
use crate::error::{Result, ShieldError};
use crate::graph::Graph;
use crate::predict::{LinkPredictor, ScoreCache};

/// Walks the non-edges best first in blocks of equal score. Every probe in a
/// block beats all negatives below the block and ties with the negatives
/// inside it.
///
/// # Errors
/// Returns `EmptyProbeSet`, `NoNegativePairs`, or `InvalidProbe` if a probe
/// is not a non-edge of `g`.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)] // blocks group bit-equal scores
pub fn auc<P: LinkPredictor>(g: &Graph, probes: &ProbeSet, cache: &ScoreCache<P>) -> Result<f64> {
    if probes.is_empty() {
        return Err(ShieldError::EmptyProbeSet);
    }
    probes.check(g)?;
    let negatives = g.non_edges_count() - probes.len();
    if negatives == 0 {
        return Err(ShieldError::NoNegativePairs);
    }

    let ranking = cache.non_edges_ranking(g)?;
    let mut entries = ranking.entries().peekable();
    let mut negatives_left = negatives;
    let mut sum = 0.0;

    while let Some((first, score)) = entries.next() {
        let (mut block_probes, mut block_negatives) = (0_usize, 0_usize);
        let mut count = |is_probe: bool| {
            if is_probe {
                block_probes += 1;
            } else {
                block_negatives += 1;
            }
        };
        count(probes.contains(first));
        while let Some((e, _)) = entries.next_if(|&(_, s)| s == score) {
            count(probes.contains(e));
        }
        negatives_left -= block_negatives;
        sum += block_probes as f64 * (negatives_left as f64 + block_negatives as f64 / 2.0);
    }

    Ok(sum / (probes.len() as f64 * negatives as f64))
}
