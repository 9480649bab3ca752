use itertools::Itertools;
use std::cmp::Ordering;

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::DesignConfig;
use crate::primer::FastCandidate;

/// A forward/reverse combination that passed the pairing bounds, by index
/// into the Phase 1 candidate lists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredPair {
    pub forward: usize,
    pub reverse: usize,
    pub product_size: usize,
    pub tm_difference: f64,
    pub score: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PairingStats {
    /// Pairs that passed every bound and were scored.
    pub scored: usize,
    /// Scored pairs skipped by the early-reject threshold.
    pub pruned: usize,
    /// Times the working list was cut back.
    pub truncations: usize,
}

/// Best first; equal scores keep their insertion order under a stable sort.
pub(crate) fn by_score_desc(a: &f64, b: &f64) -> Ordering {
    b.total_cmp(a)
}

/// Score computed without any pair-level thermodynamics.
pub fn cheap_score(
    forward: &FastCandidate,
    reverse: &FastCandidate,
    product_size: usize,
    tm_difference: f64,
    config: &DesignConfig,
) -> f64 {
    let mut score = 100.0
        - 3.0 * tm_difference
        - 1.5 * (config.target_tm - forward.tm).abs()
        - 1.5 * (config.target_tm - reverse.tm).abs()
        - 0.02 * (config.target_product as f64 - product_size as f64).abs()
        - 0.5 * (50.0 - forward.gc_percent).abs()
        - 0.5 * (50.0 - reverse.gc_percent).abs()
        - 3.0 * forward.hairpin_run_score as f64
        - 3.0 * reverse.hairpin_run_score as f64;
    if config.penalize_self_complementarity {
        score -= 2.0
            * (forward.self_complementarity_run + reverse.self_complementarity_run) as f64;
    }
    score
}

/// Phase 2: pairs every forward candidate with the reverse candidates whose
/// start falls in its admissible window, keeping the best `config.top_k`.
///
/// `reverse` must be sorted by `start`.
pub fn pair_candidates(
    forward: &[FastCandidate],
    reverse: &[FastCandidate],
    config: &DesignConfig,
    token: &CancellationToken,
) -> Result<(Vec<ScoredPair>, PairingStats), Cancelled> {
    let mut stats = PairingStats::default();
    let (min_reverse_len, max_reverse_len) =
        match reverse.iter().map(|r| r.length).minmax().into_option() {
            Some(bounds) => bounds,
            None => return Ok((Vec::new(), stats)),
        };

    let (min_product, max_product) = config.effective_product_bounds();
    let max_tm_diff = config.effective_max_tm_diff();
    let working_cap = config.top_k.saturating_mul(4);
    let keep_after_cut = config.top_k.saturating_mul(2);
    let mut working: Vec<ScoredPair> = Vec::new();
    let mut reject_below: Option<f64> = None;

    for (fi, f) in forward.iter().enumerate() {
        token.check()?;

        let (lower, upper) = match config.forced_region {
            Some(_) => (0, usize::MAX),
            None => (
                f.start.saturating_add(min_product).saturating_sub(max_reverse_len),
                (f.start.saturating_add(max_product)).saturating_sub(min_reverse_len),
            ),
        };

        let first = reverse.partition_point(|r| r.start < lower);
        for (ri, r) in reverse.iter().enumerate().skip(first) {
            if r.start > upper {
                break;
            }
            if r.end() <= f.start {
                continue;
            }
            let product_size = r.end() - f.start;
            match config.forced_region {
                Some(region) => {
                    if f.start > region.start || r.end() < region.end {
                        continue;
                    }
                }
                None => {
                    if product_size < min_product || product_size > max_product {
                        continue;
                    }
                }
            }
            let tm_difference = (f.tm - r.tm).abs();
            if tm_difference > max_tm_diff {
                continue;
            }

            let score = cheap_score(f, r, product_size, tm_difference, config);
            stats.scored += 1;
            if reject_below.is_some_and(|threshold| score < threshold - config.prune_margin) {
                stats.pruned += 1;
                continue;
            }
            working.push(ScoredPair {
                forward: fi,
                reverse: ri,
                product_size,
                tm_difference,
                score,
            });

            if working.len() > working_cap {
                working.sort_by(|a, b| by_score_desc(&a.score, &b.score));
                working.truncate(keep_after_cut);
                reject_below = working.last().map(|p| p.score);
                stats.truncations += 1;
                log::debug!(
                    "working list cut to {}, early-reject threshold {:.2}",
                    keep_after_cut,
                    reject_below.unwrap_or(f64::NEG_INFINITY) - config.prune_margin
                );
            }
        }
    }

    working.sort_by(|a, b| by_score_desc(&a.score, &b.score));
    working.truncate(config.top_k);
    Ok((working, stats))
}
