//! The three-phase primer-pair search.

use std::fmt;

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::DesignConfig;
use crate::error::DesignError;
use crate::filter::{TmSummary, generate_candidates, tm_summary};
use crate::pairing::pair_candidates;
use crate::primer::PrimerPairResult;
use crate::refine::refine_pairs;
use crate::sequence::{Strand, Template};

/// Why a search returned what it did. Every variant but `Found` comes with an
/// empty pair list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesignStatus {
    Found,
    NoForwardCandidates,
    NoReverseCandidates,
    NoPairsInBounds,
    NoPairsAfterRefinement,
}

impl fmt::Display for DesignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DesignStatus::Found => "primer pairs found",
            DesignStatus::NoForwardCandidates => {
                "no forward primer passes the Tm, GC and clamp filters"
            }
            DesignStatus::NoReverseCandidates => {
                "no reverse primer passes the Tm, GC and clamp filters"
            }
            DesignStatus::NoPairsInBounds => {
                "no primer pair satisfies the product size and Tm difference bounds"
            }
            DesignStatus::NoPairsAfterRefinement => {
                "no primer pair keeps its Tm difference once overhangs are added"
            }
        };
        write!(f, "{}", text)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchStats {
    pub forward_candidates: usize,
    pub reverse_candidates: usize,
    pub pairs_scored: usize,
    pub pairs_pruned: usize,
    pub pairs_refined: usize,
    pub pairs_dropped: usize,
    pub forward_tm: Option<TmSummary>,
    pub reverse_tm: Option<TmSummary>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DesignReport {
    /// Ranked best first, `rank` running from 1.
    pub pairs: Vec<PrimerPairResult>,
    pub status: DesignStatus,
    pub stats: SearchStats,
}

impl DesignReport {
    fn empty(status: DesignStatus, stats: SearchStats) -> Self {
        DesignReport {
            pairs: Vec::new(),
            status,
            stats,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    Completed(DesignReport),
    /// The token was cancelled; partial work is discarded.
    Cancelled,
}

/// Validates the inputs, then runs candidate generation, pairing and
/// refinement. An empty result is a `Completed` report, not an error.
pub fn design_primer_pairs(
    template: &Template,
    config: &DesignConfig,
    token: &CancellationToken,
) -> Result<SearchOutcome, DesignError> {
    config.validate(template.len())?;
    match run_phases(template, config, token) {
        Ok(report) => Ok(SearchOutcome::Completed(report)),
        Err(Cancelled) => {
            log::info!("search cancelled");
            Ok(SearchOutcome::Cancelled)
        }
    }
}

fn run_phases(
    template: &Template,
    config: &DesignConfig,
    token: &CancellationToken,
) -> Result<DesignReport, Cancelled> {
    let mut stats = SearchStats::default();
    log::info!("Searching {} bp template", template.len());

    let forward = generate_candidates(template, config, Strand::Forward, token)?;
    let reverse = generate_candidates(template, config, Strand::Reverse, token)?;
    stats.forward_candidates = forward.len();
    stats.reverse_candidates = reverse.len();
    stats.forward_tm = tm_summary(&forward);
    stats.reverse_tm = tm_summary(&reverse);
    log::info!(
        "Phase 1: {} forward, {} reverse candidates",
        forward.len(),
        reverse.len()
    );
    for (label, summary) in [("forward", stats.forward_tm), ("reverse", stats.reverse_tm)] {
        if let Some(tm) = summary {
            log::debug!("{} Tm {:.2} +/- {:.2}", label, tm.mean, tm.std);
        }
    }
    if forward.is_empty() {
        return Ok(DesignReport::empty(DesignStatus::NoForwardCandidates, stats));
    }
    if reverse.is_empty() {
        return Ok(DesignReport::empty(DesignStatus::NoReverseCandidates, stats));
    }

    let (pairs, pairing) = pair_candidates(&forward, &reverse, config, token)?;
    stats.pairs_scored = pairing.scored;
    stats.pairs_pruned = pairing.pruned;
    log::info!(
        "Phase 2: {} pairs scored, {} pruned, {} kept",
        pairing.scored,
        pairing.pruned,
        pairs.len()
    );
    if pairs.is_empty() {
        return Ok(DesignReport::empty(DesignStatus::NoPairsInBounds, stats));
    }

    let (results, refine) = refine_pairs(&pairs, &forward, &reverse, config, token)?;
    stats.pairs_refined = pairs.len();
    stats.pairs_dropped = refine.dropped;
    log::info!(
        "Phase 3: {} primers analysed, {} pairs returned",
        refine.refined_primers,
        results.len()
    );
    let status = if results.is_empty() {
        DesignStatus::NoPairsAfterRefinement
    } else {
        DesignStatus::Found
    };
    Ok(DesignReport {
        pairs: results,
        status,
        stats,
    })
}
