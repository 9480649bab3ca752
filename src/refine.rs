use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::cancel::{CancellationToken, Cancelled};
use crate::complementarity::hetero_dimer_run;
use crate::config::DesignConfig;
use crate::filter::{gene_specific_window, overhang_len};
use crate::overhang::{full_oligo, protective_bases};
use crate::pairing::{ScoredPair, by_score_desc};
use crate::primer::{CandidateKey, FastCandidate, PrimerPairResult, RefinedCandidate};
use crate::sequence::Strand;
use crate::thermo::melting_temp;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefineStats {
    /// Distinct primers that went through full analysis.
    pub refined_primers: usize,
    /// Pairs dropped because the full-oligo ΔTm broke `max_tm_diff`.
    pub dropped: usize,
}

/// Full analysis of each primer, computed once per candidate key.
struct RefinementCache<'a> {
    config: &'a DesignConfig,
    refined: HashMap<CandidateKey, RefinedCandidate>,
}

impl<'a> RefinementCache<'a> {
    fn new(config: &'a DesignConfig) -> Self {
        RefinementCache {
            config,
            refined: HashMap::new(),
        }
    }

    fn get(&mut self, fast: &FastCandidate) -> RefinedCandidate {
        match self.refined.entry(fast.key()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let overhang = overhang_len(self.config, fast.strand);
                let window = gene_specific_window(self.config, overhang);
                entry
                    .insert(RefinedCandidate::from_fast(fast, self.config, window))
                    .clone()
            }
        }
    }
}

/// Protective bases chosen for this gene-specific part, then the full oligo
/// and its Tm. `None` when the strand carries no recognition site.
fn synthesized_oligo(config: &DesignConfig, strand: Strand, gene: &str) -> Option<(String, f64)> {
    config.site(strand).map(|site| {
        let prefix = protective_bases(config.protective_base_count, site, gene);
        let oligo = full_oligo(&prefix, site, gene);
        let tm = melting_temp(&oligo, &config.ions());
        (oligo, tm)
    })
}

fn self_dimer_penalty(config: &DesignConfig, delta_g: f64) -> f64 {
    if delta_g < config.self_dimer_threshold {
        (config.self_dimer_threshold - delta_g) * config.self_dimer_penalty_weight
    } else {
        0.0
    }
}

/// Phase 3: pair-level checks and final ranking of the Phase 2 survivors.
pub fn refine_pairs(
    pairs: &[ScoredPair],
    forward: &[FastCandidate],
    reverse: &[FastCandidate],
    config: &DesignConfig,
    token: &CancellationToken,
) -> Result<(Vec<PrimerPairResult>, RefineStats), Cancelled> {
    let mut cache = RefinementCache::new(config);
    let mut stats = RefineStats::default();
    let mut results = Vec::with_capacity(pairs.len());

    for pair in pairs {
        token.check()?;
        let f = &forward[pair.forward];
        let r = &reverse[pair.reverse];
        let refined_f = cache.get(f);
        let refined_r = cache.get(r);

        let hetero = hetero_dimer_run(&f.sequence, &r.sequence);
        let mut score = pair.score - 2.0 * hetero as f64;
        if config.penalize_self_complementarity {
            score -= self_dimer_penalty(config, refined_f.metrics.self_dimer_delta_g);
            score -= self_dimer_penalty(config, refined_r.metrics.self_dimer_delta_g);
        }

        let forward_full = synthesized_oligo(config, Strand::Forward, &f.sequence);
        let reverse_full = synthesized_oligo(config, Strand::Reverse, &r.sequence);
        let has_overhang = forward_full.is_some() || reverse_full.is_some();
        let forward_tm = forward_full.as_ref().map_or(f.tm, |(_, tm)| *tm);
        let reverse_tm = reverse_full.as_ref().map_or(r.tm, |(_, tm)| *tm);
        let tm_difference = if has_overhang {
            (forward_tm - reverse_tm).abs()
        } else {
            pair.tm_difference
        };
        if tm_difference > config.effective_max_tm_diff() {
            log::trace!(
                "dropping {} / {}: full-oligo dTm {:.1}",
                f.sequence,
                r.sequence,
                tm_difference
            );
            stats.dropped += 1;
            continue;
        }

        let (forward_full_oligo, forward_full_tm) = forward_full.unzip();
        let (reverse_full_oligo, reverse_full_tm) = reverse_full.unzip();
        results.push(PrimerPairResult {
            rank: 0,
            forward: refined_f,
            reverse: refined_r,
            product_size: pair.product_size,
            tm_difference,
            score,
            hetero_dimer_run: hetero,
            forward_full_oligo,
            reverse_full_oligo,
            forward_full_tm,
            reverse_full_tm,
            has_overhang,
        });
    }
    stats.refined_primers = cache.refined.len();

    results.sort_by(|a, b| by_score_desc(&a.score, &b.score));
    results.truncate(config.max_results);
    for (i, result) in results.iter_mut().enumerate() {
        result.rank = i + 1;
    }
    Ok((results, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::reverse_complement;

    fn candidate(strand: Strand, sequence: &str, start: usize, tm: f64) -> FastCandidate {
        FastCandidate {
            strand,
            sequence: sequence.to_string(),
            start,
            length: sequence.len(),
            tm,
            tm_gene_specific: None,
            gc_percent: 50.0,
            has_gc_clamp: true,
            self_complementarity_run: 0,
            hairpin_run_score: 0,
        }
    }

    fn scored(forward: usize, reverse: usize, score: f64) -> ScoredPair {
        ScoredPair {
            forward,
            reverse,
            product_size: 150,
            tm_difference: 0.5,
            score,
        }
    }

    fn fixture() -> (Vec<FastCandidate>, Vec<FastCandidate>) {
        let forward = vec![
            candidate(Strand::Forward, "AGCGTACGTTAGCCATGCAG", 0, 60.0),
            candidate(Strand::Forward, "TTAGCCATGCAGTCGATCGG", 8, 60.5),
        ];
        let reverse = vec![candidate(
            Strand::Reverse,
            &reverse_complement("GATCCGTAGCTAGCATCGGC"),
            130,
            60.5,
        )];
        (forward, reverse)
    }

    #[test]
    fn test_ranks_are_contiguous_and_sorted() {
        let (forward, reverse) = fixture();
        let pairs = vec![scored(0, 0, 80.0), scored(1, 0, 90.0)];
        let (results, stats) = refine_pairs(
            &pairs,
            &forward,
            &reverse,
            &DesignConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(stats.refined_primers, 3);
        assert_eq!(stats.dropped, 0);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(
            results.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2]
        );
        for r in &results {
            assert!(!r.has_overhang);
            assert!(r.forward_full_oligo.is_none());
            assert_eq!(r.tm_difference, 0.5);
            assert!(r.score <= 90.0 - 2.0 * r.hetero_dimer_run as f64);
        }
    }

    #[test]
    fn test_result_cap() {
        let (forward, reverse) = fixture();
        let pairs = vec![scored(0, 0, 80.0), scored(1, 0, 90.0)];
        let config = DesignConfig {
            max_results: 1,
            ..DesignConfig::default()
        };
        let (results, _) =
            refine_pairs(&pairs, &forward, &reverse, &config, &CancellationToken::new()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rank, 1);
    }

    #[test]
    fn test_self_dimer_penalty() {
        let config = DesignConfig::default();
        assert_eq!(self_dimer_penalty(&config, -3.0), 0.0);
        assert_eq!(self_dimer_penalty(&config, -5.0), 0.0);
        assert!((self_dimer_penalty(&config, -7.5) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_overhang_pairs_report_full_oligos() {
        let (forward, reverse) = fixture();
        let config = DesignConfig {
            forward_site: Some("GAATTC".to_string()),
            reverse_site: Some("AAGCTT".to_string()),
            max_tm_diff: 100.0,
            ..DesignConfig::default()
        };
        let (results, _) = refine_pairs(
            &[scored(0, 0, 80.0)],
            &forward,
            &reverse,
            &config,
            &CancellationToken::new(),
        )
        .unwrap();
        let r = &results[0];
        assert!(r.has_overhang);
        let oligo = r.forward_full_oligo.as_deref().unwrap();
        assert_eq!(oligo.len(), 4 + 6 + 20);
        assert!(oligo.ends_with(&format!("GAATTC{}", forward[0].sequence)));
        assert!(r.reverse_full_oligo.as_deref().unwrap().contains("AAGCTT"));
        let expected = (r.forward_full_tm.unwrap() - r.reverse_full_tm.unwrap()).abs();
        assert_eq!(r.tm_difference, expected);
    }

    #[test]
    fn test_full_oligo_tm_gap_is_rechecked() {
        let (forward, reverse) = fixture();
        // only the forward primer grows, so its Tm pulls away from the reverse
        let config = DesignConfig {
            forward_site: Some("GCGGCCGC".to_string()),
            max_tm_diff: 0.1,
            ..DesignConfig::default()
        };
        let (results, stats) = refine_pairs(
            &[scored(0, 0, 80.0)],
            &forward,
            &reverse,
            &config,
            &CancellationToken::new(),
        )
        .unwrap();
        assert!(results.is_empty());
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_cancelled_refinement() {
        let (forward, reverse) = fixture();
        let token = CancellationToken::new();
        token.cancel();
        let result = refine_pairs(
            &[scored(0, 0, 80.0)],
            &forward,
            &reverse,
            &DesignConfig::default(),
            &token,
        );
        assert_eq!(result, Err(Cancelled));
    }
}
