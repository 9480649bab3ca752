use std_dev::standard_deviation;

use crate::cancel::{CancellationToken, Cancelled};
use crate::complementarity::{hairpin_run_score, self_complementarity_run};
use crate::config::DesignConfig;
use crate::constants::{GC_MAX_PERCENT, GC_MIN_PERCENT, MIN_GENE_SPECIFIC_LEN};
use crate::overhang::{full_oligo, protective_bases};
use crate::primer::FastCandidate;
use crate::sequence::{Strand, Template, reverse_complement};
use crate::thermo::{IonConcentrations, gc_percent, has_gc_clamp, melting_temp};

/// 5' extension used while scanning: balanced protective bases plus the
/// recognition site. The final protective bases are picked per primer later.
pub fn overhang_proxy(config: &DesignConfig, strand: Strand) -> Option<String> {
    config.site(strand).map(|site| {
        let prefix = protective_bases(config.protective_base_count, site, "");
        full_oligo(&prefix, site, "")
    })
}

pub fn overhang_len(config: &DesignConfig, strand: Strand) -> usize {
    config
        .site(strand)
        .map_or(0, |site| config.protective_base_count + site.len())
}

/// Admissible gene-specific lengths once an overhang of `overhang_len` bases
/// is accounted for.
pub fn gene_specific_window(config: &DesignConfig, overhang_len: usize) -> (usize, usize) {
    if overhang_len == 0 {
        return (config.min_len, config.max_len);
    }
    let min = config
        .min_len
        .saturating_sub(overhang_len)
        .max(MIN_GENE_SPECIFIC_LEN);
    let max = config.max_len.saturating_sub(overhang_len).max(min);
    (min, max)
}

struct Scan<'a> {
    config: &'a DesignConfig,
    ions: IonConcentrations,
    strand: Strand,
    overhang: Option<String>,
}

impl Scan<'_> {
    /// Applies the hard Tm, GC and clamp filters; `None` when any fails.
    fn evaluate(&self, gene: String, start: usize) -> Option<FastCandidate> {
        let full = self.overhang.as_deref().map(|oh| full_oligo(oh, "", &gene));
        let oligo = full.as_deref().unwrap_or(&gene);

        let tm = melting_temp(oligo, &self.ions);
        if tm < self.config.min_tm || tm > self.config.max_tm {
            return None;
        }
        let gc = gc_percent(oligo);
        if !(GC_MIN_PERCENT..=GC_MAX_PERCENT).contains(&gc) {
            return None;
        }
        let clamp = has_gc_clamp(&gene);
        if self.config.require_gc_clamp && !clamp {
            return None;
        }

        let tm_gene_specific = full.as_ref().map(|_| melting_temp(&gene, &self.ions));
        Some(FastCandidate {
            strand: self.strand,
            start,
            length: gene.len(),
            tm,
            tm_gene_specific,
            gc_percent: gc,
            has_gc_clamp: clamp,
            self_complementarity_run: self_complementarity_run(&gene),
            hairpin_run_score: hairpin_run_score(&gene),
            sequence: gene,
        })
    }
}

/// Phase 1: every window of the template that passes the hard filters.
///
/// Forward candidates are template substrings; reverse candidates are reverse
/// complements and come back sorted by `start` for the pairing search.
pub fn generate_candidates(
    template: &Template,
    config: &DesignConfig,
    strand: Strand,
    token: &CancellationToken,
) -> Result<Vec<FastCandidate>, Cancelled> {
    let overhang = overhang_proxy(config, strand);
    let (min_len, max_len) = gene_specific_window(config, overhang.as_ref().map_or(0, |o| o.len()));
    log::debug!(
        "strand {}: gene-specific lengths {}..={}, overhang {:?}",
        strand.label(),
        min_len,
        max_len,
        overhang
    );
    let scan = Scan {
        config,
        ions: config.ions(),
        strand,
        overhang,
    };

    let n = template.len();
    let mut candidates = Vec::new();
    match strand {
        Strand::Forward => {
            for start in 0..n {
                token.check()?;
                for length in min_len..=max_len {
                    if start + length > n {
                        break;
                    }
                    let gene = template.slice(start, start + length).to_string();
                    candidates.extend(scan.evaluate(gene, start));
                }
            }
        }
        Strand::Reverse => {
            for end in 1..=n {
                token.check()?;
                for length in min_len..=max_len {
                    if length > end {
                        break;
                    }
                    let start = end - length;
                    let gene = reverse_complement(template.slice(start, end));
                    candidates.extend(scan.evaluate(gene, start));
                }
            }
            candidates.sort_by_key(|c| (c.start, c.length));
        }
    }
    Ok(candidates)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TmSummary {
    pub mean: f32,
    pub std: f32,
}

/// Mean and standard deviation of candidate Tm values.
pub fn tm_summary(candidates: &[FastCandidate]) -> Option<TmSummary> {
    if candidates.is_empty() {
        return None;
    }
    let tm_values: Vec<f32> = candidates.iter().map(|c| c.tm as f32).collect();
    let mean = tm_values.iter().sum::<f32>() / tm_values.len() as f32;
    let std = standard_deviation(&tm_values);
    Some(TmSummary {
        mean,
        std: std.standard_deviation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "ATGCGTACGTTAGCCATGCAGTCGATCGGATCCGTAGCTAGCATCGGCTAACGTTGCAGC";

    fn scenario_config() -> DesignConfig {
        DesignConfig {
            min_len: 18,
            max_len: 22,
            min_tm: 55.0,
            max_tm: 65.0,
            target_tm: 60.0,
            min_product: 30,
            max_product: 50,
            target_product: 40,
            max_tm_diff: 3.0,
            require_gc_clamp: true,
            ..DesignConfig::default()
        }
    }

    fn candidates(strand: Strand, config: &DesignConfig) -> Vec<FastCandidate> {
        let template = Template::new(TEMPLATE).unwrap();
        generate_candidates(&template, config, strand, &CancellationToken::new()).unwrap()
    }

    #[test]
    fn test_forward_candidates_respect_filters() {
        let config = scenario_config();
        let forward = candidates(Strand::Forward, &config);
        assert!(!forward.is_empty());
        for c in &forward {
            assert_eq!(c.strand, Strand::Forward);
            assert_eq!(&TEMPLATE[c.start..c.end()], c.sequence);
            assert!((18..=22).contains(&c.length));
            assert!(c.end() <= TEMPLATE.len());
            assert!(c.tm >= 55.0 && c.tm <= 65.0);
            assert!(c.gc_percent >= 30.0 && c.gc_percent <= 70.0);
            assert!(c.sequence.ends_with('G') || c.sequence.ends_with('C'));
            assert!(c.tm_gene_specific.is_none());
        }
    }

    #[test]
    fn test_reverse_candidates_are_sorted_reverse_complements() {
        let config = scenario_config();
        let reverse = candidates(Strand::Reverse, &config);
        assert!(!reverse.is_empty());
        for c in &reverse {
            assert_eq!(reverse_complement(&TEMPLATE[c.start..c.end()]), c.sequence);
            assert!(c.has_gc_clamp);
        }
        assert!(reverse.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn test_unreachable_tm_yields_nothing() {
        let config = DesignConfig {
            min_tm: 80.0,
            max_tm: 85.0,
            ..scenario_config()
        };
        assert!(candidates(Strand::Forward, &config).is_empty());
        assert!(candidates(Strand::Reverse, &config).is_empty());
    }

    #[test]
    fn test_gene_specific_window() {
        let config = scenario_config();
        assert_eq!(gene_specific_window(&config, 0), (18, 22));
        assert_eq!(gene_specific_window(&config, 10), (8, 12));
        assert_eq!(gene_specific_window(&config, 15), (8, 8));
    }

    #[test]
    fn test_overhang_candidates_carry_gene_specific_tm() {
        let config = DesignConfig {
            forward_site: Some("GAATTC".to_string()),
            protective_base_count: 2,
            min_tm: 40.0,
            max_tm: 80.0,
            ..scenario_config()
        };
        assert_eq!(overhang_proxy(&config, Strand::Forward).as_deref(), Some("GGGAATTC"));
        assert_eq!(overhang_len(&config, Strand::Forward), 8);
        assert_eq!(overhang_len(&config, Strand::Reverse), 0);
        let forward = candidates(Strand::Forward, &config);
        assert!(!forward.is_empty());
        for c in &forward {
            assert!((10..=14).contains(&c.length));
            assert!(c.tm_gene_specific.is_some());
        }
    }

    #[test]
    fn test_cancelled_scan_returns_early() {
        let template = Template::new(TEMPLATE).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result = generate_candidates(&template, &scenario_config(), Strand::Forward, &token);
        assert_eq!(result, Err(Cancelled));
    }

    #[test]
    fn test_tm_summary() {
        assert!(tm_summary(&[]).is_none());
        let forward = candidates(Strand::Forward, &scenario_config());
        let summary = tm_summary(&forward).unwrap();
        assert!(summary.mean >= 55.0 && summary.mean <= 65.0);
        assert!(summary.std >= 0.0);
    }
}
