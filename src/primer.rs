use ngrams::Ngram;
use std::fmt;

use crate::complementarity::{any_complementarity, hairpin_run_score, self_complementarity_run};
use crate::config::DesignConfig;
use crate::constants::{
    GC_MAX_PERCENT, GC_MIN_PERCENT, WARN_DINUCLEOTIDE_REPEATS, WARN_HAIRPIN_DELTA_G,
    WARN_MONONUCLEOTIDE_RUN, WARN_SELF_COMPLEMENTARITY_RUN, WARN_SELF_DIMER_DELTA_G,
};
use crate::delta_g::{hairpin_delta_g, self_dimer_delta_g};
use crate::error::DesignError;
use crate::sequence::{Strand, count_ambiguous, normalize};
use crate::thermo::{end_stability, gc_percent, has_gc_clamp, melting_temp, molecular_weight};

/// Identity shared by the fast and refined views of one primer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey {
    pub strand: Strand,
    pub start: usize,
    pub length: usize,
}

/// Phase 1 view of a primer: only the metrics needed for pairing.
///
/// For reverse candidates `sequence` is the reverse complement of
/// `template[start..start + length]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FastCandidate {
    pub strand: Strand,
    pub sequence: String,
    pub start: usize,
    pub length: usize,
    /// Tm of the synthesized oligo, overhang included when one is configured.
    pub tm: f64,
    /// Tm of the gene-specific part alone, only set when an overhang exists.
    pub tm_gene_specific: Option<f64>,
    pub gc_percent: f64,
    pub has_gc_clamp: bool,
    pub self_complementarity_run: usize,
    pub hairpin_run_score: usize,
}

impl FastCandidate {
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            strand: self.strand,
            start: self.start,
            length: self.length,
        }
    }

    /// Exclusive end of the template window the primer binds.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PrimerWarning {
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    TmOutOfRange { tm: f64 },
    GcOutOfRange { gc_percent: f64 },
    NoGcClamp,
    HighSelfComplementarity { run: usize },
    StableHairpin { delta_g: f64 },
    StableSelfDimer { delta_g: f64 },
    MononucleotideRun { base: char, length: usize },
    DinucleotideRepeat { unit: String, repeats: usize },
    AmbiguousBases { count: usize },
}

impl fmt::Display for PrimerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimerWarning::TooShort { length, min } => {
                write!(f, "too short ({} nt < {} nt)", length, min)
            }
            PrimerWarning::TooLong { length, max } => {
                write!(f, "too long ({} nt > {} nt)", length, max)
            }
            PrimerWarning::TmOutOfRange { tm } => write!(f, "Tm {:.1} C out of range", tm),
            PrimerWarning::GcOutOfRange { gc_percent } => {
                write!(f, "GC {:.1}% out of range", gc_percent)
            }
            PrimerWarning::NoGcClamp => write!(f, "no 3' GC clamp"),
            PrimerWarning::HighSelfComplementarity { run } => {
                write!(f, "self-complementary run of {} bp", run)
            }
            PrimerWarning::StableHairpin { delta_g } => {
                write!(f, "stable hairpin (dG {:.2} kcal/mol)", delta_g)
            }
            PrimerWarning::StableSelfDimer { delta_g } => {
                write!(f, "stable self-dimer (dG {:.2} kcal/mol)", delta_g)
            }
            PrimerWarning::MononucleotideRun { base, length } => {
                write!(f, "run of {} {}", length, base)
            }
            PrimerWarning::DinucleotideRepeat { unit, repeats } => {
                write!(f, "{} repeated {} times", unit, repeats)
            }
            PrimerWarning::AmbiguousBases { count } => {
                write!(f, "{} ambiguous base(s) ignored by Tm", count)
            }
        }
    }
}

/// Every single-oligo metric plus the warnings derived from them.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimerMetrics {
    pub tm: f64,
    pub gc_percent: f64,
    pub molecular_weight: f64,
    pub has_gc_clamp: bool,
    pub self_complementarity_run: usize,
    pub hairpin_run_score: usize,
    pub end_stability: f64,
    pub self_dimer_delta_g: f64,
    pub hairpin_delta_g: f64,
    pub any_complementarity: usize,
    pub warnings: Vec<PrimerWarning>,
}

impl PrimerMetrics {
    /// `length_window` is the admissible length range for this oligo.
    pub fn compute(sequence: &str, config: &DesignConfig, length_window: (usize, usize)) -> Self {
        let mut metrics = PrimerMetrics {
            tm: melting_temp(sequence, &config.ions()),
            gc_percent: gc_percent(sequence),
            molecular_weight: molecular_weight(sequence),
            has_gc_clamp: has_gc_clamp(sequence),
            self_complementarity_run: self_complementarity_run(sequence),
            hairpin_run_score: hairpin_run_score(sequence),
            end_stability: end_stability(sequence),
            self_dimer_delta_g: self_dimer_delta_g(sequence),
            hairpin_delta_g: hairpin_delta_g(sequence),
            any_complementarity: any_complementarity(sequence),
            warnings: Vec::new(),
        };
        metrics.warnings = metrics.collect_warnings(sequence, config, length_window);
        metrics
    }

    fn collect_warnings(
        &self,
        sequence: &str,
        config: &DesignConfig,
        (min_len, max_len): (usize, usize),
    ) -> Vec<PrimerWarning> {
        let mut warnings = Vec::new();
        let length = sequence.len();
        if length < min_len {
            warnings.push(PrimerWarning::TooShort {
                length,
                min: min_len,
            });
        }
        if length > max_len {
            warnings.push(PrimerWarning::TooLong {
                length,
                max: max_len,
            });
        }
        if self.tm < config.min_tm || self.tm > config.max_tm {
            warnings.push(PrimerWarning::TmOutOfRange { tm: self.tm });
        }
        if self.gc_percent < GC_MIN_PERCENT || self.gc_percent > GC_MAX_PERCENT {
            warnings.push(PrimerWarning::GcOutOfRange {
                gc_percent: self.gc_percent,
            });
        }
        if !self.has_gc_clamp {
            warnings.push(PrimerWarning::NoGcClamp);
        }
        if self.self_complementarity_run >= WARN_SELF_COMPLEMENTARITY_RUN {
            warnings.push(PrimerWarning::HighSelfComplementarity {
                run: self.self_complementarity_run,
            });
        }
        if self.hairpin_delta_g < WARN_HAIRPIN_DELTA_G {
            warnings.push(PrimerWarning::StableHairpin {
                delta_g: self.hairpin_delta_g,
            });
        }
        if self.self_dimer_delta_g < WARN_SELF_DIMER_DELTA_G {
            warnings.push(PrimerWarning::StableSelfDimer {
                delta_g: self.self_dimer_delta_g,
            });
        }
        if let Some((base, length)) = longest_mononucleotide_run(sequence) {
            if length >= WARN_MONONUCLEOTIDE_RUN {
                warnings.push(PrimerWarning::MononucleotideRun { base, length });
            }
        }
        if let Some((unit, repeats)) = longest_dinucleotide_repeat(sequence) {
            if repeats >= WARN_DINUCLEOTIDE_REPEATS {
                warnings.push(PrimerWarning::DinucleotideRepeat { unit, repeats });
            }
        }
        let ambiguous = count_ambiguous(sequence);
        if ambiguous > 0 {
            warnings.push(PrimerWarning::AmbiguousBases { count: ambiguous });
        }
        warnings
    }
}

fn longest_mononucleotide_run(sequence: &str) -> Option<(char, usize)> {
    let mut best: Option<(char, usize)> = None;
    let mut runs = 0;
    let mut last_char = ' ';
    for c in sequence.chars() {
        if c == last_char {
            runs += 1;
        } else {
            runs = 1;
        }
        last_char = c;
        if best.is_none_or(|(_, length)| runs > length) {
            best = Some((c, runs));
        }
    }
    best
}

/**
 * Longest tandem repeat of a two-base unit, e.g. ATATATAT is AT four times.
 *
 * Homopolymer units (AA, CC, ...) are left to the mononucleotide check.
 */
fn longest_dinucleotide_repeat(sequence: &str) -> Option<(String, usize)> {
    if sequence.len() < 2 {
        return None;
    }
    let pairs: Vec<Vec<char>> = sequence.chars().ngrams(2).collect();
    let mut best: Option<(String, usize)> = None;
    for phase in 0..2 {
        let mut repeats = 0;
        let mut last_chunk: Option<&Vec<char>> = None;
        for chunk in pairs.iter().skip(phase).step_by(2) {
            if chunk[0] == chunk[1] {
                repeats = 0;
                last_chunk = None;
                continue;
            }
            if last_chunk == Some(chunk) {
                repeats += 1;
            } else {
                repeats = 1;
            }
            last_chunk = Some(chunk);
            if best.as_ref().is_none_or(|(_, count)| repeats > *count) {
                best = Some((chunk.iter().collect(), repeats));
            }
        }
    }
    best
}

/// Refined view of a primer: fast fields plus the expensive metrics computed
/// on the gene-specific sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct RefinedCandidate {
    pub strand: Strand,
    pub sequence: String,
    pub start: usize,
    pub length: usize,
    pub tm: f64,
    pub tm_gene_specific: Option<f64>,
    pub metrics: PrimerMetrics,
}

impl RefinedCandidate {
    pub fn from_fast(
        fast: &FastCandidate,
        config: &DesignConfig,
        length_window: (usize, usize),
    ) -> Self {
        RefinedCandidate {
            strand: fast.strand,
            sequence: fast.sequence.clone(),
            start: fast.start,
            length: fast.length,
            tm: fast.tm,
            tm_gene_specific: fast.tm_gene_specific,
            metrics: PrimerMetrics::compute(&fast.sequence, config, length_window),
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// One ranked forward/reverse pair.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimerPairResult {
    pub rank: usize,
    pub forward: RefinedCandidate,
    pub reverse: RefinedCandidate,
    /// `reverse.end() - forward.start`
    pub product_size: usize,
    /// Full-oligo ΔTm when overhangs are present.
    pub tm_difference: f64,
    pub score: f64,
    pub hetero_dimer_run: usize,
    pub forward_full_oligo: Option<String>,
    pub reverse_full_oligo: Option<String>,
    pub forward_full_tm: Option<f64>,
    pub reverse_full_tm: Option<f64>,
    pub has_overhang: bool,
}

/// Metrics and warnings for a user-supplied primer.
pub fn analyze_primer(sequence: &str, config: &DesignConfig) -> Result<PrimerMetrics, DesignError> {
    let sequence = normalize(sequence);
    if sequence.is_empty() {
        return Err(DesignError::EmptyPrimer);
    }
    let metrics = PrimerMetrics::compute(&sequence, config, (config.min_len, config.max_len));
    log::debug!(
        "analyzed {}: tm={:.1} gc={:.1} warnings={}",
        sequence,
        metrics.tm,
        metrics.gc_percent,
        metrics.warnings.len()
    );
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DesignConfig {
        DesignConfig::default()
    }

    #[test]
    fn test_clean_primer_has_no_warnings() {
        let metrics = analyze_primer("AGCGTACGTTAGCCATGCAG", &config()).unwrap();
        assert!(metrics.has_gc_clamp);
        assert_eq!(metrics.gc_percent, 55.0);
        assert!(
            !metrics
                .warnings
                .iter()
                .any(|w| matches!(
                    w,
                    PrimerWarning::GcOutOfRange { .. } | PrimerWarning::NoGcClamp
                )),
            "{:?}",
            metrics.warnings
        );
    }

    #[test]
    fn test_empty_primer_rejected() {
        assert!(matches!(
            analyze_primer("  ", &config()),
            Err(DesignError::EmptyPrimer)
        ));
    }

    #[test]
    fn test_short_at_rich_primer_warnings() {
        let metrics = analyze_primer("AAAATTTTAT", &config()).unwrap();
        let warnings = &metrics.warnings;
        assert!(warnings.contains(&PrimerWarning::TooShort { length: 10, min: 18 }));
        assert!(warnings.contains(&PrimerWarning::NoGcClamp));
        assert!(warnings.iter().any(|w| matches!(w, PrimerWarning::GcOutOfRange { .. })));
        assert!(warnings.iter().any(|w| matches!(w, PrimerWarning::TmOutOfRange { .. })));
        assert!(warnings.contains(&PrimerWarning::MononucleotideRun { base: 'A', length: 4 }));
    }

    #[test]
    fn test_ambiguous_bases_flagged() {
        let metrics = analyze_primer("AGCGTACGNTAGCCATGCAG", &config()).unwrap();
        assert!(metrics.warnings.contains(&PrimerWarning::AmbiguousBases { count: 1 }));
    }

    #[test]
    fn test_longest_mononucleotide_run() {
        assert_eq!(longest_mononucleotide_run("ACGGGGT"), Some(('G', 4)));
        assert_eq!(longest_mononucleotide_run(""), None);
    }

    #[test]
    fn test_longest_dinucleotide_repeat() {
        assert_eq!(
            longest_dinucleotide_repeat("GATATATATC"),
            Some(("AT".to_string(), 4))
        );
        assert_eq!(longest_dinucleotide_repeat("AAAAAA"), None);
        assert_eq!(longest_dinucleotide_repeat("A"), None);
    }

    #[test]
    fn test_dinucleotide_repeat_warning() {
        let metrics = analyze_primer("GCATATATATATGC", &config()).unwrap();
        assert!(
            metrics
                .warnings
                .iter()
                .any(|w| matches!(w, PrimerWarning::DinucleotideRepeat { .. })),
            "{:?}",
            metrics.warnings
        );
    }

    #[test]
    fn test_warning_display() {
        assert_eq!(PrimerWarning::NoGcClamp.to_string(), "no 3' GC clamp");
        assert_eq!(
            PrimerWarning::MononucleotideRun { base: 'T', length: 5 }.to_string(),
            "run of 5 T"
        );
    }
}
