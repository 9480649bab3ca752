//! Completes a pair around one primer the user already has.

use crate::complementarity::{hairpin_run_score, self_complementarity_run};
use crate::config::DesignConfig;
use crate::constants::{GC_MAX_PERCENT, GC_MIN_PERCENT, PARTNER_MAX_LEN, PARTNER_MIN_LEN};
use crate::error::DesignError;
use crate::primer::PrimerMetrics;
use crate::sequence::{Strand, Template, normalize, reverse_complement};
use crate::thermo::{gc_percent, melting_temp};

#[derive(Clone, Debug, PartialEq)]
pub struct PartnerPrimer {
    pub sequence: String,
    /// Strand of the partner, opposite to the fixed primer.
    pub strand: Strand,
    pub start: usize,
    pub length: usize,
    pub tm: f64,
    pub gc_percent: f64,
    pub product_size: usize,
    pub score: f64,
    /// Template position of the fixed primer occurrence this partner pairs with.
    pub fixed_occurrence: usize,
    pub metrics: PrimerMetrics,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PartnerOutcome {
    Found(PartnerPrimer),
    /// The fixed primer does not bind anywhere on the template.
    PrimerAbsent,
    /// No partner met the Tm tolerance and GC bounds.
    NoSuitablePartner,
}

struct Best {
    score: f64,
    strand: Strand,
    sequence: String,
    start: usize,
    tm: f64,
    gc_percent: f64,
    product_size: usize,
    fixed_occurrence: usize,
}

/// Finds the best partner for `primer` over every place it binds.
///
/// A forward `primer` is matched literally and gets a reverse partner
/// downstream; a reverse `primer` is matched by its reverse complement and gets
/// a forward partner upstream. Products span `target_product ± product_tolerance`.
pub fn find_missing_strand(
    template: &Template,
    primer: &str,
    fixed_strand: Strand,
    config: &DesignConfig,
) -> Result<PartnerOutcome, DesignError> {
    let primer = normalize(primer);
    if primer.is_empty() {
        return Err(DesignError::EmptyPrimer);
    }
    let site = match fixed_strand {
        Strand::Forward => primer.clone(),
        Strand::Reverse => reverse_complement(&primer),
    };
    let occurrences = template.find_all(&site);
    if occurrences.is_empty() {
        log::info!("primer {} not found on the template", primer);
        return Ok(PartnerOutcome::PrimerAbsent);
    }
    log::info!(
        "primer {} binds at {} position(s): {:?}",
        primer,
        occurrences.len(),
        occurrences
    );

    let ions = config.ions();
    let min_product = config.target_product.saturating_sub(config.product_tolerance);
    let n = template.len();
    let max_product = config
        .target_product
        .saturating_add(config.product_tolerance)
        .min(n);
    let mut best: Option<Best> = None;

    for &occurrence in &occurrences {
        log::trace!("scanning partners for occurrence at {}", occurrence);
        for product_size in min_product..=max_product {
            for length in PARTNER_MIN_LEN..=PARTNER_MAX_LEN {
                let (start, strand, sequence) = match fixed_strand {
                    Strand::Forward => {
                        let end = occurrence.saturating_add(product_size);
                        if end > n || product_size < length {
                            continue;
                        }
                        let start = end - length;
                        (start, Strand::Reverse, reverse_complement(template.slice(start, end)))
                    }
                    Strand::Reverse => {
                        let end = occurrence + site.len();
                        if product_size > end || product_size < length {
                            continue;
                        }
                        let start = end - product_size;
                        (start, Strand::Forward, template.slice(start, start + length).to_string())
                    }
                };

                let tm = melting_temp(&sequence, &ions);
                let gc = gc_percent(&sequence);
                if (tm - config.target_tm).abs() > config.tm_tolerance
                    || !(GC_MIN_PERCENT..=GC_MAX_PERCENT).contains(&gc)
                {
                    continue;
                }
                let score = 100.0
                    - 3.0 * (tm - config.target_tm).abs()
                    - 0.1 * (product_size as f64 - config.target_product as f64).abs()
                    - 2.0 * self_complementarity_run(&sequence) as f64
                    - 3.0 * hairpin_run_score(&sequence) as f64;
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(Best {
                        score,
                        strand,
                        sequence,
                        start,
                        tm,
                        gc_percent: gc,
                        product_size,
                        fixed_occurrence: occurrence,
                    });
                }
            }
        }
    }

    Ok(match best {
        Some(best) => {
            log::info!(
                "best partner {} at {} (score {:.1}, product {} bp)",
                best.sequence,
                best.start,
                best.score,
                best.product_size
            );
            let metrics =
                PrimerMetrics::compute(&best.sequence, config, (PARTNER_MIN_LEN, PARTNER_MAX_LEN));
            PartnerOutcome::Found(PartnerPrimer {
                length: best.sequence.len(),
                sequence: best.sequence,
                strand: best.strand,
                start: best.start,
                tm: best.tm,
                gc_percent: best.gc_percent,
                product_size: best.product_size,
                score: best.score,
                fixed_occurrence: best.fixed_occurrence,
                metrics,
            })
        }
        None => {
            log::info!("no partner within {:.1} C of the target Tm", config.tm_tolerance);
            PartnerOutcome::NoSuitablePartner
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: &str = "AGCGTACGTTAGCCATGCAG";
    const SPACER: &str = concat!(
        "TATCAAGATGAGAAATTAAAGTAGAACCGAGGTAAAGATTAGAGTGCAAG",
        "GCATAGCAGAGATCGTTTGTTTAACAAGTGTTCTTGAAGTATATTACAGG",
    );
    const DOWNSTREAM: &str = concat!(
        "GGGTTAAGTAAGTGTGATGCATACGCCTTTACTTGCTGTGTCCACCCCAT",
        "CGGACTGGCATTTTTATTACACTCAGAAACAGAACTCGGGTAATTTTGAC",
    );
    const SCENARIO: &str = "ATGCGTACGTTAGCCATGCAGTCGATCGGATCCGTAGCTAGCATCGGCTAACGTTGCAGC";

    fn config(target_product: usize) -> DesignConfig {
        DesignConfig {
            target_product,
            product_tolerance: 10,
            ..DesignConfig::default()
        }
    }

    fn found(outcome: PartnerOutcome) -> PartnerPrimer {
        match outcome {
            PartnerOutcome::Found(partner) => partner,
            other => panic!("expected a partner, got {:?}", other),
        }
    }

    #[test]
    fn test_best_partner_comes_from_any_occurrence() {
        let first_only = Template::new(&format!("{}{}", FIXED, SPACER)).unwrap();
        let near =
            found(find_missing_strand(&first_only, FIXED, Strand::Forward, &config(60)).unwrap());
        assert_eq!(near.fixed_occurrence, 0);

        let template =
            Template::new(&format!("{}{}{}{}", FIXED, SPACER, FIXED, DOWNSTREAM)).unwrap();
        assert_eq!(template.find_all(FIXED), vec![0, 120]);
        let partner =
            found(find_missing_strand(&template, FIXED, Strand::Forward, &config(60)).unwrap());
        assert_eq!(partner.fixed_occurrence, 120);
        assert_eq!(partner.strand, Strand::Reverse);
        assert_eq!(partner.sequence, "ACACAGCAAGTAAAGGCGT");
        assert_eq!(partner.start, 162);
        assert_eq!(partner.length, 19);
        assert_eq!(partner.product_size, 61);
        assert!(partner.score > near.score);
    }

    #[test]
    fn test_reverse_primer_gets_forward_partner() {
        let template = Template::new(SCENARIO).unwrap();
        let fixed = reverse_complement(&SCENARIO[40..60]);
        let partner =
            found(find_missing_strand(&template, &fixed, Strand::Reverse, &config(40)).unwrap());
        assert_eq!(partner.strand, Strand::Forward);
        assert_eq!(partner.fixed_occurrence, 40);
        assert_eq!(&SCENARIO[partner.start..partner.start + partner.length], partner.sequence);
        assert_eq!(partner.start + partner.product_size, 60);
        assert!((partner.tm - 60.0).abs() <= 5.0);
        assert!((30.0..=70.0).contains(&partner.gc_percent));
    }

    #[test]
    fn test_absent_primer() {
        let template = Template::new(SCENARIO).unwrap();
        let outcome =
            find_missing_strand(&template, "TTTTTTTTTTTTTTTTTT", Strand::Forward, &config(40))
                .unwrap();
        assert_eq!(outcome, PartnerOutcome::PrimerAbsent);
    }

    #[test]
    fn test_no_partner_in_tm_window() {
        let template = Template::new(SCENARIO).unwrap();
        let config = DesignConfig {
            target_tm: 90.0,
            ..config(40)
        };
        let outcome =
            find_missing_strand(&template, &SCENARIO[..20], Strand::Forward, &config).unwrap();
        assert_eq!(outcome, PartnerOutcome::NoSuitablePartner);
    }

    #[test]
    fn test_huge_product_range_is_clamped_to_template() {
        let template = Template::new(SCENARIO).unwrap();
        let config = DesignConfig {
            target_product: usize::MAX,
            ..config(40)
        };
        let outcome =
            find_missing_strand(&template, &SCENARIO[..20], Strand::Forward, &config).unwrap();
        assert_eq!(outcome, PartnerOutcome::NoSuitablePartner);

        let wide = DesignConfig {
            product_tolerance: usize::MAX,
            ..self::config(40)
        };
        let partner =
            found(find_missing_strand(&template, &SCENARIO[..20], Strand::Forward, &wide).unwrap());
        assert!(partner.start + partner.length <= SCENARIO.len());
    }

    #[test]
    fn test_empty_primer() {
        let template = Template::new(SCENARIO).unwrap();
        assert!(matches!(
            find_missing_strand(&template, " \n", Strand::Forward, &config(40)),
            Err(DesignError::EmptyPrimer)
        ));
    }

    #[test]
    fn test_lowercase_primer_is_normalized() {
        let template = Template::new(SCENARIO).unwrap();
        let lower = SCENARIO[..20].to_lowercase();
        let outcome = find_missing_strand(&template, &lower, Strand::Forward, &config(40)).unwrap();
        assert_ne!(outcome, PartnerOutcome::PrimerAbsent);
    }
}
