pub(crate) use crate::constants::{
    DNA_CONC, DNTP_CONC, DV_CONC, MAX_RESULTS, MAX_TM_DIFF, MV_CONC, PRIMER_MAX_LEN,
    PRIMER_MAX_TM, PRIMER_MIN_LEN, PRIMER_MIN_TM, PRIMER_TARGET_TM, PRODUCT_MAX_SIZE,
    PRODUCT_MIN_SIZE, PRODUCT_TARGET_SIZE, PRODUCT_TOLERANCE, PROTECTIVE_BASE_COUNT, PRUNE_MARGIN,
    SELF_DIMER_PENALTY_WEIGHT, SELF_DIMER_THRESHOLD, TM_TOLERANCE, TOP_K,
};
use crate::error::DesignError;
use crate::sequence::{Strand, normalize};
use crate::thermo::IonConcentrations;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about=None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the template for ranked forward/reverse primer pairs.
    Design {
        #[command(flatten)]
        input: TemplateArgs,
        #[command(flatten)]
        design: DesignArgs,
        #[arg(short, long, help = "CSV output path, stdout when omitted")]
        output: Option<String>,
    },
    /// Find the best partner for one fixed primer.
    Complete {
        #[command(flatten)]
        input: TemplateArgs,
        #[command(flatten)]
        design: DesignArgs,
        #[arg(short, long)]
        primer: String,
        #[arg(
            long,
            default_value = "forward",
            value_parser = ["forward", "reverse"],
            help = "Strand the fixed primer belongs to."
        )]
        strand: String,
        #[arg(short, long, help = "CSV output path, stdout when omitted")]
        output: Option<String>,
    },
    /// Report every metric and warning for a single primer.
    Analyze {
        #[arg(short, long)]
        primer: String,
        #[command(flatten)]
        design: DesignArgs,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TemplateArgs {
    #[arg(short, long, help = "Template sequence given inline.")]
    pub template: Option<String>,

    #[arg(short, long, help = "FASTA file, the first record is used as template.")]
    pub fasta: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DesignArgs {
    #[arg(long, env = "MIN_LEN", default_value_t = PRIMER_MIN_LEN)]
    pub min_len: usize,
    #[arg(long, env = "MAX_LEN", default_value_t = PRIMER_MAX_LEN)]
    pub max_len: usize,
    #[arg(long, env = "MIN_TM", default_value_t = PRIMER_MIN_TM)]
    pub min_tm: f64,
    #[arg(long, env = "MAX_TM", default_value_t = PRIMER_MAX_TM)]
    pub max_tm: f64,
    #[arg(long, env = "TARGET_TM", default_value_t = PRIMER_TARGET_TM)]
    pub target_tm: f64,
    #[arg(long, env = "MIN_PRODUCT", default_value_t = PRODUCT_MIN_SIZE)]
    pub min_product: usize,
    #[arg(long, env = "MAX_PRODUCT", default_value_t = PRODUCT_MAX_SIZE)]
    pub max_product: usize,
    #[arg(long, env = "TARGET_PRODUCT", default_value_t = PRODUCT_TARGET_SIZE)]
    pub target_product: usize,
    #[arg(long, env = "MAX_TM_DIFF", default_value_t = MAX_TM_DIFF)]
    pub max_tm_diff: f64,
    #[arg(long, env = "MV_CONC", default_value_t = MV_CONC, help = "Monovalent cations, mM")]
    pub mv_conc: f64,
    #[arg(long, env = "DV_CONC", default_value_t = DV_CONC, help = "Divalent cations, mM")]
    pub dv_conc: f64,
    #[arg(long, env = "DNTP_CONC", default_value_t = DNTP_CONC, help = "dNTPs, mM")]
    pub dntp_conc: f64,
    #[arg(long, env = "DNA_CONC", default_value_t = DNA_CONC, help = "Primer, nM")]
    pub dna_conc: f64,

    #[arg(
        long,
        env = "REQUIRE_GC_CLAMP",
        default_value = "true",
        value_parser = ["true", "false"],
        help = "Only keep primers whose 3' base is G or C."
    )]
    pub require_gc_clamp: String,

    #[arg(
        long,
        env = "PENALIZE_SELF_COMPLEMENTARITY",
        default_value = "true",
        value_parser = ["true", "false"],
        help = "\
            Subtract self-complementarity runs while pairing and self-dimer \
            stability while ranking."
    )]
    pub penalize_self_complementarity: String,

    #[arg(long, env = "FORWARD_SITE", help = "Recognition sequence prepended to forward primers.")]
    pub forward_site: Option<String>,
    #[arg(long, env = "REVERSE_SITE", help = "Recognition sequence prepended to reverse primers.")]
    pub reverse_site: Option<String>,
    #[arg(long, env = "PROTECTIVE_BASES", default_value_t = PROTECTIVE_BASE_COUNT)]
    pub protective_bases: usize,

    #[arg(long, requires = "region_end", help = "Start of the region the product must span.")]
    pub region_start: Option<usize>,
    #[arg(
        long,
        requires = "region_start",
        help = "End (exclusive) of the region the product must span."
    )]
    pub region_end: Option<usize>,

    #[arg(long, env = "TOP_K", default_value_t = TOP_K)]
    pub top_k: usize,
    #[arg(long, env = "MAX_RESULTS", default_value_t = MAX_RESULTS)]
    pub max_results: usize,
    #[arg(
        long,
        env = "PRUNE_MARGIN",
        default_value_t = PRUNE_MARGIN,
        help = "Pairs scoring this far below the worst kept pair are skipped."
    )]
    pub prune_margin: f64,
    #[arg(long, env = "PRODUCT_TOLERANCE", default_value_t = PRODUCT_TOLERANCE)]
    pub product_tolerance: usize,
    #[arg(long, env = "TM_TOLERANCE", default_value_t = TM_TOLERANCE)]
    pub tm_tolerance: f64,
}

impl DesignArgs {
    pub fn to_config(&self) -> DesignConfig {
        DesignConfig {
            min_len: self.min_len,
            max_len: self.max_len,
            min_tm: self.min_tm,
            max_tm: self.max_tm,
            target_tm: self.target_tm,
            min_product: self.min_product,
            max_product: self.max_product,
            target_product: self.target_product,
            max_tm_diff: self.max_tm_diff,
            require_gc_clamp: self.require_gc_clamp.as_str() == "true",
            penalize_self_complementarity: self.penalize_self_complementarity.as_str() == "true",
            mv_conc: self.mv_conc,
            dv_conc: self.dv_conc,
            dntp_conc: self.dntp_conc,
            primer_conc: self.dna_conc,
            forward_site: self.forward_site.as_deref().map(normalize),
            reverse_site: self.reverse_site.as_deref().map(normalize),
            protective_base_count: self.protective_bases,
            forced_region: match (self.region_start, self.region_end) {
                (Some(start), Some(end)) => Some(ForcedRegion { start, end }),
                _ => None,
            },
            top_k: self.top_k,
            max_results: self.max_results,
            prune_margin: self.prune_margin,
            product_tolerance: self.product_tolerance,
            tm_tolerance: self.tm_tolerance,
            ..DesignConfig::default()
        }
    }
}

/// Template range `[start, end)` every product has to span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForcedRegion {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DesignConfig {
    pub min_len: usize,
    pub max_len: usize,
    pub min_tm: f64,
    pub max_tm: f64,
    pub target_tm: f64,
    pub min_product: usize,
    pub max_product: usize,
    pub target_product: usize,
    pub max_tm_diff: f64,
    pub require_gc_clamp: bool,
    pub penalize_self_complementarity: bool,
    /// mM
    pub mv_conc: f64,
    /// mM
    pub dv_conc: f64,
    /// mM
    pub dntp_conc: f64,
    /// nM
    pub primer_conc: f64,
    pub forward_site: Option<String>,
    pub reverse_site: Option<String>,
    pub protective_base_count: usize,
    pub forced_region: Option<ForcedRegion>,

    pub top_k: usize,
    pub max_results: usize,
    pub prune_margin: f64,
    pub self_dimer_threshold: f64,
    pub self_dimer_penalty_weight: f64,
    pub product_tolerance: usize,
    pub tm_tolerance: f64,
}

impl Default for DesignConfig {
    fn default() -> Self {
        DesignConfig {
            min_len: PRIMER_MIN_LEN,
            max_len: PRIMER_MAX_LEN,
            min_tm: PRIMER_MIN_TM,
            max_tm: PRIMER_MAX_TM,
            target_tm: PRIMER_TARGET_TM,
            min_product: PRODUCT_MIN_SIZE,
            max_product: PRODUCT_MAX_SIZE,
            target_product: PRODUCT_TARGET_SIZE,
            max_tm_diff: MAX_TM_DIFF,
            require_gc_clamp: true,
            penalize_self_complementarity: true,
            mv_conc: MV_CONC,
            dv_conc: DV_CONC,
            dntp_conc: DNTP_CONC,
            primer_conc: DNA_CONC,
            forward_site: None,
            reverse_site: None,
            protective_base_count: PROTECTIVE_BASE_COUNT,
            forced_region: None,
            top_k: TOP_K,
            max_results: MAX_RESULTS,
            prune_margin: PRUNE_MARGIN,
            self_dimer_threshold: SELF_DIMER_THRESHOLD,
            self_dimer_penalty_weight: SELF_DIMER_PENALTY_WEIGHT,
            product_tolerance: PRODUCT_TOLERANCE,
            tm_tolerance: TM_TOLERANCE,
        }
    }
}

impl DesignConfig {
    pub fn ions(&self) -> IonConcentrations {
        IonConcentrations {
            monovalent: self.mv_conc,
            divalent: self.dv_conc,
            dntp: self.dntp_conc,
            primer: self.primer_conc,
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.forced_region.is_some()
    }

    /// Product bounds, unbounded while a forced region decides validity.
    pub fn effective_product_bounds(&self) -> (usize, usize) {
        if self.is_constrained() {
            (0, usize::MAX)
        } else {
            (self.min_product, self.max_product)
        }
    }

    pub fn effective_max_tm_diff(&self) -> f64 {
        if self.is_constrained() {
            f64::INFINITY
        } else {
            self.max_tm_diff
        }
    }

    /// Recognition sequence for `strand`, `None` when unset or empty.
    pub fn site(&self, strand: Strand) -> Option<&str> {
        let site = match strand {
            Strand::Forward => self.forward_site.as_deref(),
            Strand::Reverse => self.reverse_site.as_deref(),
        };
        site.filter(|s| !s.is_empty())
    }

    pub fn validate(&self, template_len: usize) -> Result<(), DesignError> {
        if self.min_len == 0 || self.min_len > self.max_len {
            return Err(DesignError::InvalidConfig(format!(
                "primer length range {}..={} is empty",
                self.min_len, self.max_len
            )));
        }
        if self.min_tm > self.max_tm {
            return Err(DesignError::InvalidConfig(format!(
                "Tm range {:.1}..={:.1} is empty",
                self.min_tm, self.max_tm
            )));
        }
        if self.min_product > self.max_product {
            return Err(DesignError::InvalidConfig(format!(
                "product range {}..={} is empty",
                self.min_product, self.max_product
            )));
        }
        if self.top_k == 0 || self.max_results == 0 {
            return Err(DesignError::InvalidConfig(
                "top_k and max_results must be positive".to_string(),
            ));
        }
        for site in [&self.forward_site, &self.reverse_site].into_iter().flatten() {
            if let Some(base) = site.chars().find(|c| !matches!(c, 'A' | 'C' | 'G' | 'T')) {
                return Err(DesignError::InvalidConfig(format!(
                    "recognition sequence {} contains '{}'",
                    site, base
                )));
            }
        }
        if template_len < self.min_len {
            return Err(DesignError::TemplateTooShort {
                length: template_len,
                min_len: self.min_len,
            });
        }
        if let Some(region) = self.forced_region {
            if region.start >= region.end || region.end > template_len {
                return Err(DesignError::InvalidConfig(format!(
                    "forced region [{}, {}) does not fit a {} bp template",
                    region.start, region.end, template_len
                )));
            }
        }
        Ok(())
    }
}
