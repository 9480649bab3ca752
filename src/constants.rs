pub const PRIMER_MIN_LEN: usize = 18;
pub const PRIMER_MAX_LEN: usize = 25;
pub const PRIMER_MIN_TM: f64 = 55.0;
pub const PRIMER_MAX_TM: f64 = 65.0;
pub const PRIMER_TARGET_TM: f64 = 60.0;
pub const PRODUCT_MIN_SIZE: usize = 100;
pub const PRODUCT_MAX_SIZE: usize = 1000;
pub const PRODUCT_TARGET_SIZE: usize = 300;
pub const MAX_TM_DIFF: f64 = 5.0;
// Monovalent cation concentration (mM)
pub const MV_CONC: f64 = 50.0;
// Divalent cation concentration (mM)
pub const DV_CONC: f64 = 1.5;
// dNTP concentration (mM)
pub const DNTP_CONC: f64 = 0.2;
// Primer concentration (nM)
pub const DNA_CONC: f64 = 250.0;
pub const PROTECTIVE_BASE_COUNT: usize = 4;

// Search limits
pub const TOP_K: usize = 50;
pub const MAX_RESULTS: usize = 20;
pub const PRUNE_MARGIN: f64 = 20.0;

// Missing-strand finder
pub const PARTNER_MIN_LEN: usize = 18;
pub const PARTNER_MAX_LEN: usize = 25;
pub const PRODUCT_TOLERANCE: usize = 50;
pub const TM_TOLERANCE: f64 = 5.0;

// Hard GC window (%) for every candidate
pub const GC_MIN_PERCENT: f64 = 30.0;
pub const GC_MAX_PERCENT: f64 = 70.0;

// Self-dimer refinement (kcal/mol)
pub const SELF_DIMER_THRESHOLD: f64 = -5.0;
pub const SELF_DIMER_PENALTY_WEIGHT: f64 = 2.0;

// Warning thresholds
pub const WARN_SELF_COMPLEMENTARITY_RUN: usize = 4;
pub const WARN_HAIRPIN_DELTA_G: f64 = -2.0;
pub const WARN_SELF_DIMER_DELTA_G: f64 = -6.0;
pub const WARN_MONONUCLEOTIDE_RUN: usize = 4;
pub const WARN_DINUCLEOTIDE_REPEATS: usize = 4;

// Shortest gene-specific stretch left after subtracting an overhang
pub const MIN_GENE_SPECIFIC_LEN: usize = 8;
// Below this length Tm uses the Wallace rule
pub const WALLACE_MAX_LEN: usize = 13;
