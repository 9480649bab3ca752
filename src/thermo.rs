#![allow(non_snake_case)]

//! Melting temperature and composition metrics for single oligos.
//!
//! Duplex stability uses the nearest-neighbor sums from [`crate::thermo_table`].
//! Salt effects follow Owczarzy et al. (2004) for monovalent cations and
//! Owczarzy et al. (2008) once free Mg2+ becomes significant; which one
//! applies is decided by [`SaltRegime::select`].

use itertools::Itertools;

use crate::constants::WALLACE_MAX_LEN;
use crate::sequence::{at_count, gc_count};
use crate::thermo_table::{KELVIN, NN_STACKS, R, nearest_neighbor, stack_id, terminal_initiation};

// Floors applied before any log or division (mM / nM).
const MIN_CONC_MM: f64 = 1e-3;
const MIN_PRIMER_NM: f64 = 1e-3;

const END_STABILITY_BASES: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IonConcentrations {
    /// mM
    pub monovalent: f64,
    /// mM
    pub divalent: f64,
    /// mM
    pub dntp: f64,
    /// nM
    pub primer: f64,
}

impl IonConcentrations {
    /// Mg2+ left over after dNTP chelation, mM.
    pub fn free_divalent(&self) -> f64 {
        (self.divalent - self.dntp).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaltRegime {
    /// Owczarzy 2004 monovalent correction.
    Monovalent,
    /// Owczarzy 2008 with monovalent-dependent coefficients.
    Mixed,
    /// Owczarzy 2008 with constant coefficients.
    DivalentDominated,
    /// No cations given: entropy-only salt term at 50 mM.
    EntropyOnly,
}

impl SaltRegime {
    pub fn select(ions: &IonConcentrations) -> SaltRegime {
        let free_div = ions.free_divalent();
        if free_div <= 0.0 {
            return if ions.monovalent > 0.0 {
                SaltRegime::Monovalent
            } else {
                SaltRegime::EntropyOnly
            };
        }
        let mono_M = ions.monovalent.max(MIN_CONC_MM) / 1000.0;
        let ratio = (free_div / 1000.0).sqrt() / mono_M;
        if ratio < 0.22 {
            SaltRegime::Monovalent
        } else if ratio < 6.0 {
            SaltRegime::Mixed
        } else {
            SaltRegime::DivalentDominated
        }
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Wallace rule, `2·(A+T) + 4·(G+C)`.
pub fn wallace_tm(sequence: &str) -> f64 {
    (2 * at_count(sequence) + 4 * gc_count(sequence)) as f64
}

/// Summed duplex enthalpy (kcal/mol) and entropy (cal/(K·mol)) including
/// terminal initiation. Steps touching a non-ACGT base contribute nothing.
///
/// Steps are tallied per stack before summing so a sequence and its reverse
/// complement produce bit-identical totals.
pub fn duplex_enthalpy_entropy(sequence: &str) -> (f64, f64) {
    let bytes = sequence.as_bytes();
    let mut stack_counts = [0usize; NN_STACKS.len()];
    for (a, b) in bytes.iter().tuple_windows() {
        if let Some(id) = stack_id(*a, *b) {
            stack_counts[id] += 1;
        }
    }

    let (mut dH, mut dS) = (0.0, 0.0);
    for (params, count) in NN_STACKS.iter().zip(stack_counts) {
        dH += params.dh * count as f64;
        dS += params.ds * count as f64;
    }

    let ends = match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => [*first, *last],
        _ => return (dH, dS),
    };
    let gc_ends = ends.iter().filter(|b| matches!(b, b'G' | b'C')).count();
    let at_ends = ends.iter().filter(|b| matches!(b, b'A' | b'T')).count();
    for (base, count) in [(b'G', gc_ends), (b'A', at_ends)] {
        if let Some(init) = terminal_initiation(base) {
            dH += init.dh * count as f64;
            dS += init.ds * count as f64;
        }
    }
    (dH, dS)
}

/// Owczarzy 2004: additive term on 1/Tm.
fn monovalent_correction(gc_fraction: f64, mono_M: f64) -> f64 {
    let ln_mono = mono_M.ln();
    (4.29 * gc_fraction - 3.95) * 1e-5 * ln_mono + 9.40e-6 * ln_mono.powi(2)
}

/// Owczarzy 2008: additive term on 1/Tm.
fn divalent_correction(gc_fraction: f64, len: usize, mono_M: f64, mg_M: f64, adjust: bool) -> f64 {
    let (mut a, b, c, mut d, e, f, mut g) = (3.92, -0.911, 6.26, 1.42, -48.2, 52.5, 8.31);
    if adjust {
        let ln_mono = mono_M.ln();
        a = 3.92 * (0.843 - 0.352 * mono_M.sqrt() * ln_mono);
        d = 1.42 * (1.279 - 4.03e-3 * ln_mono - 8.03e-3 * ln_mono.powi(2));
        g = 8.31 * (0.486 - 0.258 * ln_mono + 5.25e-3 * ln_mono.powi(3));
    }
    let ln_mg = mg_M.ln();
    let pairs = (len.max(2) - 1) as f64;
    (a + b * ln_mg
        + gc_fraction * (c + d * ln_mg)
        + (1.0 / (2.0 * pairs)) * (e + f * ln_mg + g * ln_mg.powi(2)))
        * 1e-5
}

/// Unrounded nearest-neighbor Tm in °C with salt correction.
pub fn nearest_neighbor_tm(sequence: &str, ions: &IonConcentrations) -> f64 {
    let len = sequence.len();
    if len == 0 {
        return 0.0;
    }
    let (dH, mut dS) = duplex_enthalpy_entropy(sequence);
    let gc_fraction = gc_count(sequence) as f64 / len as f64;
    let regime = SaltRegime::select(ions);

    if regime == SaltRegime::EntropyOnly {
        dS += 0.368 * (len.max(2) - 1) as f64 * 0.05_f64.ln();
    }

    let C_T = ions.primer.max(MIN_PRIMER_NM) * 1e-9;
    let tm_1M = (1000.0 * dH) / (dS + R * (C_T / 4.0).ln());

    let mono_M = ions.monovalent.max(MIN_CONC_MM) / 1000.0;
    let mg_M = ions.free_divalent().max(MIN_CONC_MM) / 1000.0;
    let inverse = match regime {
        SaltRegime::Monovalent => 1.0 / tm_1M + monovalent_correction(gc_fraction, mono_M),
        SaltRegime::Mixed => {
            1.0 / tm_1M + divalent_correction(gc_fraction, len, mono_M, mg_M, true)
        }
        SaltRegime::DivalentDominated => {
            1.0 / tm_1M + divalent_correction(gc_fraction, len, mono_M, mg_M, false)
        }
        SaltRegime::EntropyOnly => 1.0 / tm_1M,
    };
    1.0 / inverse - KELVIN
}

/// Tm in °C rounded to 0.1; Wallace rule below 14 nt.
pub fn melting_temp(sequence: &str, ions: &IonConcentrations) -> f64 {
    if sequence.len() <= WALLACE_MAX_LEN {
        return wallace_tm(sequence);
    }
    round1(nearest_neighbor_tm(sequence, ions))
}

pub fn gc_percent(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    round1(100.0 * gc_count(sequence) as f64 / sequence.len() as f64)
}

pub fn molecular_weight(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let mass: f64 = sequence
        .bytes()
        .map(|b| match b {
            b'A' => 331.2,
            b'T' => 322.2,
            b'G' => 347.2,
            b'C' => 307.2,
            _ => 326.9,
        })
        .sum();
    round1(mass - (sequence.len() - 1) as f64 * 18.0 + 79.0)
}

/// Summed stacking ΔG (kcal/mol) over the five 3'-terminal bases.
pub fn end_stability(sequence: &str) -> f64 {
    let bytes = sequence.as_bytes();
    let tail = &bytes[bytes.len().saturating_sub(END_STABILITY_BASES)..];
    tail.iter()
        .tuple_windows()
        .filter_map(|(a, b)| nearest_neighbor(*a, *b))
        .map(|p| p.dg)
        .sum()
}

pub fn has_gc_clamp(sequence: &str) -> bool {
    matches!(sequence.as_bytes().last(), Some(b'G') | Some(b'C'))
}
