use crate::complementarity::{all_paired_runs, hairpin_stems};
use crate::thermo_table::{DUPLEX_INITIATION_DG, hairpin_loop_penalty, nearest_neighbor};

/// Stacking ΔG (kcal/mol) of the `len - 1` steps starting at `start`, read 5'->3'.
fn stacking_dg(sequence: &[u8], start: usize, len: usize) -> f64 {
    sequence[start..start + len]
        .windows(2)
        .filter_map(|step| nearest_neighbor(step[0], step[1]))
        .map(|p| p.dg)
        .sum()
}

/// ΔG (kcal/mol) of the most stable hairpin with a 3..=12 nt loop, 0.0 when
/// no stem beats its loop penalty.
pub fn hairpin_delta_g(sequence: &str) -> f64 {
    let bytes = sequence.as_bytes();
    hairpin_stems(bytes)
        .iter()
        .map(|stem| {
            // 5' arm runs from the outermost pair down to the loop-closing pair
            let arm_start = stem.loop_start - stem.len;
            stacking_dg(bytes, arm_start, stem.len) + hairpin_loop_penalty(stem.loop_len)
        })
        .fold(0.0, f64::min)
}

/// ΔG (kcal/mol) of the most stable self-dimer run: a stretch of two or more
/// consecutive pairs, its stacking energy plus one duplex initiation.
pub fn self_dimer_delta_g(sequence: &str) -> f64 {
    let bytes = sequence.as_bytes();
    all_paired_runs(bytes, bytes)
        .filter(|run| run.len >= 2)
        .map(|run| stacking_dg(bytes, run.start, run.len) + DUPLEX_INITIATION_DG)
        .fold(0.0, f64::min)
}
