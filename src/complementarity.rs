//! Base-pairing scans between oligos and within a single oligo.
//!
//! Two strands are compared antiparallel: the second strand is read 3' to 5'
//! and slid along the first one, which is the same as comparing the first
//! strand against the reverse complement of the second for identity.

pub fn is_complementary(a: u8, b: u8) -> bool {
    matches!(
        (a, b),
        (b'A', b'T') | (b'T', b'A') | (b'G', b'C') | (b'C', b'G')
    )
}

/// A run of consecutive complementary positions at one alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairedRun {
    /// Index in the first strand of the run's 5'-most base.
    pub start: usize,
    pub len: usize,
}

/// Every shift of `b` (read 3'->5') against `a`, `a.len() + b.len() - 1` in total.
fn shifts(a: &[u8], b: &[u8]) -> std::ops::RangeInclusive<isize> {
    -(b.len() as isize - 1)..=(a.len() as isize - 1)
}

/// Pairing state of each overlapping position at `shift`, as
/// `(index in a, complementary)`.
fn alignment<'a>(
    a: &'a [u8],
    b: &'a [u8],
    shift: isize,
) -> impl Iterator<Item = (usize, bool)> + 'a {
    let first = shift.max(0) as usize;
    let last = (b.len() as isize + shift).min(a.len() as isize).max(0) as usize;
    (first..last).map(move |i| {
        let j = (i as isize - shift) as usize;
        (i, is_complementary(a[i], b[b.len() - 1 - j]))
    })
}

/// Maximal complementary runs of `a` against `b` at one shift.
pub(crate) fn paired_runs(a: &[u8], b: &[u8], shift: isize) -> Vec<PairedRun> {
    let mut runs = Vec::new();
    let mut current: Option<PairedRun> = None;
    for (i, paired) in alignment(a, b, shift) {
        match (paired, current.as_mut()) {
            (true, Some(run)) => run.len += 1,
            (true, None) => current = Some(PairedRun { start: i, len: 1 }),
            (false, _) => {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
            }
        }
    }
    runs.extend(current);
    runs
}

/// Runs of `a` against `b` for every shift.
pub(crate) fn all_paired_runs<'a>(
    a: &'a [u8],
    b: &'a [u8],
) -> impl Iterator<Item = PairedRun> + 'a {
    shifts(a, b).flat_map(move |shift| paired_runs(a, b, shift))
}

fn longest_run(a: &[u8], b: &[u8]) -> usize {
    all_paired_runs(a, b).map(|run| run.len).max().unwrap_or(0)
}

/// Longest stretch of consecutive base pairs two copies of `sequence` can form.
pub fn self_complementarity_run(sequence: &str) -> usize {
    let bytes = sequence.as_bytes();
    longest_run(bytes, bytes)
}

/// Total paired positions at the best self-alignment, runs need not be contiguous.
pub fn any_complementarity(sequence: &str) -> usize {
    let bytes = sequence.as_bytes();
    shifts(bytes, bytes)
        .map(|shift| {
            alignment(bytes, bytes, shift)
                .filter(|(_, paired)| *paired)
                .count()
        })
        .max()
        .unwrap_or(0)
}

/// Longest consecutive complementary run between two different primers.
pub fn hetero_dimer_run(a: &str, b: &str) -> usize {
    longest_run(a.as_bytes(), b.as_bytes())
}

pub const HAIRPIN_MIN_LOOP: usize = 3;
pub const HAIRPIN_MAX_LOOP: usize = 12;
const HAIRPIN_MIN_FLANK: usize = 2;
const HAIRPIN_MIN_STEM: usize = 2;

/// A hairpin stem closing a loop of `loop_len` bases starting at `loop_start`.
/// Stem pair `p` joins `loop_start - 1 - p` with `loop_start + loop_len + p`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stem {
    pub loop_start: usize,
    pub loop_len: usize,
    pub len: usize,
}

/// Stems of at least two base pairs for every admissible loop position.
pub(crate) fn hairpin_stems(sequence: &[u8]) -> Vec<Stem> {
    let n = sequence.len();
    let mut stems = Vec::new();
    for loop_start in HAIRPIN_MIN_FLANK..n {
        for loop_len in HAIRPIN_MIN_LOOP..=HAIRPIN_MAX_LOOP {
            let loop_end = loop_start + loop_len;
            if loop_end + HAIRPIN_MIN_FLANK > n {
                break;
            }
            let len = (0..loop_start.min(n - loop_end))
                .take_while(|p| {
                    is_complementary(sequence[loop_start - 1 - p], sequence[loop_end + p])
                })
                .count();
            if len >= HAIRPIN_MIN_STEM {
                stems.push(Stem {
                    loop_start,
                    loop_len,
                    len,
                });
            }
        }
    }
    stems
}

/// Longest hairpin stem, 0 when no stem of two or more pairs exists.
pub fn hairpin_run_score(sequence: &str) -> usize {
    hairpin_stems(sequence.as_bytes())
        .iter()
        .map(|stem| stem.len)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::reverse_complement;

    use proptest::proptest;

    #[test]
    fn test_complementary_pairs() {
        assert!(is_complementary(b'A', b'T'));
        assert!(is_complementary(b'C', b'G'));
        assert!(!is_complementary(b'A', b'G'));
        assert!(!is_complementary(b'G', b'T'));
        assert!(!is_complementary(b'N', b'N'));
    }

    #[test]
    fn test_palindrome_pairs_fully() {
        // GAATTC is its own reverse complement
        assert_eq!(self_complementarity_run("GAATTC"), 6);
        assert_eq!(any_complementarity("GAATTC"), 6);
    }

    #[test]
    fn test_poly_a_has_no_self_pairs() {
        assert_eq!(self_complementarity_run("AAAAAAAAAA"), 0);
        assert_eq!(any_complementarity("AAAAAAAAAA"), 0);
    }

    #[test]
    fn test_any_complementarity_counts_gapped_pairs() {
        // ACGTTACGT against itself pairs in two blocks separated by the central T
        let seq = "ACGTTACGT";
        assert!(any_complementarity(seq) >= self_complementarity_run(seq));
    }

    #[test]
    fn test_paired_runs_split_on_mismatch() {
        let a = b"GGGAGGG";
        let b = b"CCCCCCC";
        let runs = paired_runs(a, b, 0);
        assert_eq!(
            runs,
            vec![PairedRun { start: 0, len: 3 }, PairedRun { start: 4, len: 3 }]
        );
    }

    #[test]
    fn test_hetero_dimer_run() {
        let a = "AAAAGGGGGG";
        let b = "CCCCCCTTTT";
        assert_eq!(hetero_dimer_run(a, &reverse_complement(a)), a.len());
        assert_eq!(hetero_dimer_run(a, b), 10);
        assert_eq!(hetero_dimer_run("AAAA", "AAAA"), 0);
    }

    #[test]
    fn test_hairpin_detects_stem() {
        // GGGGC stem, AAAA loop, GCCCC stem
        let seq = "TTGGGGCAAAAGCCCCTT";
        let score = hairpin_run_score(seq);
        assert!(score >= 5, "score={}", score);
    }

    #[test]
    fn test_hairpin_requires_flanks() {
        assert_eq!(hairpin_run_score("AAAAAAAAAAAA"), 0);
        assert!(hairpin_stems(b"GCAAATT").is_empty());
    }

    proptest! {
        #[test]
        fn test_any_complementarity_bounds_run(seq in "[ACGT]{1,30}") {
            let run = self_complementarity_run(&seq);
            assert!(run <= seq.len());
            assert!(any_complementarity(&seq) >= run);
        }

        #[test]
        fn test_hetero_dimer_run_is_symmetric(a in "[ACGT]{1,25}", b in "[ACGT]{1,25}") {
            assert_eq!(hetero_dimer_run(&a, &b), hetero_dimer_run(&b, &a));
        }
    }
}
