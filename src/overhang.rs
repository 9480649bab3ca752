//! Protective 5' bases for primers carrying a restriction site.

use crate::sequence::gc_count;

/// Picks `count` protective bases so that `prefix + site + gene` has a GC
/// fraction as close as possible to `gene` alone. An empty `gene` targets 50%.
pub fn protective_bases(count: usize, site: &str, gene: &str) -> String {
    let total = (count + site.len() + gene.len()) as f64;
    let target = if gene.is_empty() {
        0.5
    } else {
        gc_count(gene) as f64 / gene.len() as f64
    };
    let ideal = target * total - (gc_count(site) + gc_count(gene)) as f64;
    let g_count = ideal.round().clamp(0.0, count as f64) as usize;
    interleave(g_count, count - g_count)
}

/// G and A alternate starting with G, the remainder trails.
fn interleave(g_count: usize, a_count: usize) -> String {
    let mut prefix = String::with_capacity(g_count + a_count);
    let (mut g, mut a) = (g_count, a_count);
    while g > 0 || a > 0 {
        if g > 0 {
            prefix.push('G');
            g -= 1;
        }
        if a > 0 {
            prefix.push('A');
            a -= 1;
        }
    }
    prefix
}

/// Synthesized oligo: protective bases, recognition site, gene-specific part.
pub fn full_oligo(prefix: &str, site: &str, gene: &str) -> String {
    let mut oligo = String::with_capacity(prefix.len() + site.len() + gene.len());
    oligo.push_str(prefix);
    oligo.push_str(site);
    oligo.push_str(gene);
    oligo
}
