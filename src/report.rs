use std::fs::File;
use std::io::{self, BufWriter, Write};

use itertools::Itertools;

use crate::error::DesignError;
use crate::missing_strand::PartnerPrimer;
use crate::primer::{PrimerPairResult, PrimerWarning};

/// CSV destination: the given file, or stdout when `path` is `None`.
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write>, DesignError> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn warnings_field(warnings: &[PrimerWarning]) -> String {
    warnings.iter().map(|w| w.to_string()).join("; ")
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{:.1}", v))
}

pub fn write_pairs<W: Write>(output: W, pairs: &[PrimerPairResult]) -> Result<(), DesignError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "rank",
        "forward",
        "forward_start",
        "forward_tm",
        "forward_gc",
        "reverse",
        "reverse_start",
        "reverse_tm",
        "reverse_gc",
        "product",
        "tm_diff",
        "score",
        "hetero_dimer",
        "forward_oligo",
        "forward_oligo_tm",
        "reverse_oligo",
        "reverse_oligo_tm",
        "forward_warnings",
        "reverse_warnings",
    ])?;
    for pair in pairs {
        writer.write_record([
            pair.rank.to_string(),
            pair.forward.sequence.clone(),
            pair.forward.start.to_string(),
            format!("{:.1}", pair.forward.tm),
            format!("{:.1}", pair.forward.metrics.gc_percent),
            pair.reverse.sequence.clone(),
            pair.reverse.start.to_string(),
            format!("{:.1}", pair.reverse.tm),
            format!("{:.1}", pair.reverse.metrics.gc_percent),
            pair.product_size.to_string(),
            format!("{:.1}", pair.tm_difference),
            format!("{:.2}", pair.score),
            pair.hetero_dimer_run.to_string(),
            pair.forward_full_oligo.clone().unwrap_or_default(),
            optional(pair.forward_full_tm),
            pair.reverse_full_oligo.clone().unwrap_or_default(),
            optional(pair.reverse_full_tm),
            warnings_field(&pair.forward.metrics.warnings),
            warnings_field(&pair.reverse.metrics.warnings),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_partner<W: Write>(output: W, partner: &PartnerPrimer) -> Result<(), DesignError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "direction",
        "primer",
        "start",
        "length",
        "tm",
        "gc",
        "product",
        "score",
        "fixed_at",
        "warnings",
    ])?;
    writer.write_record([
        partner.strand.label().to_string(),
        partner.sequence.clone(),
        partner.start.to_string(),
        partner.length.to_string(),
        format!("{:.1}", partner.tm),
        format!("{:.1}", partner.gc_percent),
        partner.product_size.to_string(),
        format!("{:.2}", partner.score),
        partner.fixed_occurrence.to_string(),
        warnings_field(&partner.metrics.warnings),
    ])?;
    writer.flush()?;
    Ok(())
}
