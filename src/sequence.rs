use seq_io::fasta::{Reader, Record};
use std::io::BufReader;
use std::path::Path;

use crate::error::DesignError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn label(&self) -> &'static str {
        match self {
            Strand::Forward => "F",
            Strand::Reverse => "R",
        }
    }
}

pub struct SequenceRecord {
    pub name: String,
    pub sequence: String,
}

/// Immutable, upper-case A/C/G/T template a design session runs against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    sequence: String,
}

impl Template {
    pub fn new(raw: &str) -> Result<Self, DesignError> {
        let sequence = normalize(raw);
        if let Some((position, base)) = sequence
            .chars()
            .enumerate()
            .find(|(_, c)| !matches!(c, 'A' | 'C' | 'G' | 'T'))
        {
            return Err(DesignError::InvalidBase { position, base });
        }
        Ok(Template { sequence })
    }

    pub fn as_str(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.sequence[start..end]
    }

    /// All start positions of `needle`, overlapping matches included.
    pub fn find_all(&self, needle: &str) -> Vec<usize> {
        if needle.is_empty() || needle.len() > self.len() {
            return Vec::new();
        }
        let haystack = self.sequence.as_bytes();
        let needle = needle.as_bytes();
        haystack
            .windows(needle.len())
            .enumerate()
            .filter(|(_, window)| *window == needle)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Upper-cases, maps U to T and drops whitespace.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_ascii_uppercase() {
            'U' => 'T',
            other => other,
        })
        .collect()
}

pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

pub fn reverse_complement(sequence: &str) -> String {
    sequence
        .bytes()
        .rev()
        .map(|b| complement(b) as char)
        .collect()
}

pub fn gc_count(sequence: &str) -> usize {
    sequence
        .bytes()
        .filter(|b| matches!(b, b'G' | b'C'))
        .count()
}

pub fn at_count(sequence: &str) -> usize {
    sequence
        .bytes()
        .filter(|b| matches!(b, b'A' | b'T'))
        .count()
}

/// Bases outside ACGT.
pub fn count_ambiguous(sequence: &str) -> usize {
    sequence
        .bytes()
        .filter(|b| !matches!(b, b'A' | b'C' | b'G' | b'T'))
        .count()
}

fn to_records(src: &[u8]) -> Result<Vec<SequenceRecord>, DesignError> {
    let mut reader = Reader::new(BufReader::new(src));
    let mut records = Vec::new();

    while let Some(result) = reader.next() {
        let record = result.map_err(|e| DesignError::Fasta(e.to_string()))?;
        let name = record
            .id()
            .map_err(|e| DesignError::Fasta(e.to_string()))?
            .to_string();
        let sequence = normalize(&String::from_utf8_lossy(&record.full_seq()));
        records.push(SequenceRecord { name, sequence });
    }
    Ok(records)
}

/// Loads the first record of a FASTA file as the design template.
pub fn read_fasta_template<P: AsRef<Path>>(path: P) -> Result<(String, Template), DesignError> {
    let file = std::fs::read(path.as_ref())?;
    let records = to_records(&file)?;
    let first = records
        .into_iter()
        .next()
        .ok_or_else(|| DesignError::Fasta("No sequences found in the input file".to_string()))?;
    log::debug!(
        "template record: {} ({} bp)",
        first.name,
        first.sequence.len()
    );
    let template = Template::new(&first.sequence)?;
    Ok((first.name, template))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::proptest;

    #[test]
    fn test_reverse_complement() {
        let sequence = "ATCGAA";
        assert_eq!(reverse_complement(sequence), "TTCGAT");
    }

    #[test]
    fn test_template_normalizes_input() {
        let template = Template::new("acgu\nacgt ").unwrap();
        assert_eq!(template.as_str(), "ACGTACGT");
        assert_eq!(template.len(), 8);
    }

    #[test]
    fn test_template_rejects_ambiguous_bases() {
        match Template::new("ACGTNACGT") {
            Err(DesignError::InvalidBase { position, base }) => {
                assert_eq!(position, 4);
                assert_eq!(base, 'N');
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_find_all_includes_overlaps() {
        let template = Template::new("AAAACAAA").unwrap();
        assert_eq!(template.find_all("AAA"), vec![0, 1, 5]);
        assert!(template.find_all("").is_empty());
        assert!(template.find_all("AAAACAAAA").is_empty());
    }

    #[test]
    fn test_to_records_lowercase() {
        let fasta_data = b">seq1\naaccttggaaccttg\n>seq2\nAACCUUGG\n";
        let records = to_records(fasta_data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "seq1");
        assert_eq!(records[0].sequence, "AACCTTGGAACCTTG");
        assert_eq!(records[1].sequence, "AACCTTGG");
    }

    #[test]
    fn test_gc_and_at_counts() {
        assert_eq!(gc_count("GGCCAT"), 4);
        assert_eq!(at_count("GGCCAT"), 2);
        assert_eq!(count_ambiguous("ACGN"), 1);
        assert_eq!(count_ambiguous("RYACGTN"), 3);
        assert_eq!(count_ambiguous("ACGT"), 0);
    }

    proptest! {
        #[test]
        fn test_reverse_complement_is_involution(seq in "[ACGT]{0,60}") {
            assert_eq!(reverse_complement(&reverse_complement(&seq)), seq);
        }
    }
}
