use thiserror::Error;

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("Template is {length} bp, shorter than the minimum primer length {min_len}")]
    TemplateTooShort { length: usize, min_len: usize },

    #[error("Invalid base '{base}' at template position {position}")]
    InvalidBase { position: usize, base: char },

    #[error("Primer sequence is empty")]
    EmptyPrimer,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read template: {0}")]
    Fasta(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}
