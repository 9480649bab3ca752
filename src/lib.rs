pub mod cancel;
pub mod complementarity;
pub mod config;
pub mod constants;
pub mod delta_g;
pub mod engine;
pub mod error;
pub mod filter;
pub mod missing_strand;
pub mod overhang;
pub mod pairing;
pub mod primer;
pub mod refine;
pub mod report;
pub mod sequence;
pub mod thermo;
pub mod thermo_table;

pub use cancel::{CancellationToken, DesignSession};
pub use config::DesignConfig;
pub use engine::{DesignReport, DesignStatus, SearchOutcome, design_primer_pairs};
pub use error::DesignError;
pub use missing_strand::{PartnerOutcome, find_missing_strand};
pub use primer::analyze_primer;
pub use sequence::Template;
