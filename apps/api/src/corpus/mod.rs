// Training corpus: CSV rows of (Skills, Role, Domain), normalized at load time.
// Loaded once at startup; read-only afterwards.

pub mod loader;
pub mod skill_list;

use serde::Serialize;
use thiserror::Error;

pub use loader::{load_corpus, read_corpus};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Corpus is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Malformed corpus row {row}: {message}")]
    Format { row: usize, message: String },
}

/// One historical profile. `skills` keeps corpus order (and any repeats)
/// because the vectorizer sees it as a token sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRecord {
    pub skills: Vec<String>,
    pub role: String,
    pub domain: String,
}

/// Loaded corpus plus load-time bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub records: Vec<TrainingRecord>,
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub empty_skipped: usize,
}
