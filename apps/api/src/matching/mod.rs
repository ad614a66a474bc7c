// Skill-to-role matching engine.
// Implements: skill normalization, TF-IDF vectorization, label space, random forest,
// top-N ranking, gap analysis, and the trained-artifact service that ties them together.
// Training is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod evaluation;
pub mod forest;
pub mod gap;
pub mod handlers;
pub mod labels;
pub mod normalizer;
pub mod ranker;
pub mod service;
pub mod trainer;
pub mod vectorizer;

use thiserror::Error;

pub use normalizer::AliasTable;
pub use service::MatchingService;
pub use trainer::TrainingOptions;

/// Failures raised by the matching engine.
///
/// Training-time variants are fatal at startup; `UnknownLabel` is the only
/// variant a well-formed inference request can trigger.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Unknown label: role '{role}' in domain '{domain}' was never seen in training")]
    UnknownLabel { role: String, domain: String },

    #[error("Label id {id} is out of range (label space has {len} labels)")]
    LabelOutOfRange { id: usize, len: usize },

    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Training needs at least 2 distinct (role, domain) labels, found {found}")]
    InsufficientLabels { found: usize },

    #[error("A forest needs at least one tree")]
    NoEstimators,

    #[error("Invalid alias table: {0}")]
    InvalidAliasTable(String),
}
