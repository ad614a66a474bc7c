// Skill extraction: catalog-driven exact matching over document text.
// PDF parsing is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod catalog;
pub mod extractor;
pub mod handlers;

use thiserror::Error;

pub use catalog::SkillCatalog;
pub use extractor::{DocumentSkillExtractor, SkillExtractor};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read skill catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid skill catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern for skill '{skill}': {source}")]
    Pattern {
        skill: String,
        #[source]
        source: regex::Error,
    },
}
