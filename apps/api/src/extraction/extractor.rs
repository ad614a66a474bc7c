//! Skill extractor trait and the document-backed default.
//!
//! `AppState` holds an `Arc<dyn SkillExtractor>` so handlers can be tested
//! without real documents.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::catalog::SkillCatalog;

const PDF_MAGIC: &[u8] = b"%PDF";

#[async_trait]
pub trait SkillExtractor: Send + Sync {
    /// Returns the catalog skills found in an uploaded document.
    async fn extract(&self, document: Bytes) -> Result<Vec<String>, AppError>;
}

/// Reads PDFs with `pdf-extract` and anything else as UTF-8 text, then
/// matches the text against the catalog.
pub struct DocumentSkillExtractor {
    catalog: Arc<SkillCatalog>,
}

impl DocumentSkillExtractor {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl SkillExtractor for DocumentSkillExtractor {
    async fn extract(&self, document: Bytes) -> Result<Vec<String>, AppError> {
        if document.is_empty() {
            return Err(AppError::Validation("Uploaded document is empty".to_string()));
        }
        let size = document.len();

        let text = if document.starts_with(PDF_MAGIC) {
            tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&document)
                    .map_err(|e| AppError::Extraction(format!("Could not read PDF: {e:?}")))
            })
            .await
            .map_err(|e| AppError::Extraction(format!("PDF parsing aborted: {e}")))??
        } else {
            String::from_utf8(document.to_vec()).map_err(|_| {
                AppError::Extraction("Document is neither a PDF nor UTF-8 text".to_string())
            })?
        };

        let skills = self.catalog.extract(&text);
        debug!("Extracted {} skills from {} byte document", skills.len(), size);
        Ok(skills)
    }
}
