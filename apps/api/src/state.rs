use std::sync::Arc;

use crate::config::Config;
use crate::extraction::SkillExtractor;
use crate::matching::MatchingService;
use crate::report::Descriptions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Trained artifacts plus corpus index. Read-only; shared without locking.
    pub matcher: Arc<MatchingService>,
    /// Pluggable document extractor. Default: DocumentSkillExtractor.
    pub extractor: Arc<dyn SkillExtractor>,
    pub descriptions: Arc<Descriptions>,
}
