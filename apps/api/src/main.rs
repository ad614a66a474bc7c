mod config;
mod corpus;
mod errors;
mod extraction;
mod matching;
mod report;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::extraction::{DocumentSkillExtractor, SkillCatalog};
use crate::matching::{AliasTable, MatchingService};
use crate::report::Descriptions;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillFit API v{}", env!("CARGO_PKG_VERSION"));

    // Alias table: built-in unless ALIAS_TABLE_PATH is set
    let aliases = match &config.alias_table_path {
        Some(path) => AliasTable::load(path)?,
        None => AliasTable::builtin().context("Built-in alias table is invalid")?,
    };
    info!("Alias table loaded ({} entries)", aliases.len());

    // Skill catalog for document extraction
    let catalog = SkillCatalog::load(&config.skill_catalog_path).with_context(|| {
        format!(
            "Failed to load skill catalog from {}",
            config.skill_catalog_path.display()
        )
    })?;

    // Training corpus
    let corpus = load_corpus(&config.corpus_path, &aliases).with_context(|| {
        format!("Failed to load corpus from {}", config.corpus_path.display())
    })?;

    // Train off the async runtime; the forest fit is CPU-bound
    let options = config.training_options();
    let matcher = tokio::task::spawn_blocking(move || {
        MatchingService::train(aliases, &corpus.records, &options)
    })
    .await
    .context("Training task panicked")??;
    let summary = matcher.summary();
    info!(
        "Model ready: {} labels, {} features, {} trees in {}ms",
        summary.labels, summary.vocabulary_size, summary.n_trees, summary.trained_in_ms
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        matcher: Arc::new(matcher),
        extractor: Arc::new(DocumentSkillExtractor::new(Arc::new(catalog))),
        descriptions: Arc::new(Descriptions::builtin().context("Built-in descriptions are invalid")?),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
