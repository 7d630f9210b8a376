//! Service construction from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use leafcure_core::{LexicalOracle, LoadReport, RemedyService};
use leafcure_embed::{EmbeddingOracle, GeminiConfig, GeminiEmbedder};

use crate::config::{Config, OracleBackend};

/// Load the catalog and attach the configured oracle.
///
/// Fails on a missing API key for the embedding backend or an unusable
/// catalog. An embedding index that cannot be built yet is only a warning;
/// it is retried on the first semantic search.
pub async fn build_service(config: &Config) -> Result<(RemedyService, LoadReport)> {
    // Secret and client are checked before the catalog is touched
    let embedder = match config.oracle.backend {
        OracleBackend::Embedding => Some(embedding_client(config)?),
        _ => None,
    };

    let (service, report) = RemedyService::open(
        &config.catalog.path,
        config.load_options(),
        config.resolver_config(),
    )
    .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))?;

    let service = if let Some(embedder) = embedder {
        let oracle = EmbeddingOracle::new(Arc::new(embedder), service.catalog())
            .with_query_prefix(config.oracle.query_prefix.clone());

        match oracle.warm().await {
            Ok(records) => info!(records, "Embedding index ready"),
            Err(e) => warn!(error = %e, "Embedding index not built; will retry on first query"),
        }
        service.with_oracle(Arc::new(oracle))
    } else if config.oracle.backend == OracleBackend::Disabled {
        info!("Similarity oracle disabled; semantic strategy is skipped");
        service
    } else {
        let oracle = LexicalOracle::new(service.catalog())
            .with_min_score(config.oracle.lexical_min_score);
        service.with_oracle(Arc::new(oracle))
    };

    Ok((service, report))
}

fn embedding_client(config: &Config) -> Result<GeminiEmbedder> {
    let api_key = config.oracle.api_key()?;
    let mut gemini = GeminiConfig::new(&api_key)
        .with_model(&config.oracle.model)
        .with_timeout(config.oracle.request_timeout_secs);
    if let Some(endpoint) = &config.oracle.endpoint {
        gemini = gemini.with_endpoint(endpoint);
    }

    GeminiEmbedder::new(gemini).context("Failed to create embedding client")
}
