//! Helpers shared by the commands.

use std::sync::Arc;

use anyhow::Context;
use shelfmatch_catalog::{AzureSearch, MemoryCatalog, ProductSearch, index_products, load_products};
use shelfmatch_embed::{EmbedConfig, Embedder, OpenAI};
use shelfmatch_genx::openai::{OpenAIConfig, OpenAIGenerator};
use shelfmatch_matcher::ProductMatcher;

use crate::config::Config;

/// Chat generator for the configured Azure OpenAI deployment.
pub fn create_generator(cfg: &Config) -> OpenAIGenerator {
    let az = &cfg.azure_openai;
    OpenAIGenerator::new(OpenAIConfig::azure(
        &az.endpoint,
        &az.api_key,
        &az.deployment,
        &az.api_version,
    ))
}

/// Embedding client for the configured Azure OpenAI embedding deployment.
pub fn create_embedder(cfg: &Config) -> OpenAI {
    let az = &cfg.azure_openai;
    OpenAI::with_config(
        &az.api_key,
        EmbedConfig::default()
            .with_base_url(&az.endpoint)
            .with_model(&az.embedding_deployment)
            .with_dimension(cfg.embedding_dimensions)
            .with_api_version(&az.api_version),
    )
}

pub fn create_search(cfg: &Config) -> AzureSearch {
    let s = &cfg.azure_search;
    AzureSearch::new(&s.endpoint, &s.api_key, &s.index_name)
}

/// Validate the configuration and wire a matcher.
///
/// With `catalog`, products are loaded from that file, embedded and
/// searched in memory, so Azure AI Search is not needed.
pub async fn create_matcher(cfg: &Config, catalog: Option<&str>) -> anyhow::Result<ProductMatcher> {
    let embedder = Arc::new(create_embedder(cfg));
    let search: Arc<dyn ProductSearch> = match catalog {
        Some(path) => {
            cfg.validate_openai()?;
            Arc::new(load_memory_catalog(embedder.as_ref(), path).await?)
        }
        None => {
            cfg.validate()?;
            Arc::new(create_search(cfg))
        }
    };
    Ok(ProductMatcher::new(
        Arc::new(create_generator(cfg)),
        embedder,
        search,
        cfg.matcher.clone(),
    ))
}

/// Load, embed and index a product file for in-memory search.
pub async fn load_memory_catalog(
    embedder: &dyn Embedder,
    path: &str,
) -> anyhow::Result<MemoryCatalog> {
    let products = load_products(path).with_context(|| format!("failed to load catalog {path}"))?;
    let products = index_products(embedder, products).await?;
    let catalog = MemoryCatalog::from_products(embedder.dimension(), &products)?;
    print_info(&format!("Using in-memory catalog {path} ({} products)", catalog.len()));
    Ok(catalog)
}

pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m✗\x1b[0m {}", msg);
}

pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}
