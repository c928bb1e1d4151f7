use std::path::Path;

use shelfmatch_embed::Embedder;

use crate::error::CatalogError;
use crate::types::Product;

/// Load a catalog from a JSON array of products.
///
/// Names are trimmed; an entry with an empty name or id fails the load.
pub fn load_products(path: impl AsRef<Path>) -> Result<Vec<Product>, CatalogError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "loading products");
    let data = std::fs::read(path)?;
    let raw: Vec<Product> = serde_json::from_slice(&data)?;
    let products = raw
        .into_iter()
        .map(Product::validated)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(count = products.len(), "loaded products");
    Ok(products)
}

/// Embed every product name in one batch call and attach the vectors.
pub async fn index_products(
    embedder: &dyn Embedder,
    products: Vec<Product>,
) -> Result<Vec<Product>, CatalogError> {
    if products.is_empty() {
        return Ok(products);
    }

    let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
    let vectors = embedder.embed_batch(&names).await?;
    if vectors.len() != products.len() {
        return Err(CatalogError::EmbeddingCount {
            products: products.len(),
            vectors: vectors.len(),
        });
    }

    tracing::info!(count = products.len(), "generated product embeddings");
    Ok(products
        .into_iter()
        .zip(vectors)
        .map(|(p, v)| p.with_embedding(v))
        .collect())
}
