use async_trait::async_trait;

use crate::error::CatalogError;
use crate::types::SearchHit;

/// Nearest-neighbour lookup over catalog embeddings.
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Return up to `top_k` hits for `vector`, highest score first.
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, CatalogError>;
}
