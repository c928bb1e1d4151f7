use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog: http error: {0}")]
    Http(String),

    #[error("catalog: search service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("catalog: invalid product: {0}")]
    InvalidProduct(String),

    #[error("catalog: product {0} has no embedding")]
    MissingEmbedding(String),

    #[error("catalog: embedding count mismatch: {products} products, {vectors} vectors")]
    EmbeddingCount { products: usize, vectors: usize },

    #[error("catalog: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog: json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog: embed error: {0}")]
    Embed(#[from] shelfmatch_embed::EmbedError),

    #[error("catalog: vector error: {0}")]
    Vector(#[from] shelfmatch_vecstore::VecError),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        CatalogError::Http(e.to_string())
    }
}
