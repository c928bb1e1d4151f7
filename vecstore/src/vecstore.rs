use crate::error::VecError;

/// A single hit from a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,

    /// Cosine distance to the query. Lower is closer.
    pub distance: f32,
}

impl Match {
    /// Similarity score in `[-1, 1]`, the complement of the distance.
    pub fn score(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Nearest-neighbour search over fixed-dimension float vectors.
///
/// Implementations must be safe for concurrent use.
pub trait VecIndex: Send + Sync {
    /// Dimension every stored and queried vector must have.
    fn dimension(&self) -> usize;

    /// Add or replace the vector for `id`.
    fn insert(&self, id: &str, vector: &[f32]) -> Result<(), VecError>;

    /// Add or replace several vectors. `ids` and `vectors` must align.
    fn batch_insert(&self, ids: &[&str], vectors: &[&[f32]]) -> Result<(), VecError>;

    /// Up to `top_k` closest vectors, closest first.
    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, VecError>;

    /// Remove `id`. Missing ids are not an error.
    fn delete(&self, id: &str) -> Result<(), VecError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
