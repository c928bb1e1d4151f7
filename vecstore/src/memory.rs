use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::cosine::cosine_distance;
use crate::error::VecError;
use crate::vecstore::{Match, VecIndex};

/// In-memory [`VecIndex`] scanning every vector on each query.
///
/// Fine for catalogs of a few thousand products.
#[derive(Debug)]
pub struct MemoryIndex {
    dim: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
}

impl MemoryIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: RwLock::new(HashMap::new()),
        }
    }

    fn check_dim(&self, v: &[f32]) -> Result<(), VecError> {
        if v.len() != self.dim {
            return Err(VecError::DimensionMismatch {
                got: v.len(),
                want: self.dim,
            });
        }
        Ok(())
    }
}

impl VecIndex for MemoryIndex {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn insert(&self, id: &str, vector: &[f32]) -> Result<(), VecError> {
        self.check_dim(vector)?;
        let mut vecs = self.vectors.write().map_err(|_| VecError::Poisoned)?;
        vecs.insert(id.to_string(), vector.to_vec());
        Ok(())
    }

    fn batch_insert(&self, ids: &[&str], vectors: &[&[f32]]) -> Result<(), VecError> {
        if ids.len() != vectors.len() {
            return Err(VecError::BatchLengthMismatch {
                ids: ids.len(),
                vectors: vectors.len(),
            });
        }
        for v in vectors {
            self.check_dim(v)?;
        }
        let mut vecs = self.vectors.write().map_err(|_| VecError::Poisoned)?;
        for (id, vec) in ids.iter().zip(vectors) {
            vecs.insert(id.to_string(), vec.to_vec());
        }
        Ok(())
    }

    fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Match>, VecError> {
        self.check_dim(query)?;
        let vecs = self.vectors.read().map_err(|_| VecError::Poisoned)?;
        if top_k == 0 {
            return Ok(vec![]);
        }

        let mut results: Vec<Match> = vecs
            .iter()
            .map(|(id, vec)| Match {
                id: id.clone(),
                distance: cosine_distance(query, vec),
            })
            .collect();

        // Ties broken by id so results do not depend on hash order.
        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(top_k);
        Ok(results)
    }

    fn delete(&self, id: &str) -> Result<(), VecError> {
        let mut vecs = self.vectors.write().map_err(|_| VecError::Poisoned)?;
        vecs.remove(id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.vectors.read().map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_search() {
        let idx = MemoryIndex::new(4);
        idx.insert("castrol", &[1.0, 0.0, 0.0, 0.0]).unwrap();
        idx.insert("sheron", &[0.0, 1.0, 0.0, 0.0]).unwrap();
        idx.insert("eurol", &[0.9, 0.1, 0.0, 0.0]).unwrap();

        let matches = idx.search(&[1.0, 0.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "castrol");
        assert_eq!(matches[1].id, "eurol");
        assert!((matches[0].score() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_insert_replaces() {
        let idx = MemoryIndex::new(2);
        idx.insert("a", &[1.0, 0.0]).unwrap();
        idx.insert("a", &[0.0, 1.0]).unwrap();
        assert_eq!(idx.len(), 1);
        let m = idx.search(&[0.0, 1.0], 1).unwrap();
        assert!(m[0].distance.abs() < 1e-6);
    }

    #[test]
    fn test_ties_ordered_by_id() {
        let idx = MemoryIndex::new(2);
        idx.batch_insert(&["b", "a", "c"], &[&[1.0, 0.0], &[1.0, 0.0], &[1.0, 0.0]])
            .unwrap();
        let ids: Vec<_> = idx
            .search(&[1.0, 0.0], 3)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_batch_insert_mismatch() {
        let idx = MemoryIndex::new(2);
        assert!(matches!(
            idx.batch_insert(&["a", "b"], &[&[1.0, 0.0]]),
            Err(VecError::BatchLengthMismatch { ids: 2, vectors: 1 })
        ));
        assert!(idx.is_empty());
    }

    #[test]
    fn test_dimension_checked() {
        let idx = MemoryIndex::new(3);
        assert!(matches!(
            idx.insert("a", &[1.0, 0.0]),
            Err(VecError::DimensionMismatch { got: 2, want: 3 })
        ));
        assert!(idx.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_delete_and_empty_search() {
        let idx = MemoryIndex::new(2);
        assert!(idx.search(&[1.0, 0.0], 5).unwrap().is_empty());
        idx.insert("a", &[1.0, 0.0]).unwrap();
        idx.delete("a").unwrap();
        idx.delete("missing").unwrap();
        assert!(idx.is_empty());
        idx.insert("a", &[1.0, 0.0]).unwrap();
        assert!(idx.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }
}
