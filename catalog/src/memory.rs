use std::collections::HashMap;

use async_trait::async_trait;
use shelfmatch_vecstore::{MemoryIndex, VecIndex};

use crate::error::CatalogError;
use crate::search::ProductSearch;
use crate::types::{Product, SearchHit};

/// MemoryCatalog searches embedded products held in process.
///
/// Scores are cosine similarity (`1 - distance`), so they are comparable
/// with the scores Azure AI Search reports for cosine HNSW fields.
#[derive(Debug)]
pub struct MemoryCatalog {
    names: HashMap<String, String>,
    index: MemoryIndex,
}

impl MemoryCatalog {
    pub fn new(dimension: usize) -> Self {
        Self {
            names: HashMap::new(),
            index: MemoryIndex::new(dimension),
        }
    }

    /// Build a catalog from products that already carry embeddings.
    pub fn from_products(dimension: usize, products: &[Product]) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(dimension);
        for p in products {
            catalog.insert(p)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, product: &Product) -> Result<(), CatalogError> {
        let embedding = product
            .embedding
            .as_deref()
            .ok_or_else(|| CatalogError::MissingEmbedding(product.id.clone()))?;
        self.index.insert(&product.id, embedding)?;
        self.names.insert(product.id.clone(), product.name.clone());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl ProductSearch for MemoryCatalog {
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, CatalogError> {
        let matches = self.index.search(vector, top_k)?;
        Ok(matches
            .into_iter()
            .filter_map(|m| {
                let name = self.names.get(&m.id)?;
                Some(SearchHit {
                    score: m.score() as f64,
                    product_name: name.clone(),
                    product_id: m.id,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, v: Vec<f32>) -> Product {
        Product::new(id, name).unwrap().with_embedding(v)
    }

    #[tokio::test]
    async fn test_search_descending_scores() {
        let catalog = MemoryCatalog::from_products(
            2,
            &[
                product("1", "Castrol Magnatec 5W-30 A5 5L", vec![1.0, 0.0]),
                product("2", "Sheron ostřikovač eMotion 4L", vec![0.0, 1.0]),
                product("3", "Castrol Magnatec 5W-40 4L", vec![0.8, 0.6]),
            ],
        )
        .unwrap();
        assert_eq!(catalog.len(), 3);

        let hits = catalog.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].product_id, "1");
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].product_name, "Castrol Magnatec 5W-40 4L");
        assert!((hits[1].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_missing_embedding_rejected() {
        let mut catalog = MemoryCatalog::new(2);
        let p = Product::new("9", "Eurol").unwrap();
        assert!(matches!(
            catalog.insert(&p),
            Err(CatalogError::MissingEmbedding(id)) if id == "9"
        ));
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_dimension_query() {
        let catalog = MemoryCatalog::from_products(2, &[product("1", "A", vec![1.0, 0.0])]).unwrap();
        assert!(matches!(
            catalog.search(&[1.0, 0.0, 0.0], 3).await,
            Err(CatalogError::Vector(_))
        ));
    }
}
