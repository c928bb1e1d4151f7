use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Product is one catalog entry.
///
/// Serializes to the document shape stored in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    /// Display name; also the text that gets embedded.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Product {
    /// Create a product without an embedding. The name is trimmed and must
    /// not be empty.
    pub fn new(id: impl Into<String>, name: &str) -> Result<Self, CatalogError> {
        Self {
            id: id.into(),
            name: name.to_string(),
            embedding: None,
        }
        .validated()
    }

    /// Trim the name and reject entries with an empty id or name.
    pub fn validated(mut self) -> Result<Self, CatalogError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CatalogError::InvalidProduct(format!(
                "product {:?} has an empty name",
                self.id
            )));
        }
        if self.id.trim().is_empty() {
            return Err(CatalogError::InvalidProduct(format!(
                "product {:?} has an empty id",
                name
            )));
        }
        self.name = name.to_string();
        Ok(self)
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// SearchHit is one catalog entry returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub product_id: String,
    pub product_name: String,

    /// Similarity reported by the backend. Higher is closer.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_name() {
        let p = Product::new("1", "  Castrol Magnatec 5W-30 A5 5L ").unwrap();
        assert_eq!(p.name, "Castrol Magnatec 5W-30 A5 5L");
        assert!(p.embedding.is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(matches!(
            Product::new("1", "   "),
            Err(CatalogError::InvalidProduct(_))
        ));
        assert!(Product::new("", "Sheron").is_err());
    }

    #[test]
    fn test_document_shape() {
        let p = Product::new("7", "Eurol Syntence 0W-20 5L").unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, serde_json::json!({"id": "7", "name": "Eurol Syntence 0W-20 5L"}));

        let v = serde_json::to_value(p.with_embedding(vec![0.5, 0.25])).unwrap();
        assert_eq!(v["embedding"], serde_json::json!([0.5, 0.25]));
    }
}
