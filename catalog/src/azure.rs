use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::CatalogError;
use crate::search::ProductSearch;
use crate::types::{Product, SearchHit};

/// REST API version of the Azure AI Search data and management planes.
pub const DEFAULT_API_VERSION: &str = "2024-07-01";

/// Name of the vector search profile attached to the embedding field.
pub const VECTOR_PROFILE: &str = "default-vector-profile";

const HNSW_CONFIG: &str = "default-hnsw-config";

/// AzureSearch is a client for one Azure AI Search index.
///
/// It covers what the matcher needs at query time (vector search) and what
/// setup needs to provision the index: creation, deletion and document
/// upload. Authentication uses an admin `api-key`.
pub struct AzureSearch {
    client: Client,
    endpoint: String,
    api_key: String,
    index_name: String,
    api_version: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    select: &'a str,
    top: usize,
    #[serde(rename = "vectorQueries")]
    vector_queries: [VectorQuery<'a>; 1],
}

#[derive(Serialize)]
struct VectorQuery<'a> {
    kind: &'a str,
    vector: &'a [f32],
    k: usize,
    fields: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchDocument>,
}

#[derive(Deserialize)]
struct SearchDocument {
    id: String,
    name: String,
    #[serde(rename = "@search.score")]
    score: f64,
}

#[derive(Serialize)]
struct IndexBatch<'a> {
    value: Vec<IndexAction<'a>>,
}

#[derive(Serialize)]
struct IndexAction<'a> {
    #[serde(rename = "@search.action")]
    action: &'a str,
    #[serde(flatten)]
    product: &'a Product,
}

#[derive(Deserialize)]
struct IndexBatchResponse {
    #[serde(default)]
    value: Vec<IndexingResult>,
}

#[derive(Deserialize)]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    value: Vec<Value>,
}

impl AzureSearch {
    pub fn new(endpoint: &str, api_key: &str, index_name: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            index_name: index_name.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}?api-version={}", self.endpoint, path, self.api_version)
    }

    fn index_url(&self) -> String {
        self.url(&format!("/indexes/{}", self.index_name))
    }

    fn docs_url(&self, op: &str) -> String {
        self.url(&format!("/indexes/{}/docs/{}", self.index_name, op))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
    }

    /// Nearest-neighbour search over the `embedding` field.
    pub async fn vector_search(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>, CatalogError> {
        tracing::debug!(top_k, index = %self.index_name, "vector search");
        let body = search_request(vector, top_k);
        let resp = self
            .request(Method::POST, &self.docs_url("search"))
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let parsed: SearchResponse = resp.json().await?;
        let hits = into_hits(parsed);
        for hit in &hits {
            tracing::debug!(product = %hit.product_name, score = hit.score, "search hit");
        }
        tracing::info!(count = hits.len(), "vector search returned results");
        Ok(hits)
    }

    /// Create the index with an HNSW vector field of `dimensions`.
    ///
    /// Returns false without touching anything when the index already
    /// exists.
    pub async fn create_index(&self, dimensions: usize) -> Result<bool, CatalogError> {
        let resp = self.request(Method::GET, &self.index_url()).send().await?;
        if resp.status().is_success() {
            tracing::info!(index = %self.index_name, "index already exists");
            return Ok(false);
        }
        if resp.status() != StatusCode::NOT_FOUND {
            check_status(resp).await?;
        }

        let definition = index_definition(&self.index_name, dimensions);
        let resp = self
            .request(Method::POST, &self.url("/indexes"))
            .json(&definition)
            .send()
            .await?;
        check_status(resp).await?;
        tracing::info!(index = %self.index_name, dimensions, "created index");
        Ok(true)
    }

    /// Upload (insert or replace) products. Returns how many succeeded.
    pub async fn upload_documents(&self, products: &[Product]) -> Result<usize, CatalogError> {
        if products.is_empty() {
            tracing::warn!("no documents to upload");
            return Ok(0);
        }

        tracing::info!(count = products.len(), index = %self.index_name, "uploading documents");
        let batch = IndexBatch {
            value: products
                .iter()
                .map(|product| IndexAction {
                    action: "upload",
                    product,
                })
                .collect(),
        };
        let resp = self
            .request(Method::POST, &self.docs_url("index"))
            .json(&batch)
            .send()
            .await?;
        // 207 means some documents failed; the body still lists each one.
        let resp = check_status(resp).await?;
        let parsed: IndexBatchResponse = resp.json().await?;
        Ok(count_succeeded(&parsed))
    }

    /// Delete the index. Returns false when it did not exist.
    pub async fn delete_index(&self) -> Result<bool, CatalogError> {
        let resp = self.request(Method::DELETE, &self.index_url()).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::info!(index = %self.index_name, "index does not exist");
            return Ok(false);
        }
        check_status(resp).await?;
        tracing::info!(index = %self.index_name, "deleted index");
        Ok(true)
    }

    /// List indexes to verify the endpoint and key. Returns the index count.
    pub async fn ping(&self) -> Result<usize, CatalogError> {
        let url = format!("{}&$select=name", self.url("/indexes"));
        let resp = self.request(Method::GET, &url).send().await?;
        let resp = check_status(resp).await?;
        let list: IndexList = resp.json().await?;
        Ok(list.value.len())
    }
}

#[async_trait]
impl ProductSearch for AzureSearch {
    async fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, CatalogError> {
        self.vector_search(vector, top_k).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CatalogError::Api {
        status: status.as_u16(),
        body,
    })
}

fn search_request(vector: &[f32], top_k: usize) -> SearchRequest<'_> {
    SearchRequest {
        select: "id,name",
        top: top_k,
        vector_queries: [VectorQuery {
            kind: "vector",
            vector,
            k: top_k,
            fields: "embedding",
        }],
    }
}

fn into_hits(resp: SearchResponse) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = resp
        .value
        .into_iter()
        .map(|d| SearchHit {
            product_id: d.id,
            product_name: d.name,
            score: d.score,
        })
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits
}

fn count_succeeded(resp: &IndexBatchResponse) -> usize {
    let mut succeeded = 0;
    for r in &resp.value {
        if r.status {
            succeeded += 1;
        } else {
            tracing::warn!(
                key = %r.key,
                error = r.error_message.as_deref().unwrap_or("unknown"),
                "document upload failed"
            );
        }
    }
    succeeded
}

fn index_definition(name: &str, dimensions: usize) -> Value {
    json!({
        "name": name,
        "fields": [
            {"name": "id", "type": "Edm.String", "key": true, "filterable": true},
            {"name": "name", "type": "Edm.String", "searchable": true, "filterable": true},
            {
                "name": "embedding",
                "type": "Collection(Edm.Single)",
                "searchable": true,
                "dimensions": dimensions,
                "vectorSearchProfile": VECTOR_PROFILE
            }
        ],
        "vectorSearch": {
            "profiles": [{"name": VECTOR_PROFILE, "algorithm": HNSW_CONFIG}],
            "algorithms": [{"name": HNSW_CONFIG, "kind": "hnsw"}]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let s = AzureSearch::new("https://shop.search.windows.net/", "key", "products-index");
        assert_eq!(
            s.docs_url("search"),
            "https://shop.search.windows.net/indexes/products-index/docs/search?api-version=2024-07-01"
        );
        assert_eq!(
            s.index_url(),
            "https://shop.search.windows.net/indexes/products-index?api-version=2024-07-01"
        );
        let s = s.with_api_version("2023-11-01");
        assert!(s.url("/indexes").ends_with("/indexes?api-version=2023-11-01"));
    }

    #[test]
    fn test_search_request_body() {
        let v = serde_json::to_value(search_request(&[0.5, -0.5], 3)).unwrap();
        assert_eq!(v["select"], "id,name");
        assert_eq!(v["top"], 3);
        let q = &v["vectorQueries"][0];
        assert_eq!(q["kind"], "vector");
        assert_eq!(q["k"], 3);
        assert_eq!(q["fields"], "embedding");
        assert_eq!(q["vector"], json!([0.5, -0.5]));
    }

    #[test]
    fn test_hits_sorted_by_score() {
        let resp: SearchResponse = serde_json::from_value(json!({
            "value": [
                {"@search.score": 0.71, "id": "2", "name": "Sheron ostřikovač eMotion 4L"},
                {"@search.score": 0.93, "id": "1", "name": "Castrol Magnatec 5W-30 A5 5L"}
            ]
        }))
        .unwrap();
        let hits = into_hits(resp);
        assert_eq!(hits[0].product_id, "1");
        assert_eq!(hits[1].product_name, "Sheron ostřikovač eMotion 4L");
        assert!((hits[1].score - 0.71).abs() < 1e-9);
    }

    #[test]
    fn test_upload_batch_shape() {
        let p = Product::new("1", "Castrol").unwrap().with_embedding(vec![0.1]);
        let batch = IndexBatch {
            value: vec![IndexAction {
                action: "upload",
                product: &p,
            }],
        };
        let v = serde_json::to_value(&batch).unwrap();
        assert_eq!(v["value"][0]["@search.action"], "upload");
        assert_eq!(v["value"][0]["id"], "1");
        assert_eq!(v["value"][0]["name"], "Castrol");
        assert!(v["value"][0]["embedding"].is_array());
    }

    #[test]
    fn test_count_succeeded() {
        let resp: IndexBatchResponse = serde_json::from_value(json!({
            "value": [
                {"key": "1", "status": true, "statusCode": 201},
                {"key": "2", "status": false, "errorMessage": "bad vector", "statusCode": 400},
                {"key": "3", "status": true, "statusCode": 200}
            ]
        }))
        .unwrap();
        assert_eq!(count_succeeded(&resp), 2);
    }

    #[test]
    fn test_index_definition() {
        let def = index_definition("products-index", 1536);
        assert_eq!(def["name"], "products-index");
        let fields = def["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0]["key"], true);
        assert_eq!(fields[2]["dimensions"], 1536);
        assert_eq!(fields[2]["vectorSearchProfile"], VECTOR_PROFILE);
        assert_eq!(def["vectorSearch"]["algorithms"][0]["kind"], "hnsw");
    }

    #[tokio::test]
    async fn test_upload_nothing_is_noop() {
        // Unroutable endpoint: any request would fail.
        let s = AzureSearch::new("http://127.0.0.1:9", "key", "idx");
        assert_eq!(s.upload_documents(&[]).await.unwrap(), 0);
    }
}
