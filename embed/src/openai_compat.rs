use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::EmbedError;

/// How a request authenticates against the embeddings endpoint.
pub(crate) enum Auth<'a> {
    /// `Authorization: Bearer <key>` (OpenAI and compatible providers).
    Bearer(&'a str),
    /// `api-key: <key>` (Azure OpenAI).
    ApiKey(&'a str),
}

/// OpenAI-compatible embedding request body.
#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    dimensions: usize,
    encoding_format: &'a str,
}

/// OpenAI-compatible embedding response.
#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f64>,
}

/// Call an OpenAI-compatible embedding API endpoint.
///
/// OpenAI and Azure OpenAI share the request/response format. The only
/// differences are the URL layout and auth header (handled by the caller).
pub(crate) async fn call_embedding_api(
    client: &Client,
    url: &str,
    auth: Auth<'_>,
    model: &str,
    dimensions: usize,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let body = EmbeddingRequest {
        model,
        input: texts,
        dimensions,
        encoding_format: "float",
    };

    let request = client.post(url).header("Content-Type", "application/json");
    let request = match auth {
        Auth::Bearer(key) => request.header("Authorization", format!("Bearer {key}")),
        Auth::ApiKey(key) => request.header("api-key", key),
    };

    let resp = request
        .json(&body)
        .send()
        .await
        .map_err(|e| EmbedError::Api(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(EmbedError::Api(format!("HTTP {status}: {body}")));
    }

    let data: EmbeddingResponse = resp
        .json()
        .await
        .map_err(|e| EmbedError::Api(e.to_string()))?;

    order_by_index(data.data, texts.len())
}

/// Fill results by index (API may return out of order).
fn order_by_index(items: Vec<EmbeddingData>, batch_size: usize) -> Result<Vec<Vec<f32>>, EmbedError> {
    let mut vecs: Vec<Option<Vec<f32>>> = vec![None; batch_size];
    for item in items {
        if item.index >= batch_size {
            return Err(EmbedError::UnexpectedIndex {
                index: item.index,
                batch_size,
            });
        }
        vecs[item.index] = Some(item.embedding.iter().map(|&v| v as f32).collect());
    }

    // Verify all slots are filled.
    vecs.into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or(EmbedError::MissingIndex(i)))
        .collect()
}
