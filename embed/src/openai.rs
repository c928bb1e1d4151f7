use reqwest::Client;

use crate::config::EmbedConfig;
use crate::embed::Embedder;
use crate::error::EmbedError;
use crate::openai_compat::Auth;

/// OpenAI embedding models.
pub const MODEL_OPENAI_3_SMALL: &str = "text-embedding-3-small";
pub const MODEL_OPENAI_3_LARGE: &str = "text-embedding-3-large";
pub const MODEL_OPENAI_ADA_002: &str = "text-embedding-ada-002";

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MAX_BATCH: usize = 2048;
const AZURE_MAX_BATCH: usize = 16;
const OPENAI_DEFAULT_DIM: usize = 1536;

/// OpenAI embedder using the OpenAI embeddings API.
///
/// Also works with Azure OpenAI embedding deployments when the config
/// carries an API version, and with any OpenAI-compatible provider via
/// `EmbedConfig::with_base_url`.
pub struct OpenAI {
    client: Client,
    api_key: String,
    model: String,
    dim: usize,
    base_url: String,
    api_version: Option<String>,
}

impl OpenAI {
    pub fn new(api_key: &str) -> Self {
        Self::with_config(api_key, EmbedConfig::default())
    }

    pub fn with_config(api_key: &str, cfg: EmbedConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: if cfg.model.is_empty() {
                MODEL_OPENAI_3_SMALL.to_string()
            } else {
                cfg.model
            },
            dim: if cfg.dimension == 0 {
                OPENAI_DEFAULT_DIM
            } else {
                cfg.dimension
            },
            base_url: if cfg.base_url.is_empty() {
                OPENAI_BASE_URL.to_string()
            } else {
                cfg.base_url.trim_end_matches('/').to_string()
            },
            api_version: cfg.api_version,
        }
    }

    /// Azure OpenAI embedder for the given deployment.
    pub fn azure(endpoint: &str, api_key: &str, deployment: &str, api_version: &str) -> Self {
        Self::with_config(
            api_key,
            EmbedConfig::default()
                .with_base_url(endpoint)
                .with_model(deployment)
                .with_api_version(api_version),
        )
    }

    fn url(&self) -> String {
        match &self.api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/embeddings?api-version={}",
                self.base_url, self.model, version
            ),
            None => format!("{}/embeddings", self.base_url),
        }
    }

    fn max_batch(&self) -> usize {
        if self.api_version.is_some() {
            AZURE_MAX_BATCH
        } else {
            OPENAI_MAX_BATCH
        }
    }

    async fn call_api(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let auth = match self.api_version {
            Some(_) => Auth::ApiKey(&self.api_key),
            None => Auth::Bearer(&self.api_key),
        };
        crate::openai_compat::call_embedding_api(
            &self.client,
            &self.url(),
            auth,
            &self.model,
            self.dim,
            texts,
        )
        .await
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        let vecs = self.embed_batch(&[text]).await?;
        vecs.into_iter().next().ok_or(EmbedError::MissingIndex(0))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        // Dropping blank entries would shift every later vector onto the
        // wrong text, so reject the whole batch instead.
        let cleaned: Vec<&str> = texts.iter().map(|t| t.trim()).collect();
        if cleaned.iter().any(|t| t.is_empty()) {
            return Err(EmbedError::EmptyInput);
        }

        let max_batch = self.max_batch();
        let total = cleaned.len().div_ceil(max_batch);
        let mut result = Vec::with_capacity(cleaned.len());
        for (n, chunk) in cleaned.chunks(max_batch).enumerate() {
            tracing::debug!(batch = n + 1, total, size = chunk.len(), "embedding batch");
            let vecs = self.call_api(chunk).await?;
            result.extend(vecs);
        }
        Ok(result)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
