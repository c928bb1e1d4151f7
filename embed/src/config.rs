/// Builder-style configuration for embedder implementations.
///
/// Empty / zero fields fall back to the provider defaults.
#[derive(Debug, Clone, Default)]
pub struct EmbedConfig {
    /// Model name, or the deployment name on Azure.
    pub model: String,
    pub dimension: usize,
    pub base_url: String,
    /// Azure OpenAI API version; selects the Azure URL layout and auth header.
    pub api_version: Option<String>,
}

impl EmbedConfig {
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }
}
