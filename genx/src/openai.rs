//! OpenAI Generator implementation.
//!
//! This module provides a generator for the OpenAI Chat Completions API and
//! for Azure OpenAI deployments, which speak the same wire format behind a
//! different URL layout and auth header.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfmatch_genx::{Generator, ModelContextBuilder};
//! use shelfmatch_genx::openai::{OpenAIConfig, OpenAIGenerator};
//!
//! let generator = OpenAIGenerator::new(OpenAIConfig::azure(
//!     "https://my-resource.openai.azure.com",
//!     "key",
//!     "gpt-4o",
//!     "2024-08-01-preview",
//! ));
//!
//! let mut builder = ModelContextBuilder::new();
//! builder.prompt_text("system", "You are helpful.");
//! builder.user_text("user", "Hello!");
//!
//! let ctx = builder.build();
//! let (usage, reply) = generator.generate(&ctx).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::{ModelContext, ModelContextBuilder, ModelParams};
use crate::error::{GenxError, Usage};
use crate::types::{FuncCall, Payload, Reply, Role, ToolCall};
use crate::Generator;

/// OpenAI Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    /// For Azure this is the resource endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name, or the deployment name on Azure
    pub model: String,
    /// Azure OpenAI API version. When set, requests use the Azure URL
    /// layout and `api-key` header.
    #[serde(default)]
    pub api_version: Option<String>,
    /// Whether to use "system" role (true) or "developer" role (false)
    #[serde(default = "default_use_system_role")]
    pub use_system_role: bool,
    /// Default generation parameters
    #[serde(default)]
    pub generate_params: Option<ModelParams>,
    /// Extra fields to include in API requests
    #[serde(default)]
    pub extra_fields: Option<HashMap<String, Value>>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_use_system_role() -> bool {
    true
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: "gpt-4o".to_string(),
            api_version: None,
            use_system_role: true,
            generate_params: None,
            extra_fields: None,
        }
    }
}

impl OpenAIConfig {
    /// Configuration for an Azure OpenAI chat deployment.
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            model: deployment.into(),
            api_version: Some(api_version.into()),
            ..Default::default()
        }
    }

    /// Returns true if this targets an Azure OpenAI deployment.
    pub fn is_azure(&self) -> bool {
        self.api_version.is_some()
    }
}

/// OpenAI Generator.
///
/// Supports the OpenAI Chat Completions API and compatible endpoints.
pub struct OpenAIGenerator {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGenerator {
    /// Create a new OpenAI generator.
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Send a minimal request to verify endpoint and credentials.
    pub async fn ping(&self) -> Result<Usage, GenxError> {
        let mut builder = ModelContextBuilder::new();
        builder.user_text("user", "Hello");
        builder.set_params(ModelParams::new().with_max_tokens(10));
        let ctx = builder.build();
        let (usage, _) = self.generate(&ctx).await?;
        Ok(usage)
    }

    fn chat_url(&self) -> String {
        match &self.config.api_version {
            Some(version) => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.config.base_url, self.config.model, version
            ),
            None => format!("{}/chat/completions", self.config.base_url),
        }
    }

    /// Convert model context to OpenAI messages format.
    fn convert_messages(&self, ctx: &dyn ModelContext) -> Vec<Value> {
        let mut messages = Vec::new();

        // Add prompts as system messages
        for prompt in ctx.prompts() {
            let role = if self.config.use_system_role {
                "system"
            } else {
                "developer"
            };
            messages.push(json!({
                "role": role,
                "content": prompt.text,
            }));
        }

        // Add conversation messages
        for msg in ctx.messages() {
            match &msg.payload {
                Payload::Text(text) => {
                    let role = match msg.role {
                        Role::User => "user",
                        Role::Model => "assistant",
                        Role::Tool => continue,
                    };
                    messages.push(json!({
                        "role": role,
                        "content": text,
                    }));
                }
                Payload::ToolCall(tc) => {
                    messages.push(json!({
                        "role": "assistant",
                        "content": Value::Null,
                        "tool_calls": [{
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.func_call.name,
                                "arguments": tc.func_call.arguments,
                            }
                        }]
                    }));
                }
                Payload::ToolResult(tr) => {
                    messages.push(json!({
                        "role": "tool",
                        "tool_call_id": tr.id,
                        "content": tr.result,
                    }));
                }
            }
        }

        messages
    }

    /// Convert tools to OpenAI format.
    fn convert_tools(&self, ctx: &dyn ModelContext) -> Vec<Value> {
        ctx.tools()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.schema(),
                    }
                })
            })
            .collect()
    }

    /// Build request body.
    fn build_request(&self, ctx: &dyn ModelContext) -> Value {
        let messages = self.convert_messages(ctx);
        let params = ctx.params().or(self.config.generate_params.as_ref());

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });

        let tools = self.convert_tools(ctx);
        if !tools.is_empty() {
            body["tools"] = json!(tools);
            body["tool_choice"] = json!("auto");
        }

        if let Some(p) = params {
            if let Some(max) = p.max_tokens {
                // Azure API versions before 2024-09 only accept max_tokens.
                let key = if self.config.is_azure() {
                    "max_tokens"
                } else {
                    "max_completion_tokens"
                };
                body[key] = json!(max);
            }
            if let Some(temp) = p.temperature {
                body["temperature"] = json!(temp);
            }
        }

        // Merge extra fields (provider-specific extensions)
        if let Some(ref extra) = self.config.extra_fields {
            for (key, value) in extra {
                body[key] = value.clone();
            }
        }

        body
    }

    /// Parse usage from OpenAI response.
    fn parse_usage(json: &Value) -> Usage {
        let usage = &json["usage"];
        if usage.is_null() {
            return Usage::default();
        }

        Usage {
            prompt_token_count: usage["prompt_tokens"].as_i64().unwrap_or(0),
            cached_content_token_count: usage["prompt_tokens_details"]["cached_tokens"]
                .as_i64()
                .unwrap_or(0),
            generated_token_count: usage["completion_tokens"].as_i64().unwrap_or(0),
        }
    }

    /// Decode the first choice of a chat completion into a [`Reply`].
    fn parse_reply(json: &Value, usage: &Usage) -> Result<Reply, GenxError> {
        let choice = json["choices"]
            .as_array()
            .and_then(|arr| arr.first())
            .ok_or_else(|| GenxError::Generation {
                usage: usage.clone(),
                message: "no choices in response".to_string(),
            })?;
        let message = &choice["message"];

        let tool_calls: Vec<ToolCall> = message["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| {
                        ToolCall::new(
                            tc["id"].as_str().unwrap_or(""),
                            FuncCall::new(
                                tc["function"]["name"].as_str().unwrap_or(""),
                                tc["function"]["arguments"].as_str().unwrap_or("{}"),
                            ),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        if !tool_calls.is_empty() {
            return Ok(Reply::ToolCalls(tool_calls));
        }

        let content = message["content"].as_str().unwrap_or("");
        match choice["finish_reason"].as_str() {
            Some("content_filter") => Err(GenxError::Blocked {
                usage: usage.clone(),
                reason: "content_filter".to_string(),
            }),
            Some("length") if content.is_empty() => Err(GenxError::Truncated(usage.clone())),
            _ => Ok(Reply::Text(content.to_string())),
        }
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    async fn generate(&self, ctx: &dyn ModelContext) -> Result<(Usage, Reply), GenxError> {
        let body = self.build_request(ctx);
        let url = self.chat_url();

        let request = self.client.post(&url).header("Content-Type", "application/json");
        let request = if self.config.is_azure() {
            request.header("api-key", &self.config.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        };

        tracing::debug!(
            messages = body["messages"].as_array().map_or(0, |m| m.len()),
            "sending chat completion request"
        );

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| GenxError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(GenxError::Api { status, body: text });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| GenxError::Other(anyhow::anyhow!("JSON parse error: {}", e)))?;

        let usage = Self::parse_usage(&json);
        let reply = Self::parse_reply(&json, &usage)?;
        Ok((usage, reply))
    }
}
