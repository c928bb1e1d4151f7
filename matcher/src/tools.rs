use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shelfmatch_catalog::{ProductSearch, SearchHit};
use shelfmatch_embed::Embedder;
use shelfmatch_genx::{FuncCall, FuncTool};

use crate::models::{MatchedProduct, round2};
use crate::prompt::{SEARCH_TOOL_NAME, SearchArgs, search_tool};

/// What a tool invocation hands back to the matcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// JSON text appended to the conversation as the tool result.
    pub content: String,

    /// Matches to add to the running result.
    pub matches: Vec<MatchedProduct>,
}

/// A tool the model may call.
///
/// Handlers never fail: problems are logged and reported to the model as
/// an empty result so the conversation can continue.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Declaration sent to the model.
    fn tool(&self) -> &FuncTool;

    /// Run the tool for a call emitted by the model.
    async fn invoke(&self, call: &FuncCall) -> ToolOutput;
}

/// Dispatch table from tool name to handler.
#[derive(Default)]
pub struct ToolTable {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its tool name, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> &mut Self {
        self.handlers.insert(handler.tool().name.clone(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.get(name)
    }

    /// Declarations of every registered tool, sorted by name.
    pub fn tools(&self) -> Vec<FuncTool> {
        let mut tools: Vec<FuncTool> = self.handlers.values().map(|h| h.tool().clone()).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// One catalog hit as reported back to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCandidate {
    pub product_name: String,
    pub confidence: f64,
}

/// The `search_products` tool: embed the query, search the catalog and
/// keep hits scoring at or above the threshold.
pub struct SearchProducts {
    tool: FuncTool,
    embedder: Arc<dyn Embedder>,
    search: Arc<dyn ProductSearch>,
    top_k: usize,
    threshold: f64,
}

impl SearchProducts {
    /// Name this handler is registered under.
    pub const NAME: &'static str = SEARCH_TOOL_NAME;

    pub fn new(
        embedder: Arc<dyn Embedder>,
        search: Arc<dyn ProductSearch>,
        top_k: usize,
        threshold: f64,
    ) -> Self {
        Self {
            tool: search_tool(),
            embedder,
            search,
            top_k,
            threshold,
        }
    }

    /// Resolve a query to candidates. Embedding and search failures yield
    /// no candidates.
    pub async fn resolve(&self, query: &str) -> Vec<SearchCandidate> {
        tracing::info!(query, "searching products");

        let vector = match self.embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(query, error = %e, "product search failed");
                return vec![];
            }
        };
        let hits = match self.search.search(&vector, self.top_k).await {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(query, error = %e, "product search failed");
                return vec![];
            }
        };

        let candidates = self.keep_confident(hits);
        tracing::debug!(count = candidates.len(), "products above threshold");
        candidates
    }

    /// Scores are clamped to `[0, 1]` so every candidate reported to the
    /// model is also a valid [`MatchedProduct`].
    fn keep_confident(&self, hits: Vec<SearchHit>) -> Vec<SearchCandidate> {
        hits.into_iter()
            .filter(|h| h.score >= self.threshold)
            .map(|h| SearchCandidate {
                product_name: h.product_name,
                confidence: round2(h.score.clamp(0.0, 1.0)),
            })
            .collect()
    }
}

/// Decode the `query` argument. Anything unusable becomes "".
fn query_from_args(call: &FuncCall) -> String {
    match call.parse_args::<SearchArgs>() {
        Ok(args) => args.query,
        Err(e) => {
            tracing::warn!(arguments = %call.arguments, error = %e, "unusable search arguments");
            String::new()
        }
    }
}

#[async_trait]
impl ToolHandler for SearchProducts {
    fn tool(&self) -> &FuncTool {
        &self.tool
    }

    async fn invoke(&self, call: &FuncCall) -> ToolOutput {
        let query = query_from_args(call);
        let candidates = self.resolve(&query).await;

        let mut matches = Vec::with_capacity(candidates.len());
        for c in &candidates {
            match MatchedProduct::new(c.product_name.clone(), c.confidence, query.clone()) {
                Ok(m) => matches.push(m),
                Err(e) => {
                    tracing::warn!(product = %c.product_name, error = %e, "dropping search hit")
                }
            }
        }

        let content = serde_json::to_string(&candidates).unwrap_or_else(|_| "[]".to_string());
        ToolOutput { content, matches }
    }
}
