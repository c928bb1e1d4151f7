use std::sync::Arc;

use serde_json::{Map, Value};
use shelfmatch_catalog::ProductSearch;
use shelfmatch_embed::Embedder;
use shelfmatch_genx::json_utils::{extract_json_object, unmarshal_json};
use shelfmatch_genx::{
    Conversation, FuncTool, Generator, ModelContextBuilder, ModelParams, Reply, ToolCall,
    ToolResult, inspect_model_context,
};

use crate::error::MatchError;
use crate::models::{MatchedProduct, ProcessingResult};
use crate::prompt::{SYSTEM_PROMPT, user_message};
use crate::settings::MatcherSettings;
use crate::tools::{SearchProducts, ToolTable};

/// ProductMatcher recognises catalog products in transcripts.
///
/// It holds no per-transcript state, so one instance can serve concurrent
/// [`process`](Self::process) calls.
pub struct ProductMatcher {
    generator: Arc<dyn Generator>,
    tools: ToolTable,
    settings: MatcherSettings,
}

impl ProductMatcher {
    pub fn new(
        generator: Arc<dyn Generator>,
        embedder: Arc<dyn Embedder>,
        search: Arc<dyn ProductSearch>,
        settings: MatcherSettings,
    ) -> Self {
        let mut tools = ToolTable::new();
        tools.register(Arc::new(SearchProducts::new(
            embedder,
            search,
            settings.top_k,
            settings.confidence_threshold,
        )));
        tracing::info!(
            top_k = settings.top_k,
            threshold = settings.confidence_threshold,
            "product matcher initialized"
        );
        Self {
            generator,
            tools,
            settings,
        }
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    /// Declaration of the catalog search tool offered to the model.
    pub fn search_tool(&self) -> Option<&FuncTool> {
        self.tools.get(SearchProducts::NAME).map(|h| h.tool())
    }

    /// Match products and detect shelf issues in one transcript.
    ///
    /// Fails with [`MatchError::InvalidInput`] for a blank transcript and
    /// with [`MatchError::Model`] when the language model call fails.
    /// Search failures and unparseable model answers degrade the result
    /// instead of failing it.
    pub async fn process(&self, transcript: &str) -> Result<ProcessingResult, MatchError> {
        if transcript.trim().is_empty() {
            return Err(MatchError::InvalidInput);
        }
        tracing::info!(preview = %preview(transcript), "processing transcript");

        let mut conv = self.conversation(transcript);
        let mut found: Vec<MatchedProduct> = Vec::new();

        for iteration in 1..=self.settings.max_iterations {
            tracing::debug!(iteration, "function calling iteration");
            if tracing::enabled!(tracing::Level::TRACE) {
                tracing::trace!("model context:\n{}", inspect_model_context(&conv));
            }

            let (usage, reply) = match self.generator.generate(&conv).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(error = %e, "processing failed");
                    return Err(e.into());
                }
            };
            tracing::debug!(%usage, "model replied");

            match reply {
                Reply::ToolCalls(calls) => {
                    for call in calls {
                        self.dispatch(&mut conv, &mut found, call).await;
                    }
                }
                Reply::Text(text) => {
                    tracing::debug!(response = %text, "final model response");
                    let result = finish(transcript, found, &text)?;
                    tracing::info!(
                        products = result.matched_products().len(),
                        "processing completed"
                    );
                    return Ok(result);
                }
            }
        }

        tracing::warn!(
            max_iterations = self.settings.max_iterations,
            "max iterations reached without final response"
        );
        ProcessingResult::new(found, false, false, transcript)
    }

    fn conversation(&self, transcript: &str) -> Conversation {
        let mut b = ModelContextBuilder::new();
        b.prompt_text("system", SYSTEM_PROMPT);
        b.user_text("user", user_message(transcript));
        for tool in self.tools.tools() {
            b.add_tool(tool);
        }
        b.set_params(
            ModelParams::new()
                .with_temperature(self.settings.temperature)
                .with_max_tokens(self.settings.max_tokens),
        );
        b.build()
    }

    async fn dispatch(&self, conv: &mut Conversation, found: &mut Vec<MatchedProduct>, call: ToolCall) {
        let name = call.func_call.name.as_str();
        let Some(handler) = self.tools.get(name) else {
            tracing::warn!(tool = name, "model called unknown tool, skipping");
            return;
        };

        tracing::info!(tool = name, "model calling function");
        tracing::debug!(arguments = %call.func_call.arguments, "function arguments");

        let output = handler.invoke(&call.func_call).await;
        found.extend(output.matches);

        let id = call.id.clone();
        conv.push_tool_call(call);
        conv.push_tool_result(ToolResult::new(id, output.content));
    }
}

/// Build the result from the model's final text.
///
/// Matches collected from tool calls win over the ones the model lists
/// itself; the model's list is only used when no tool call matched.
fn finish(
    transcript: &str,
    found: Vec<MatchedProduct>,
    text: &str,
) -> Result<ProcessingResult, MatchError> {
    let Some(verdict) = parse_verdict(text) else {
        return ProcessingResult::new(found, false, false, transcript);
    };

    let products = if found.is_empty() {
        reported_products(&verdict)
    } else {
        found
    };

    ProcessingResult::new(
        products,
        flag(&verdict, "competitor_advantage_mentioned"),
        flag(&verdict, "bad_placement_mentioned"),
        transcript,
    )
}

fn parse_verdict(text: &str) -> Option<Map<String, Value>> {
    match unmarshal_json::<Value>(extract_json_object(text).as_bytes()) {
        Ok(Value::Object(obj)) => Some(obj),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "final response is not a JSON object");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse JSON response");
            None
        }
    }
}

fn reported_products(verdict: &Map<String, Value>) -> Vec<MatchedProduct> {
    let Some(entries) = verdict.get("matched_products").and_then(Value::as_array) else {
        return vec![];
    };
    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<MatchedProduct>(entry.clone()) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "dropping invalid product from model response");
                None
            }
        })
        .collect()
}

/// Read a yes/no flag. Besides JSON booleans, the usual textual and
/// numeric spellings (`"true"`, `"yes"`, `"1"`, `1`, ...) are accepted;
/// anything else is false.
fn flag(verdict: &Map<String, Value>, key: &str) -> bool {
    let Some(value) = verdict.get(key) else {
        return false;
    };
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        tracing::warn!(key, value = %value, "unrecognised flag value, using false");
        false
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 100;
    match text.char_indices().nth(MAX) {
        Some((i, _)) => format!("{}...", &text[..i]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> MatchedProduct {
        MatchedProduct::new(name, 0.9, "dotaz").unwrap()
    }

    #[test]
    fn test_finish_prefers_found() {
        let text = r#"{"matched_products": [{"product_name": "Model", "confidence": 0.5, "context": "c"}],
            "competitor_advantage_mentioned": true, "bad_placement_mentioned": false}"#;
        let r = finish("t", vec![product("Hledané")], text).unwrap();
        assert_eq!(r.matched_products().len(), 1);
        assert_eq!(r.matched_products()[0].product_name(), "Hledané");
        assert!(r.competitor_advantage_mentioned());
    }

    #[test]
    fn test_finish_uses_model_list_when_nothing_found() {
        let text = r#"Hotovo:
```json
{"matched_products": [
    {"product_name": "Castrol", "confidence": 0.8567, "context": "Castrol"},
    {"product_name": "Broken", "confidence": 7, "context": "x"},
    {"product_name": "NoContext", "confidence": 0.8}
],
 "bad_placement_mentioned": true}
```"#;
        let r = finish("t", vec![], text).unwrap();
        assert_eq!(r.matched_products().len(), 1);
        assert_eq!(r.matched_products()[0].confidence(), 0.86);
        assert!(!r.competitor_advantage_mentioned());
        assert!(r.bad_placement_mentioned());
    }

    #[test]
    fn test_finish_unparseable() {
        let r = finish("t", vec![product("A")], "Nenašel jsem nic {nejde to").unwrap();
        assert_eq!(r.matched_products().len(), 1);
        assert!(!r.competitor_advantage_mentioned());
        assert!(!r.bad_placement_mentioned());
    }

    #[test]
    fn test_flags_accept_text_and_numbers() {
        let text = r#"{"matched_products": [], "competitor_advantage_mentioned": "true", "bad_placement_mentioned": 1}"#;
        let r = finish("t", vec![], text).unwrap();
        assert!(r.competitor_advantage_mentioned());
        assert!(r.bad_placement_mentioned());

        let text = r#"{"competitor_advantage_mentioned": " Yes ", "bad_placement_mentioned": "ON"}"#;
        let r = finish("t", vec![], text).unwrap();
        assert!(r.competitor_advantage_mentioned());
        assert!(r.bad_placement_mentioned());

        let text = r#"{"competitor_advantage_mentioned": "no", "bad_placement_mentioned": 0}"#;
        let r = finish("t", vec![], text).unwrap();
        assert!(!r.competitor_advantage_mentioned());
        assert!(!r.bad_placement_mentioned());
    }

    #[test]
    fn test_unrecognised_flags_are_false() {
        let text = r#"{"competitor_advantage_mentioned": "možná", "bad_placement_mentioned": 2}"#;
        let r = finish("t", vec![], text).unwrap();
        assert!(!r.competitor_advantage_mentioned());
        assert!(!r.bad_placement_mentioned());

        let text = r#"{"competitor_advantage_mentioned": null, "bad_placement_mentioned": [true]}"#;
        let r = finish("t", vec![], text).unwrap();
        assert!(!r.competitor_advantage_mentioned());
        assert!(!r.bad_placement_mentioned());
    }

    #[test]
    fn test_lenient_json() {
        let text = "{'competitor_advantage_mentioned': true, 'bad_placement_mentioned': true,}";
        let r = finish("t", vec![], text).unwrap();
        assert!(r.competitor_advantage_mentioned());
        assert!(r.bad_placement_mentioned());
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("krátký"), "krátký");
        let long = "ř".repeat(150);
        let p = preview(&long);
        assert_eq!(p.chars().count(), 103);
        assert!(p.ends_with("..."));
    }
}
