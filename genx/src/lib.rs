//! GenX - a chat-completion interface with function calling.
//!
//! This crate provides the abstraction layer the matcher uses to talk to a
//! language model:
//!
//! - Conversations that grow one message at a time
//! - Function/tool declarations with JSON Schema
//! - A tagged [`Reply`]: either tool invocations or a final text answer
//! - An OpenAI / Azure OpenAI [`Generator`] implementation
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use shelfmatch_genx::{Generator, ModelContextBuilder, FuncTool, Reply};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(JsonSchema, Deserialize)]
//! struct SearchArgs {
//!     query: String,
//! }
//!
//! let mut builder = ModelContextBuilder::new();
//! builder.prompt_text("system", "You are a helpful assistant.");
//! builder.user_text("user", "Find Castrol Magnatec");
//! builder.add_tool(FuncTool::new::<SearchArgs>("search_products", "Search the catalog"));
//!
//! let ctx = builder.build();
//! match generator.generate(&ctx).await?.1 {
//!     Reply::ToolCalls(calls) => { /* dispatch */ }
//!     Reply::Text(answer) => { /* done */ }
//! }
//! ```
//!
//! # Modules
//!
//! - [`types`]: Core message, tool-call and reply types
//! - [`tool`]: Function tool definitions with JSON Schema
//! - [`context`]: Conversation building
//! - [`error`]: Error types and token usage
//! - [`openai`]: Chat Completions client
//! - [`json_utils`]: Lenient JSON decoding of model output

pub mod context;
pub mod error;
pub mod json_utils;
pub mod openai;
pub mod tool;
pub mod types;

// Re-exports for convenience
pub use context::{Conversation, ModelContext, ModelContextBuilder, ModelParams, Prompt};
pub use error::{GenxError, Usage};
pub use tool::{FuncTool, Tool};
pub use types::{FuncCall, Message, Payload, Reply, Role, ToolCall, ToolResult};

use async_trait::async_trait;

/// Trait for LLM generators.
///
/// Implementations send the whole conversation and declared tools to a
/// language model and return one complete turn.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate the next model turn.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The model context containing prompts, messages, and tools
    ///
    /// # Returns
    ///
    /// The usage statistics and the decoded reply.
    async fn generate(&self, ctx: &dyn ModelContext) -> Result<(Usage, Reply), GenxError>;
}

/// Inspect a tool for debugging.
pub fn inspect_tool(tool: &dyn Tool) -> String {
    format!("### {}\n{}", tool.name(), tool.description())
}

/// Inspect a message for debugging.
pub fn inspect_message(msg: &Message) -> String {
    let mut lines = vec![format!("### {}", msg.role)];

    if let Some(name) = &msg.name {
        lines.push(name.clone());
    }

    match &msg.payload {
        Payload::Text(t) => lines.push(t.clone()),
        Payload::ToolCall(tc) => {
            lines.push(format!("[{}]", tc.id));
            lines.push(format!("{}({})", tc.func_call.name, tc.func_call.arguments));
        }
        Payload::ToolResult(tr) => {
            lines.push(format!("[{}]", tr.id));
            lines.push(tr.result.clone());
        }
    }

    lines.join("\n")
}

/// Inspect model context for debugging.
pub fn inspect_model_context(ctx: &dyn ModelContext) -> String {
    let mut output = String::new();

    // Params
    output.push_str("## Params\n");
    if let Some(params) = ctx.params() {
        if let Some(max_tokens) = params.max_tokens {
            output.push_str(&format!("MaxTokens: {}\n", max_tokens));
        }
        if let Some(temp) = params.temperature {
            output.push_str(&format!("Temperature: {:.2}\n", temp));
        }
    }
    output.push('\n');

    // Prompts
    output.push_str("## Prompts\n");
    for prompt in ctx.prompts() {
        output.push_str(&format!("### {}\n{}\n\n", prompt.name, prompt.text));
    }

    // Tools
    output.push_str("## Tools\n");
    for tool in ctx.tools() {
        output.push_str(&inspect_tool(tool));
        output.push_str("\n\n");
    }

    // Messages
    output.push_str("## Messages\n");
    for msg in ctx.messages() {
        output.push_str(&inspect_message(msg));
        output.push_str("\n\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Debug, JsonSchema, Deserialize)]
    struct TestArgs {
        query: String,
    }

    #[test]
    fn test_inspect_tool() {
        let tool = FuncTool::new::<TestArgs>("search_products", "Search for items");
        let output = inspect_tool(&tool);

        assert!(output.contains("search_products"));
        assert!(output.contains("Search for items"));
    }

    #[test]
    fn test_inspect_message() {
        let msg = Message::user_text("Na polici je Castrol.");
        let output = inspect_message(&msg);

        assert!(output.contains("user"));
        assert!(output.contains("Na polici je Castrol."));

        let msg = Message::tool_result(ToolResult::new("call_1", "[]"));
        let output = inspect_message(&msg);
        assert!(output.contains("[call_1]"));
    }

    #[test]
    fn test_inspect_model_context() {
        let mut builder = ModelContextBuilder::new();
        builder.prompt_text("system", "You are helpful.");
        builder.user_text("user", "Hello");
        builder.add_tool(FuncTool::new::<TestArgs>("search_products", "Search"));
        builder.set_params(ModelParams::new().with_temperature(0.3));

        let ctx = builder.build();
        let output = inspect_model_context(&ctx);

        assert!(output.contains("## Prompts"));
        assert!(output.contains("## Tools"));
        assert!(output.contains("## Messages"));
        assert!(output.contains("Temperature: 0.30"));
        assert!(output.contains("search_products"));
    }
}
