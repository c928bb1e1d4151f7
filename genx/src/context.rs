//! Model context for LLM conversations.
//!
//! This module provides types for building and growing the conversation
//! context that is passed to LLM generators.

use serde::{Deserialize, Serialize};

use crate::tool::{FuncTool, Tool};
use crate::types::{Message, Payload, Role, ToolCall, ToolResult};

/// A prompt with a name and text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Name/identifier for this prompt
    pub name: String,
    /// Text content of the prompt
    pub text: String,
}

impl Prompt {
    /// Create a new prompt.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Parameters for model generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Maximum number of tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,

    /// Temperature (0.0 to 2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ModelParams {
    /// Create new default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Trait for accessing model context.
pub trait ModelContext: Send + Sync {
    /// Iterate over prompts.
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_>;

    /// Iterate over messages.
    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_>;

    /// Iterate over tools.
    fn tools(&self) -> Box<dyn Iterator<Item = &dyn Tool> + '_>;

    /// Get model parameters.
    fn params(&self) -> Option<&ModelParams>;
}

/// Builder for constructing model context.
#[derive(Debug, Default)]
pub struct ModelContextBuilder {
    prompts: Vec<Prompt>,
    messages: Vec<Message>,
    tools: Vec<FuncTool>,
    params: Option<ModelParams>,
}

impl ModelContextBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the conversation.
    pub fn build(self) -> Conversation {
        Conversation {
            prompts: self.prompts,
            messages: self.messages,
            tools: self.tools,
            params: self.params,
        }
    }

    /// Set model parameters.
    pub fn set_params(&mut self, params: ModelParams) -> &mut Self {
        self.params = Some(params);
        self
    }

    /// Add a prompt.
    pub fn add_prompt(&mut self, prompt: Prompt) -> &mut Self {
        self.prompts.push(prompt);
        self
    }

    /// Add a prompt with name and text.
    pub fn prompt_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_prompt(Prompt::new(name, text))
    }

    /// Add a message.
    pub fn add_message(&mut self, msg: Message) -> &mut Self {
        self.messages.push(msg);
        self
    }

    /// Add a user text message.
    pub fn user_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.add_message(Message::with_name(Role::User, name, Payload::text(text)))
    }

    /// Add a function tool.
    pub fn add_tool(&mut self, tool: FuncTool) -> &mut Self {
        self.tools.push(tool);
        self
    }
}

/// A conversation that can only grow.
///
/// Prompts, tools and params are fixed when the builder is consumed;
/// messages may be appended afterwards but never removed or rewritten.
#[derive(Debug, Clone)]
pub struct Conversation {
    prompts: Vec<Prompt>,
    messages: Vec<Message>,
    tools: Vec<FuncTool>,
    params: Option<ModelParams>,
}

impl Conversation {
    /// Append a message.
    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// Append a tool call emitted by the model.
    pub fn push_tool_call(&mut self, call: ToolCall) {
        self.push(Message::tool_call(call));
    }

    /// Append the result for the tool call with the given id.
    pub fn push_tool_result(&mut self, result: ToolResult) {
        self.push(Message::tool_result(result));
    }

    /// Number of messages (prompts excluded).
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no messages have been added.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl ModelContext for Conversation {
    fn prompts(&self) -> Box<dyn Iterator<Item = &Prompt> + '_> {
        Box::new(self.prompts.iter())
    }

    fn messages(&self) -> Box<dyn Iterator<Item = &Message> + '_> {
        Box::new(self.messages.iter())
    }

    fn tools(&self) -> Box<dyn Iterator<Item = &dyn Tool> + '_> {
        Box::new(self.tools.iter().map(|t| t as &dyn Tool))
    }

    fn params(&self) -> Option<&ModelParams> {
        self.params.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FuncCall;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Debug, JsonSchema, Deserialize)]
    struct TestArgs {
        query: String,
    }

    #[test]
    fn test_prompt_new() {
        let p = Prompt::new("system", "Jsi asistent.");
        assert_eq!(p.name, "system");
        assert_eq!(p.text, "Jsi asistent.");
    }

    #[test]
    fn test_model_params_builder() {
        let params = ModelParams::new()
            .with_max_tokens(2000)
            .with_temperature(0.3);

        assert_eq!(params.max_tokens, Some(2000));
        assert_eq!(params.temperature, Some(0.3));
    }

    #[test]
    fn test_builder_prompts_and_messages() {
        let mut builder = ModelContextBuilder::new();
        builder.prompt_text("system", "Jsi asistent.");
        builder.user_text("user", "Analyzuj tento transkript");

        let ctx = builder.build();
        let prompts: Vec<_> = ctx.prompts().collect();
        let messages: Vec<_> = ctx.messages().collect();

        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, "system");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].name.as_deref(), Some("user"));
        assert_eq!(messages[0].payload.as_text(), Some("Analyzuj tento transkript"));
    }

    #[test]
    fn test_builder_tools() {
        let mut builder = ModelContextBuilder::new();
        builder.add_tool(FuncTool::new::<TestArgs>("search_products", "Search"));

        let ctx = builder.build();
        let tools: Vec<_> = ctx.tools().collect();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "search_products");
    }

    #[test]
    fn test_conversation_grows() {
        let mut b = ModelContextBuilder::new();
        b.prompt_text("system", "Jsi asistent.");
        b.user_text("user", "Analyzuj");
        let mut conv = b.build();
        assert_eq!(conv.len(), 1);

        conv.push_tool_call(ToolCall::new("call_9", FuncCall::new("search_products", "{}")));
        conv.push_tool_result(ToolResult::new("call_9", "[]"));

        assert_eq!(conv.len(), 3);
        assert_eq!(conv.prompts().count(), 1);
        let last = conv.messages().last().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert_eq!(last.payload.as_tool_result().unwrap().id, "call_9");
    }

    #[test]
    fn test_empty_builder() {
        let ctx = ModelContextBuilder::new().build();
        assert!(ctx.is_empty());
        assert_eq!(ctx.prompts().count(), 0);
        assert_eq!(ctx.tools().count(), 0);
        assert!(ctx.params().is_none());
    }

    #[test]
    fn test_params() {
        let mut b = ModelContextBuilder::new();
        b.set_params(ModelParams::new().with_max_tokens(1000).with_temperature(0.5));
        let ctx = b.build();
        let params = ctx.params().unwrap();
        assert_eq!(params.max_tokens, Some(1000));
        assert_eq!(params.temperature, Some(0.5));
    }
}
