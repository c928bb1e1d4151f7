//! Core types for the GenX chat interface.
//!
//! This module defines the fundamental types used for representing messages,
//! roles, tool calls and model replies in a conversation.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Model/assistant message
    Model,
    /// Tool response message
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// Function call information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncCall {
    /// Name of the function to call
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

impl FuncCall {
    /// Create a new function call.
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the arguments as a specific type.
    pub fn parse_args<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.arguments)
    }
}

/// A tool call made by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// The function call details
    pub func_call: FuncCall,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, func_call: FuncCall) -> Self {
        Self {
            id: id.into(),
            func_call,
        }
    }
}

/// Result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the tool call this result corresponds to
    pub id: String,
    /// The result as a string (typically JSON)
    pub result: String,
}

impl ToolResult {
    /// Create a new tool result.
    pub fn new(id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: result.into(),
        }
    }
}

/// Payload of a message - can be text, tool call, or tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Plain text content
    Text(String),
    /// A tool call from the model
    ToolCall(ToolCall),
    /// A result from tool execution
    ToolResult(ToolResult),
}

impl Payload {
    /// Create a text payload.
    pub fn text(s: impl Into<String>) -> Self {
        Payload::Text(s.into())
    }

    /// Get the text if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the tool call if this is a tool call payload.
    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Payload::ToolCall(tc) => Some(tc),
            _ => None,
        }
    }

    /// Get the tool result if this is a tool result payload.
    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        match self {
            Payload::ToolResult(tr) => Some(tr),
            _ => None,
        }
    }
}

/// A complete message in a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Optional name of the sender
    pub name: Option<String>,
    /// Message payload
    pub payload: Payload,
}

impl Message {
    /// Create a new message.
    pub fn new(role: Role, payload: Payload) -> Self {
        Self {
            role,
            name: None,
            payload,
        }
    }

    /// Create a new message with a name.
    pub fn with_name(role: Role, name: impl Into<String>, payload: Payload) -> Self {
        Self {
            role,
            name: Some(name.into()),
            payload,
        }
    }

    /// Create a user text message.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, Payload::text(text))
    }

    /// Create a tool call message.
    pub fn tool_call(tool_call: ToolCall) -> Self {
        Self::new(Role::Model, Payload::ToolCall(tool_call))
    }

    /// Create a tool result message.
    pub fn tool_result(tool_result: ToolResult) -> Self {
        Self::new(Role::Tool, Payload::ToolResult(tool_result))
    }
}

/// A complete (non-streamed) model turn.
///
/// The model either asks for one or more tools to be invoked, or answers
/// with free-form text. A reply carrying tool calls is never terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Tool invocations in the order the model emitted them
    ToolCalls(Vec<ToolCall>),
    /// Final free-form answer
    Text(String),
}

impl Reply {
    /// Get the text if this is a final answer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Model.to_string(), "model");
        assert_eq!(Role::Tool.to_string(), "tool");
    }

    #[test]
    fn test_message_constructors() {
        let user_msg = Message::user_text("Dobrý den");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.payload.as_text(), Some("Dobrý den"));

        let call = Message::tool_call(ToolCall::new("call_1", FuncCall::new("search_products", "{}")));
        assert_eq!(call.payload.as_tool_call().unwrap().id, "call_1");
        assert_eq!(call.role, Role::Model);

        let result = Message::tool_result(ToolResult::new("call_1", "[]"));
        assert_eq!(result.payload.as_tool_result().unwrap().result, "[]");
        assert_eq!(result.role, Role::Tool);
    }

    #[test]
    fn test_func_call_parse_args() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Args {
            query: String,
        }

        let fc = FuncCall::new("search_products", r#"{"query": "Castrol Magnatec"}"#);
        let args: Args = fc.parse_args().unwrap();
        assert_eq!(args.query, "Castrol Magnatec");
    }

    #[test]
    fn test_reply_accessors() {
        let reply = Reply::Text("hotovo".into());
        assert_eq!(reply.as_text(), Some("hotovo"));

        let reply = Reply::ToolCalls(vec![]);
        assert!(reply.as_text().is_none());
    }
}
