//! Tool definitions for function calling.
//!
//! This module provides types for declaring tools that can be called by LLMs.
//! The main type is [`FuncTool`], which uses JSON Schema to define parameters.

use schemars::JsonSchema;
use serde_json::Value as JsonValue;

/// A tool that can be used by an LLM.
pub trait Tool: Send + Sync {
    /// Get the name of this tool.
    fn name(&self) -> &str;

    /// Get the description of this tool.
    fn description(&self) -> &str;

    /// Get the JSON Schema for the tool's arguments.
    fn schema(&self) -> &JsonValue;
}

/// A function tool with JSON Schema parameter definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncTool {
    /// Name of the tool
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the argument (stored as JSON value)
    pub argument: JsonValue,
}

impl Tool for FuncTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> &JsonValue {
        &self.argument
    }
}

impl FuncTool {
    /// Create a new function tool from a type that implements JsonSchema.
    ///
    /// # Example
    ///
    /// ```
    /// use schemars::JsonSchema;
    /// use serde::Deserialize;
    /// use shelfmatch_genx::tool::FuncTool;
    ///
    /// #[derive(JsonSchema, Deserialize)]
    /// struct SearchArgs {
    ///     /// The search query
    ///     query: String,
    /// }
    ///
    /// let tool = FuncTool::new::<SearchArgs>("search_products", "Search the catalog");
    /// assert_eq!(tool.name, "search_products");
    /// ```
    pub fn new<T>(name: impl Into<String>, description: impl Into<String>) -> Self
    where
        T: JsonSchema,
    {
        let schema = schemars::schema_for!(T);
        let mut argument = serde_json::to_value(&schema).unwrap_or_default();

        // Chat APIs expect a bare object schema.
        if let Some(obj) = argument.as_object_mut() {
            obj.remove("$schema");
            obj.remove("title");
        }

        Self {
            name: name.into(),
            description: description.into(),
            argument,
        }
    }

    /// Get the JSON Schema as a JSON value.
    pub fn schema_json(&self) -> &JsonValue {
        &self.argument
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Debug, JsonSchema, Deserialize)]
    struct TestArgs {
        /// The query parameter
        query: String,
        /// Optional count
        count: Option<i32>,
    }

    #[test]
    fn test_func_tool_new() {
        let tool = FuncTool::new::<TestArgs>("search_products", "A test tool");

        assert_eq!(tool.name(), "search_products");
        assert_eq!(tool.description(), "A test tool");

        let schema = tool.schema_json();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("properties").is_some());
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
    }

    #[test]
    fn test_func_tool_schema_generation() {
        let tool = FuncTool::new::<TestArgs>("test", "Test");

        let schema = tool.schema_json();
        let props = schema.get("properties").unwrap();

        assert!(props.get("query").is_some());
        assert!(props.get("count").is_some());

        let required = schema.get("required").unwrap().as_array().unwrap();
        assert!(required.iter().any(|v| v.as_str() == Some("query")));
    }
}
