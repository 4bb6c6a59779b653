// holonet-core/src/tools/mod.rs

//! The tool catalog: a declarative registry mapping tool names to a schema
//! and an async handler. Dispatch logic never needs to know which tools
//! exist; adding a tool is a single `register` call.

pub mod starships;
pub mod vehicle_search;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::errors::ToolCallError;
use crate::models::tools::{ToolDefinition, ToolInput};

/// A tool the model may ask the orchestrator to run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Schema presented to the model in the request catalog.
    fn definition(&self) -> ToolDefinition;
    /// Runs the tool with already-parsed arguments, returning the text fed
    /// back to the model.
    async fn invoke(&self, input: ToolInput) -> Result<String>;
}

/// Insertion-ordered catalog of tools. The order of [`definitions`] is the
/// order tools were registered, so the catalog sent with each request is
/// stable across turns.
///
/// [`definitions`]: ToolRegistry::definitions
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool = %tool.definition().name, "Registered tool.");
        self.tools.push(tool);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    /// Resolves `name`, decodes the raw JSON argument string against the
    /// tool's schema, and invokes the handler.
    ///
    /// An unknown name or malformed arguments fail the call with a typed
    /// [`ToolCallError`]; they are never silently dropped.
    pub async fn invoke(&self, name: &str, raw_arguments: &str) -> Result<String> {
        let tool = self
            .find(name)
            .ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;

        trace!(tool = name, arguments = raw_arguments, "Decoding tool arguments.");
        let arguments: HashMap<String, JsonValue> = serde_json::from_str(raw_arguments)
            .map_err(|e| ToolCallError::invalid_arguments(name, e))?;

        let definition = tool.definition();
        for required in &definition.parameters.required {
            if !arguments.contains_key(required) {
                return Err(ToolCallError::invalid_arguments(
                    name,
                    format!("missing required field '{}'", required),
                )
                .into());
            }
        }

        tool.invoke(ToolInput { arguments }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tools::ToolDefinition;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::single_string_param("echo", "Echoes its input.", "text", "Text to echo")
        }

        async fn invoke(&self, input: ToolInput) -> Result<String> {
            Ok(input.required_str("text").unwrap_or_default().to_string())
        }
    }

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn test_invoke_known_tool() {
        let registry = registry_with_echo();
        let output = registry
            .invoke("echo", r#"{"text": "hello there"}"#)
            .await
            .unwrap();
        assert_eq!(output, "hello there");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_typed_error() {
        let registry = registry_with_echo();
        let err = registry.invoke("order_66", "{}").await.err().unwrap();
        match err.downcast_ref::<ToolCallError>() {
            Some(ToolCallError::UnknownTool(name)) => assert_eq!(name, "order_66"),
            other => panic!("Expected UnknownTool, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_arguments_are_rejected() {
        let registry = registry_with_echo();
        let err = registry.invoke("echo", "not json").await.err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ToolCallError>(),
            Some(ToolCallError::InvalidArguments { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_required_field_is_rejected() {
        let registry = registry_with_echo();
        let err = registry.invoke("echo", "{}").await.err().unwrap();
        match err.downcast_ref::<ToolCallError>() {
            Some(ToolCallError::InvalidArguments { reason, .. }) => {
                assert!(reason.contains("text"), "Unexpected reason: {}", reason)
            }
            other => panic!("Expected InvalidArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        struct Named(&'static str);
        #[async_trait]
        impl Tool for Named {
            fn definition(&self) -> ToolDefinition {
                ToolDefinition::single_string_param(self.0, "d", "p", "pd")
            }
            async fn invoke(&self, _input: ToolInput) -> Result<String> {
                Ok(String::new())
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("b_tool")));
        registry.register(Arc::new(Named("a_tool")));
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b_tool", "a_tool"]);
    }
}
