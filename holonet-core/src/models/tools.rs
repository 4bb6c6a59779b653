// holonet-core/src/models/tools.rs
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

// --- Structs for model tool interaction ---

/// A tool call requested by the model.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // Usually "function"
    pub function: ToolFunction,
}

/// The function call details within a ToolCall.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolFunction {
    pub name: String,
    /// Arguments arrive as a JSON string from the model
    pub arguments: String,
}

// --- Tool definition and input ---

/// Schema for a tool presented to the model in the request catalog.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParametersDefinition,
}

/// The parameters structure for a tool.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolParametersDefinition {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: HashMap<String, ToolParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// A single parameter within a tool's schema.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: String,
}

/// The type of a tool parameter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ToolDefinition {
    /// A definition whose parameters are a single required string field,
    /// which is all either built-in tool needs.
    pub fn single_string_param(
        name: &str,
        description: &str,
        param_name: &str,
        param_description: &str,
    ) -> Self {
        let mut properties = HashMap::new();
        properties.insert(
            param_name.to_string(),
            ToolParameter {
                param_type: ToolParameterType::String,
                description: param_description.to_string(),
            },
        );
        ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            parameters: ToolParametersDefinition {
                param_type: "object".to_string(),
                properties,
                required: vec![param_name.to_string()],
            },
        }
    }
}

/// Parsed arguments for one tool invocation.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ToolInput {
    pub arguments: HashMap<String, JsonValue>,
}

impl ToolInput {
    /// Extracts a required string argument by name.
    pub fn required_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}
