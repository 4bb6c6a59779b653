// holonet-core/src/errors.rs
use thiserror::Error;

/// Errors raised while resolving and dispatching model tool calls.
#[derive(Error, Debug)]
pub enum ToolCallError {
    /// The model asked for a tool that is not in the registry.
    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),

    /// The model supplied arguments that do not match the tool's schema.
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The model kept requesting tools after the hop budget was spent.
    #[error("tool hop limit of {limit} exceeded")]
    HopLimitExceeded { limit: usize },
}

impl ToolCallError {
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl ToString) -> Self {
        ToolCallError::InvalidArguments {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }
}
