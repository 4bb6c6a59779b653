// holonet-core/src/lib.rs

//! Core library for the Holonet console chat assistant: conversation
//! orchestration, the tool registry with the starship-lookup and
//! vehicle-search tools, and the REST clients they depend on.

pub mod agent;
pub mod api;
pub mod config;
pub mod errors;
pub mod search;
pub mod tools;

pub mod models {
    pub mod chat;
    pub mod tools;
}


pub use agent::{Conversation, ToolInvocationRecord, TurnOutput};
pub use config::{RuntimeConfig, SearchConfig};
pub use errors::ToolCallError;
pub use models::chat::{ApiResponse, ChatMessage, Choice, Usage};
pub use models::tools::{
    ToolCall, ToolDefinition, ToolFunction, ToolInput, ToolParameter, ToolParameterType,
    ToolParametersDefinition,
};
pub use tools::{Tool, ToolRegistry};

pub use async_trait::async_trait;
