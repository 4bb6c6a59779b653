// holonet-core/src/agent.rs

//! The conversation orchestrator: owns the transcript, detects tool-call
//! responses, dispatches them through the registry, and resubmits the
//! augmented transcript within an explicit hop budget.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, trace};

use crate::api;
use crate::config::RuntimeConfig;
use crate::errors::ToolCallError;
use crate::models::chat::{ChatMessage, Choice, Usage};
use crate::tools::ToolRegistry;

/// Record of a single tool invocation performed during a turn.
#[derive(Debug, Clone)]
pub struct ToolInvocationRecord {
    pub tool_call_id: String,
    pub tool_name: String,
    pub arguments: JsonValue,
    pub output: String,
}

/// What one call to [`Conversation::submit`] produced.
#[derive(Debug, Clone, Default)]
pub struct TurnOutput {
    /// Content of each normal-answer choice, in choice order.
    pub answers: Vec<String>,
    /// Synthetic tool messages generated along the way, for bookkeeping.
    pub tool_messages: Vec<ChatMessage>,
    /// Records of the tools that ran.
    pub tool_invocations: Vec<ToolInvocationRecord>,
    /// Token accounting from the last completion response of the turn.
    pub usage: Option<Usage>,
}

/// A single linear conversation against the completion collaborator.
///
/// Collaborator clients are constructed once and handed in; the orchestrator
/// holds no ambient global state.
pub struct Conversation {
    config: RuntimeConfig,
    registry: Arc<ToolRegistry>,
    http_client: Client,
    transcript: Vec<ChatMessage>,
    max_tool_hops: usize,
}

impl Conversation {
    pub fn new(
        config: RuntimeConfig,
        registry: Arc<ToolRegistry>,
        http_client: Client,
        system_prompt: &str,
    ) -> Self {
        let max_tool_hops = config.max_tool_hops;
        Self {
            config,
            registry,
            http_client,
            transcript: vec![ChatMessage::system(system_prompt)],
            max_tool_hops,
        }
    }

    /// The persistent transcript, starting with the system message.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Empties the history back to the single system message.
    pub fn clear(&mut self) {
        self.transcript.truncate(1);
        info!("Cleared conversation history.");
    }

    /// Runs one user turn: at most `max_tool_hops` rounds of tool dispatch
    /// plus resubmission, then the final answer is committed to the
    /// transcript and returned.
    pub async fn submit(&mut self, user_text: &str) -> Result<TurnOutput> {
        if user_text.trim().is_empty() {
            return Err(anyhow!("Cannot submit an empty user message"));
        }

        let user_message = ChatMessage::user(user_text);
        let mut request_messages = self.transcript.clone();
        request_messages.push(user_message.clone());

        let tool_definitions = self.registry.definitions();
        debug!(
            num_messages = request_messages.len(),
            num_tools = tool_definitions.len(),
            "Starting turn."
        );

        let mut hops_used = 0;
        let mut turn_tool_messages: Vec<ChatMessage> = Vec::new();
        let mut tool_invocations: Vec<ToolInvocationRecord> = Vec::new();

        loop {
            trace!(payload = %serde_json::to_string_pretty(&request_messages).unwrap_or_else(|e| format!("Serialization error: {}", e)), "Messages sent to API");

            let api_response = api::get_chat_completion(
                &self.http_client,
                &self.config,
                request_messages.clone(),
                &tool_definitions,
            )
            .await
            .context("Completion call failed during turn")?;

            let usage = api_response.usage.clone();

            // Partition the choices into tool-call requests and answers.
            let (tool_choices, answer_choices): (Vec<Choice>, Vec<Choice>) = api_response
                .choices
                .into_iter()
                .partition(|choice| {
                    choice
                        .message
                        .tool_calls
                        .as_ref()
                        .map_or(false, |calls| !calls.is_empty())
                });

            if tool_choices.is_empty() {
                if answer_choices.is_empty() {
                    error!("API response contained no choices.");
                    return Err(anyhow!("API response contained no choices"));
                }

                info!("Received final response (no further tool calls requested).");
                let answers: Vec<String> = answer_choices
                    .iter()
                    .filter_map(|choice| choice.message.content.clone())
                    .collect();

                // Commit the turn: user message, synthetic tool messages,
                // then the assistant answer(s).
                self.transcript.push(user_message);
                self.transcript.extend(turn_tool_messages.iter().cloned());
                for answer in &answers {
                    self.transcript.push(ChatMessage::assistant(answer.clone()));
                }

                return Ok(TurnOutput {
                    answers,
                    tool_messages: turn_tool_messages,
                    tool_invocations,
                    usage,
                });
            }

            if hops_used >= self.max_tool_hops {
                error!(
                    limit = self.max_tool_hops,
                    "Model kept requesting tools after the hop budget was spent."
                );
                return Err(ToolCallError::HopLimitExceeded {
                    limit: self.max_tool_hops,
                }
                .into());
            }
            hops_used += 1;

            // Resolve every tool call of this response before the single
            // resubmission; results are appended in call order.
            for choice in tool_choices {
                let calls = choice.message.tool_calls.unwrap_or_default();
                info!(count = calls.len(), "Model requested {} tool call(s).", calls.len());

                for call in calls {
                    let tool_name = call.function.name.clone();
                    debug!(tool_call_id = %call.id, tool = %tool_name, "Dispatching tool call.");
                    trace!(arguments = %call.function.arguments, "Raw tool arguments for '{}'", tool_name);

                    let output = self
                        .registry
                        .invoke(&tool_name, &call.function.arguments)
                        .await
                        .with_context(|| format!("Tool '{}' failed", tool_name))?;

                    trace!(tool = %tool_name, output = %output, "Tool output.");
                    let tool_message = ChatMessage::tool(&tool_name, &call.id, &output);
                    request_messages.push(tool_message.clone());
                    turn_tool_messages.push(tool_message);
                    tool_invocations.push(ToolInvocationRecord {
                        tool_call_id: call.id,
                        tool_name,
                        arguments: serde_json::from_str(&call.function.arguments)
                            .unwrap_or(JsonValue::Null),
                        output,
                    });
                }
            }

            debug!(
                hop = hops_used,
                num_messages = request_messages.len(),
                "Resubmitting augmented transcript."
            );
        }
    }
}
