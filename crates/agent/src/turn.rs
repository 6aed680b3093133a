//! The routing state machine for one conversation turn.
//!
//! A turn walks `AwaitingModel` → (`AwaitingTool` →)* → `Done`:
//! the composed prompt plus full history goes to the model; a reply with no
//! tool-call requests ends the turn, a reply with requests routes through
//! tool execution and loops back. Tool failures become tool-result messages
//! the model can react to; a model failure is fatal to the turn and
//! propagates. A bounded hop ceiling guarantees termination.

use crate::prompt::PromptComposer;
use hearth_context::ContextProvider;
use hearth_core::error::Error;
use hearth_core::message::Conversation;
use hearth_core::provider::{Provider, ProviderRequest};
use hearth_core::tool::{ToolCall, ToolRegistry};
use hearth_memory::MemoryAdapter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the state machine currently is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Prompt + history are about to be (or have been) sent to the model
    AwaitingModel,
    /// The model requested tools; they are being invoked
    AwaitingTool,
    /// The model produced a final answer
    Done,
}

const HOP_CEILING_REPLY: &str =
    "I wasn't able to finish looking that up. Could you rephrase or narrow the question?";

/// Runs conversation turns: context + memory injection, then the
/// chat/tool routing cycle.
pub struct TurnRunner {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    tools: Arc<ToolRegistry>,
    memory: MemoryAdapter,
    context: ContextProvider,
    composer: PromptComposer,
    max_hops: u32,
}

impl TurnRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
        memory: MemoryAdapter,
    ) -> Self {
        let composer = PromptComposer::new(!tools.is_empty());
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tools,
            memory,
            context: ContextProvider::new(),
            composer,
            max_hops: 5,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the chat → tool → chat hop ceiling for a turn.
    pub fn with_max_hops(mut self, max: u32) -> Self {
        self.max_hops = max.max(1);
        self
    }

    pub fn with_context_provider(mut self, context: ContextProvider) -> Self {
        self.context = context;
        self
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Process one inbound user message to completion.
    ///
    /// The conversation is mutated in place: user message appended, system
    /// instruction refreshed, assistant/tool messages appended as the cycle
    /// runs. Returns the final assistant text.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        user_text: &str,
    ) -> Result<String, Error> {
        info!(
            thread_id = %conversation.thread_id,
            user_id = %conversation.user_id,
            messages = conversation.messages.len(),
            "Processing turn"
        );

        conversation.push(hearth_core::message::Message::user(user_text));

        // Refresh context and memory, then install the system instruction
        let snapshot = self.context.snapshot().await;
        conversation.context = snapshot.to_context_map();

        let stored = self.memory.fetch_all(&conversation.user_id).await;
        let relevant = self
            .memory
            .fetch_relevant(&conversation.user_id, user_text)
            .await;

        let system_prompt = self.composer.compose(&snapshot, &stored, &relevant);
        conversation.set_system(system_prompt);

        let tool_definitions = self.tools.definitions();
        let mut state = TurnState::AwaitingModel;
        let mut pending_calls: Vec<ToolCall> = Vec::new();
        let mut hops = 0u32;
        let final_text;

        loop {
            match state {
                TurnState::AwaitingModel => {
                    hops += 1;
                    if hops > self.max_hops {
                        warn!(
                            thread_id = %conversation.thread_id,
                            hops,
                            "Hop ceiling reached, ending turn"
                        );
                        conversation.push(hearth_core::message::Message::assistant(
                            HOP_CEILING_REPLY,
                        ));
                        final_text = HOP_CEILING_REPLY.to_string();
                        break;
                    }

                    debug!(thread_id = %conversation.thread_id, hop = hops, "Invoking model");

                    let request = ProviderRequest {
                        model: self.model.clone(),
                        messages: conversation.messages.clone(),
                        temperature: self.temperature,
                        max_tokens: self.max_tokens,
                        tools: tool_definitions.clone(),
                    };

                    // Model failure is fatal to the turn
                    let response = self.provider.complete(request).await?;
                    let message = response.message;

                    if message.requests_tools() {
                        pending_calls = message
                            .tool_calls
                            .iter()
                            .map(|tc| ToolCall {
                                id: tc.id.clone(),
                                name: tc.name.clone(),
                                arguments: serde_json::from_str(&tc.arguments)
                                    .unwrap_or_default(),
                            })
                            .collect();
                        conversation.push(message);
                        state = TurnState::AwaitingTool;
                    } else {
                        final_text = message.content.clone();
                        conversation.push(message);
                        state = TurnState::Done;
                        break;
                    }
                }

                TurnState::AwaitingTool => {
                    debug!(count = pending_calls.len(), "Executing tool calls");

                    for call in pending_calls.drain(..) {
                        let result_msg = match self.tools.execute(&call).await {
                            Ok(result) => hearth_core::message::Message::tool_result(
                                &call.id,
                                &result.output,
                            ),
                            Err(e) => {
                                // Tool failure is fed back to the model
                                warn!(tool = %call.name, error = %e, "Tool execution failed");
                                hearth_core::message::Message::tool_result(
                                    &call.id,
                                    format!("Error: {e}"),
                                )
                            }
                        };
                        conversation.push(result_msg);
                    }

                    state = TurnState::AwaitingModel;
                }

                TurnState::Done => unreachable!("loop exits on Done"),
            }
        }

        // Persist the exchange before handing the reply back; failures are
        // swallowed inside the adapter
        self.memory
            .record(&conversation.user_id, user_text, &final_text)
            .await;

        Ok(final_text)
    }
}
