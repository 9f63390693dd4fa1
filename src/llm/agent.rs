//! Agent loop for handling conversations with tool execution

use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use genai::chat::{
    ChatMessage, ChatOptions, ChatRequest, ChatRole, ChatStreamEvent, ChatStreamResponse,
    ContentPart, MessageContent, Tool, ToolCall as GenaiToolCall, ToolResponse,
};
use genai::Client;
use tracing::{debug, error, info, warn};

use crate::config::AgentRuntimeConfig;
use crate::tools::{ToolCall, ToolRegistry};

use super::client::LlmConnection;

impl From<&GenaiToolCall> for ToolCall {
    fn from(tc: &GenaiToolCall) -> Self {
        Self {
            call_id: tc.call_id.clone(),
            name: tc.fn_name.clone(),
            params: tc.fn_arguments.clone(),
        }
    }
}

/// Token usage tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// Cumulative output tokens across the conversation
    pub output_tokens: u32,
    /// Input tokens of the last request
    pub context_tokens: u32,
}

impl Usage {
    /// Format usage information for logging
    pub fn format_log(&self) -> String {
        format!(
            "Context: {} tokens, output: {}",
            self.context_tokens, self.output_tokens
        )
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.output_tokens += other.output_tokens;
        // Current state, not cumulative
        self.context_tokens = other.context_tokens;
    }
}

/// Steps yielded by the agent during processing
#[derive(Debug)]
pub enum AgentStep {
    /// Streaming text chunk
    TextDelta(String),
    /// Agent wants tools executed; submit results with `submit_tool_result`
    ToolRequest(Vec<ToolCall>),
    /// Retrying after error
    Retrying { attempt: u32, error: String },
    /// Agent finished processing this message
    Finished { usage: Usage },
    /// Error occurred
    Error(String),
}

/// Internal state for the agent stream
enum StreamState {
    /// Need to make a new chat API request
    NeedsChatRequest,
    /// Currently streaming response from API (stream stored separately for cancel-safety)
    Streaming,
    /// All tool requests emitted, waiting for results
    AwaitingToolResults,
}

/// Agent for handling conversations
pub struct Agent {
    client: Client,
    request_timeout: Duration,
    config: AgentRuntimeConfig,
    tools: ToolRegistry,
    messages: Vec<ChatMessage>,
    total_usage: Usage,
    /// Failed attempts for the pending chat request
    attempts: u32,

    // Streaming state (Some when actively processing)
    state: Option<StreamState>,
    active_stream:
        Option<futures::stream::BoxStream<'static, Result<ChatStreamEvent, genai::Error>>>,

    // Accumulated during streaming, consumed when tools complete
    streaming_text: String,
    streaming_tool_calls: Vec<GenaiToolCall>,
    tool_responses: Vec<ToolResponse>,
}

impl Agent {
    /// Create a new agent with a tool registry
    pub fn new(
        connection: LlmConnection,
        config: AgentRuntimeConfig,
        system_prompt: &str,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            client: connection.client,
            request_timeout: connection.request_timeout,
            config,
            tools,
            messages: vec![ChatMessage::system(system_prompt)],
            total_usage: Usage::default(),
            attempts: 0,

            state: None,
            active_stream: None,

            streaming_text: String::new(),
            streaming_tool_calls: Vec::new(),
            tool_responses: Vec::new(),
        }
    }

    /// Tools this agent exposes to the model
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get tool definitions in genai format
    fn get_tools(&self) -> Vec<Tool> {
        self.tools
            .values()
            .map(|tool| {
                Tool::new(tool.name())
                    .with_description(tool.description())
                    .with_schema(tool.schema())
            })
            .collect()
    }

    /// Send a user message to the agent
    /// Call next() repeatedly to get AgentSteps until None
    pub fn send_request(&mut self, user_input: &str) {
        self.messages.push(ChatMessage::user(user_input));
        self.attempts = 0;
        self.state = Some(StreamState::NeedsChatRequest);
    }

    /// Cancel the current streaming operation
    pub fn cancel(&mut self) {
        debug!("Agent::cancel");
        self.state = None;
        self.active_stream = None;
    }

    /// Get total usage statistics
    pub fn total_usage(&self) -> Usage {
        self.total_usage
    }

    /// Number of messages in the conversation, including the system prompt
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Convert genai Usage to our Usage struct (for a single turn, not cumulative)
    fn extract_turn_usage(genai_usage: &genai::chat::Usage) -> Usage {
        Usage {
            output_tokens: genai_usage.completion_tokens.unwrap_or(0).max(0) as u32,
            context_tokens: genai_usage.prompt_tokens.unwrap_or(0).max(0) as u32,
        }
    }

    fn chat_options(&self) -> ChatOptions {
        ChatOptions::default()
            .with_max_tokens(self.config.max_tokens)
            .with_capture_usage(true)
            .with_capture_tool_calls(true)
    }

    /// Open a chat stream for the current conversation.
    ///
    /// Takes &mut self so the future only requires Agent: Send (the stream
    /// is Send but not Sync).
    async fn exec_chat(&mut self) -> Result<ChatStreamResponse, String> {
        let mut request = ChatRequest::new(self.messages.clone());
        if !self.tools.is_empty() {
            request = request.with_tools(self.get_tools());
        }
        let chat_options = self.chat_options();

        match tokio::time::timeout(
            self.request_timeout,
            self.client
                .exec_chat_stream(&self.config.model, request, Some(&chat_options)),
        )
        .await
        {
            Ok(Ok(resp)) => Ok(resp),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(_) => Err(self.timeout_message()),
        }
    }

    fn timeout_message(&self) -> String {
        format!(
            "Request timed out after {} seconds",
            self.request_timeout.as_secs()
        )
    }

    /// Record a failed attempt at the pending chat request.
    ///
    /// Yields Retrying and re-arms the request while attempts remain,
    /// otherwise ends the turn with Error.
    fn fail_attempt(&mut self, err: String) -> AgentStep {
        self.active_stream = None;
        self.attempts += 1;
        error!("Chat request failed (attempt {}): {}", self.attempts, err);

        if self.attempts >= self.config.max_retries {
            self.state = None;
            return AgentStep::Error(format!("API error ({}): {}", self.config.model, err));
        }
        self.state = Some(StreamState::NeedsChatRequest);
        AgentStep::Retrying {
            attempt: self.attempts,
            error: err,
        }
    }

    /// Handle a failure while streaming.
    ///
    /// Before any text reached the caller the request is simply retried.
    /// Once text has been yielded a retry would repeat it, so the turn ends.
    fn fail_stream(&mut self, err: String) -> AgentStep {
        if self.streaming_text.is_empty() {
            return self.fail_attempt(err);
        }
        self.state = None;
        self.active_stream = None;
        AgentStep::Error(err)
    }

    /// Get the next step from the agent
    /// Returns None when idle or awaiting tool results
    ///
    /// This method is cancel-safe: if the future is dropped mid-poll,
    /// the agent remains in a valid state and can be polled again.
    pub async fn next(&mut self) -> Option<AgentStep> {
        loop {
            match self.state.as_ref()? {
                StreamState::NeedsChatRequest => {
                    debug!("Agent state: NeedsChatRequest, clearing streaming data");
                    self.streaming_text.clear();
                    self.streaming_tool_calls.clear();
                    self.tool_responses.clear();

                    match self.exec_chat().await {
                        Ok(response) => {
                            debug!("Agent state: NeedsChatRequest -> Streaming");
                            self.active_stream = Some(Box::pin(response.stream));
                            self.state = Some(StreamState::Streaming);
                        },
                        Err(err) => return Some(self.fail_attempt(err)),
                    }
                },

                StreamState::Streaming => {
                    let stream = self.active_stream.as_mut()?;

                    // The connection and response body are only driven here,
                    // so the timeout applies to every read
                    let read = tokio::time::timeout(self.request_timeout, stream.next());
                    let event = match read.await {
                        Ok(event) => event,
                        Err(_) => {
                            let err = self.timeout_message();
                            return Some(self.fail_stream(err));
                        },
                    };

                    match event {
                        Some(Ok(event)) => match event {
                            ChatStreamEvent::Chunk(chunk) => {
                                self.streaming_text.push_str(&chunk.content);
                                return Some(AgentStep::TextDelta(chunk.content));
                            },
                            ChatStreamEvent::End(end) => {
                                if let Some(ref genai_usage) = end.captured_usage {
                                    let turn_usage = Self::extract_turn_usage(genai_usage);
                                    self.total_usage += turn_usage;
                                    info!("{}", turn_usage.format_log());
                                } else {
                                    debug!("No captured_usage in End event");
                                }
                                if let Some(captured) = end.captured_into_tool_calls() {
                                    self.streaming_tool_calls = captured;
                                }
                            },
                            // Start, tool call fragments and reasoning are not surfaced
                            _ => {},
                        },
                        Some(Err(e)) => {
                            error!("Stream error: {:?}", e);
                            return Some(self.fail_stream(format!("Stream error: {}", e)));
                        },
                        None => {
                            self.active_stream = None;
                            self.attempts = 0;

                            if self.streaming_tool_calls.is_empty() {
                                if !self.streaming_text.is_empty() {
                                    self.messages.push(ChatMessage::assistant(
                                        self.streaming_text.clone(),
                                    ));
                                }
                                debug!(
                                    "Agent state: Streaming -> None (Finished), messages={}",
                                    self.messages.len()
                                );
                                self.state = None;
                                return Some(AgentStep::Finished {
                                    usage: self.total_usage,
                                });
                            }

                            let tool_calls: Vec<ToolCall> = self
                                .streaming_tool_calls
                                .iter()
                                .map(ToolCall::from)
                                .collect();
                            self.state = Some(StreamState::AwaitingToolResults);
                            return Some(AgentStep::ToolRequest(tool_calls));
                        },
                    }
                },

                StreamState::AwaitingToolResults => {
                    return None;
                },
            }
        }
    }

    /// Submit a tool execution result
    pub fn submit_tool_result(&mut self, call_id: &str, content: String) {
        debug!("Agent: submit_tool_result call_id={}", call_id);

        if !matches!(self.state, Some(StreamState::AwaitingToolResults)) {
            warn!("submit_tool_result called while not awaiting tool results");
        }

        // streaming_tool_calls must be non-empty, otherwise nothing asked for results
        if self.streaming_tool_calls.is_empty() {
            warn!("submit_tool_result called but no tool calls pending");
            return;
        }

        self.tool_responses
            .push(ToolResponse::new(call_id.to_string(), content));

        debug!(
            "Agent: tool_responses={}/{}",
            self.tool_responses.len(),
            self.streaming_tool_calls.len()
        );

        if self.tool_responses.len() >= self.streaming_tool_calls.len() {
            let mut msg_content = MessageContent::default();

            if !self.streaming_text.is_empty() {
                msg_content = msg_content.append(ContentPart::Text(self.streaming_text.clone()));
            }
            for tc in &self.streaming_tool_calls {
                msg_content = msg_content.append(ContentPart::ToolCall(tc.clone()));
            }

            self.messages.push(ChatMessage {
                role: ChatRole::Assistant,
                content: msg_content,
                options: None,
            });

            for response in std::mem::take(&mut self.tool_responses) {
                debug!("Agent: adding tool response - call_id={}", response.call_id);
                self.messages.push(ChatMessage::from(response));
            }

            debug!("Agent: state -> NeedsChatRequest (ready for continuation)");
            self.state = Some(StreamState::NeedsChatRequest);
        }
    }
}
