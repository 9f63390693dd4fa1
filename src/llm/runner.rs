// Headless agent runner
//
// Drives an agent to completion without UI interaction, collecting output.

use anyhow::Result;
use tracing::{debug, error, info, warn};

use super::agent::{Agent, AgentStep};

/// Run an agent to completion, returning the text of its final turn.
///
/// This is the execution model for one-shot agents:
/// - Tool calls are executed immediately through the agent's registry
/// - Text from turns that ended in tool calls is discarded
/// - Returns when the agent finishes or errors
pub async fn run_agent(mut agent: Agent) -> Result<String> {
    let mut output = String::new();

    while let Some(step) = agent.next().await {
        match step {
            AgentStep::TextDelta(text) => {
                output.push_str(&text);
            },
            AgentStep::ToolRequest(calls) => {
                if !output.is_empty() {
                    debug!("Discarding {} chars of pre-tool text", output.len());
                    output.clear();
                }
                let tools = agent.tools().clone();
                for call in calls {
                    debug!("Agent tool call: {} params={}", call.name, call.params);
                    let result = tools.execute(&call.name, call.params).await;
                    debug!("Agent tool result: {} chars", result.len());
                    agent.submit_tool_result(&call.call_id, result);
                }
            },
            AgentStep::Finished { usage } => {
                info!(
                    "Agent finished: {} output, {} context tokens",
                    usage.output_tokens, usage.context_tokens
                );
                debug!("Conversation ended with {} messages", agent.message_count());
                break;
            },
            AgentStep::Error(msg) => {
                error!("Agent error: {}", msg);
                return Err(anyhow::anyhow!("Agent error: {}", msg));
            },
            AgentStep::Retrying { attempt, error } => {
                warn!("Agent retrying (attempt {}): {}", attempt, error);
            },
        }
    }

    Ok(output)
}
