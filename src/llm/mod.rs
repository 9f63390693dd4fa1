//! LLM client and agent loop

mod agent;
mod client;
mod runner;
#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentStep, Usage};
pub use client::{azure_base_url, build_client, LlmConnection, LlmProvider};
pub use runner::run_agent;
