//! Web Summarizer - chain LLM agents to fetch a website and summarize it
//!
//! A *Get Content* agent retrieves a page through the `get_website_content`
//! tool, then a *Summarize Content* agent condenses the text into bullets.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use web_summarizer::{Config, LlmProvider, Progress, WebsiteSummarizerWorkflow};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load()?;
//!     config.apply_env();
//!
//!     let provider = Arc::new(LlmProvider::connect(config.llm.clone()).await?);
//!     let workflow = WebsiteSummarizerWorkflow::from_config(provider, &config);
//!
//!     let summary = workflow
//!         .run_with_progress("https://example.com", |progress| {
//!             if let Progress::ContentRetrieved { chars, .. } = progress {
//!                 println!("Retrieved {} characters", chars);
//!             }
//!         })
//!         .await?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod auth;
pub mod config;
pub mod llm;
pub mod prompts;
pub mod tools;
pub mod workflow;

// Re-export the public API
pub use agents::{
    ChatAgent, GetContentAgent, JokerAgent, SummarizeContentAgent, TextAgent, WeatherAgent,
};
pub use auth::Credentials;
pub use config::{AgentRuntimeConfig, Config};
pub use llm::{run_agent, Agent, AgentStep, LlmProvider, Usage};
pub use tools::{ToolCall, ToolRegistry};
pub use workflow::{Progress, WebsiteSummarizerWorkflow};
