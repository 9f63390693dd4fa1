//! One-shot agents
//!
//! Each agent pairs a system prompt with a tool set. Running an agent starts
//! a fresh conversation, sends a single prompt and returns the final reply.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::config::{AgentRuntimeConfig, FetchConfig};
use crate::llm::{run_agent, Agent, LlmProvider};
use crate::prompts;
use crate::tools::ToolRegistry;

/// Something that turns input text into output text
#[async_trait]
pub trait TextAgent: Send + Sync {
    async fn run(&self, input: &str) -> Result<String>;
}

/// An LLM-backed agent with a fixed system prompt, tools and prompt template
pub struct ChatAgent {
    name: &'static str,
    provider: Arc<LlmProvider>,
    config: AgentRuntimeConfig,
    system_prompt: &'static str,
    tools: ToolRegistry,
    prompt_template: fn(&str) -> String,
}

impl ChatAgent {
    pub fn new(
        name: &'static str,
        provider: Arc<LlmProvider>,
        config: AgentRuntimeConfig,
        system_prompt: &'static str,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            name,
            provider,
            config,
            system_prompt,
            tools,
            prompt_template: str::to_string,
        }
    }

    /// Wrap every input with a prompt template before sending it
    pub fn with_prompt_template(mut self, template: fn(&str) -> String) -> Self {
        self.prompt_template = template;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The exact user prompt sent for an input
    pub fn prompt_for(&self, input: &str) -> String {
        (self.prompt_template)(input)
    }
}

#[async_trait]
impl TextAgent for ChatAgent {
    async fn run(&self, input: &str) -> Result<String> {
        let connection = self.provider.connection().await?;
        let mut agent = Agent::new(
            connection,
            self.config.clone(),
            self.system_prompt,
            self.tools.clone(),
        );

        info!("Running {} agent", self.name);
        agent.send_request(&self.prompt_for(input));
        run_agent(agent)
            .await
            .with_context(|| format!("{} agent failed", self.name))
    }
}

/// Tells jokes
pub struct JokerAgent(ChatAgent);

impl JokerAgent {
    pub fn new(provider: Arc<LlmProvider>, config: AgentRuntimeConfig) -> Self {
        Self(ChatAgent::new(
            "joker",
            provider,
            config,
            prompts::JOKER_SYSTEM_PROMPT,
            ToolRegistry::empty(),
        ))
    }
}

/// Answers weather questions through the `get_weather` tool
pub struct WeatherAgent(ChatAgent);

impl WeatherAgent {
    pub fn new(provider: Arc<LlmProvider>, config: AgentRuntimeConfig) -> Self {
        Self(ChatAgent::new(
            "weather",
            provider,
            config,
            prompts::WEATHER_SYSTEM_PROMPT,
            ToolRegistry::weather(),
        ))
    }
}

/// Retrieves website text through the `get_website_content` tool
pub struct GetContentAgent(ChatAgent);

impl GetContentAgent {
    pub fn new(
        provider: Arc<LlmProvider>,
        config: AgentRuntimeConfig,
        fetch: FetchConfig,
    ) -> Self {
        Self(
            ChatAgent::new(
                "get_content",
                provider,
                config,
                prompts::GET_CONTENT_SYSTEM_PROMPT,
                ToolRegistry::website_content(fetch),
            )
            .with_prompt_template(prompts::get_content_prompt),
        )
    }
}

/// Condenses text into a bulleted summary
pub struct SummarizeContentAgent(ChatAgent);

impl SummarizeContentAgent {
    pub fn new(provider: Arc<LlmProvider>, config: AgentRuntimeConfig) -> Self {
        Self(
            ChatAgent::new(
                "summarize_content",
                provider,
                config,
                prompts::SUMMARIZE_SYSTEM_PROMPT,
                ToolRegistry::empty(),
            )
            .with_prompt_template(prompts::summarize_prompt),
        )
    }
}

macro_rules! delegate_text_agent {
    ($($agent:ty),* $(,)?) => {
        $(
            #[async_trait]
            impl TextAgent for $agent {
                async fn run(&self, input: &str) -> Result<String> {
                    self.0.run(input).await
                }
            }

            impl std::ops::Deref for $agent {
                type Target = ChatAgent;

                fn deref(&self) -> &ChatAgent {
                    &self.0
                }
            }
        )*
    };
}

delegate_text_agent!(JokerAgent, WeatherAgent, GetContentAgent, SummarizeContentAgent);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::config::LlmConfig;
    use crate::tools::{WeatherTool, WebsiteContentTool};

    fn provider() -> Arc<LlmProvider> {
        Arc::new(LlmProvider::new(
            LlmConfig::default(),
            Credentials::ApiKey("test".to_string()),
        ))
    }

    #[test]
    fn test_agent_prompts() {
        let config = AgentRuntimeConfig::default();

        let joker = JokerAgent::new(provider(), config.clone());
        assert_eq!(joker.prompt_for("Tell me a joke"), "Tell me a joke");
        assert!(joker.tools.is_empty());

        let content = GetContentAgent::new(provider(), config.clone(), FetchConfig::default());
        assert_eq!(
            content.prompt_for("https://example.com"),
            "Please fetch and return the content from this URL: https://example.com"
        );
        assert!(content.tools.get(WebsiteContentTool::NAME).is_some());

        let summarizer = SummarizeContentAgent::new(provider(), config.clone());
        assert!(summarizer
            .prompt_for("text")
            .starts_with("Please summarize the following content"));
        assert_eq!(summarizer.name(), "summarize_content");

        let weather = WeatherAgent::new(provider(), config);
        assert!(weather.tools.get(WeatherTool::NAME).is_some());
        assert_eq!(weather.system_prompt, prompts::WEATHER_SYSTEM_PROMPT);
    }
}
