//! Tool system with handler-based composition
//!
//! Tools are composed into pipelines of handlers that get run by the registry.

pub mod handlers;
mod impls;
pub mod io;
mod pipeline;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::FetchConfig;

pub use impls::{WeatherTool, WebsiteContentTool};
pub use pipeline::{EffectHandler, Step, Tool, ToolPipeline};

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    pub params: serde_json::Value,
}

/// Registry of available tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Tools for the content retrieval agent
    pub fn website_content(config: FetchConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(WebsiteContentTool::new(config)));
        registry
    }

    /// Tools for the weather demo agent
    pub fn weather() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(WeatherTool));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn values(&self) -> impl Iterator<Item = &dyn Tool> {
        self.tools.values().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool, returning the text handed back to the model.
    ///
    /// Unknown tools and pipeline errors are reported as `Error: ...` text
    /// rather than failing the conversation.
    pub async fn execute(&self, name: &str, params: serde_json::Value) -> String {
        let Some(tool) = self.get(name) else {
            warn!("Model requested unknown tool: {}", name);
            return format!("Error: Unknown tool: {}", name);
        };

        debug!("Executing tool {} params={}", name, params);
        match tool.compose(params).run().await {
            Ok(output) => output,
            Err(msg) => {
                warn!("Tool {} failed: {}", name, msg);
                format!("Error: {}", msg)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registries() {
        let registry = ToolRegistry::website_content(FetchConfig::default());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(WebsiteContentTool::NAME).is_some());
        assert!(registry.get(WeatherTool::NAME).is_none());

        assert!(ToolRegistry::weather().get(WeatherTool::NAME).is_some());
        assert!(ToolRegistry::empty().is_empty());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let output = ToolRegistry::empty().execute("rm_rf", json!({})).await;
        assert_eq!(output, "Error: Unknown tool: rm_rf");
    }

    #[tokio::test]
    async fn test_execute_weather() {
        let output = ToolRegistry::weather()
            .execute(WeatherTool::NAME, json!({ "location": "New York" }))
            .await;
        assert_eq!(output, "The weather in New York is cloudy with a high of 15°C.");
    }
}
