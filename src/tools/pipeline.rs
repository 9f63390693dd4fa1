//! Handler composition for tools
//!
//! A tool call is composed into a queue of handlers. Each handler is a small
//! async unit of work that produces a [`Step`]; the runner pops handlers in
//! order until one finishes the pipeline:
//!
//! ```text
//! get_website_content = [
//!     FetchWebsiteContent,  // GET, extract text, truncate
//! ]
//! ```

use std::collections::VecDeque;

/// Result of running one handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Handler finished, continue with the next one
    Continue,
    /// Set the pipeline output
    Output(String),
    /// Abort the pipeline with an error
    Error(String),
}

/// A single unit of tool execution
#[async_trait::async_trait]
pub trait EffectHandler: Send {
    async fn call(self: Box<Self>) -> Step;
}

/// A tool the model can call.
///
/// Tools describe themselves to the model (name, description, JSON schema)
/// and compose a pipeline of handlers for each call.
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema for the tool's parameters
    fn schema(&self) -> serde_json::Value;

    /// Compose the handlers for a call with the given parameters
    fn compose(&self, params: serde_json::Value) -> ToolPipeline;
}

/// Ordered queue of handlers forming one tool execution
#[derive(Default)]
pub struct ToolPipeline {
    steps: VecDeque<Box<dyn EffectHandler>>,
}

impl ToolPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline that just returns an error
    pub fn error(message: impl Into<String>) -> Self {
        Self::new().then(super::handlers::Error {
            message: message.into(),
        })
    }

    /// Append a handler
    pub fn then<H: EffectHandler + 'static>(mut self, handler: H) -> Self {
        self.steps.push_back(Box::new(handler));
        self
    }

    /// Take the next handler to run
    fn pop(&mut self) -> Option<Box<dyn EffectHandler>> {
        self.steps.pop_front()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every handler in order, returning the final output.
    ///
    /// Errors abort the pipeline and are returned as `Err`.
    pub async fn run(mut self) -> Result<String, String> {
        let mut output = String::new();
        while let Some(handler) = self.pop() {
            match handler.call().await {
                Step::Continue => {},
                Step::Output(content) => output = content,
                Step::Error(msg) => return Err(msg),
            }
        }
        Ok(output)
    }
}

impl std::fmt::Debug for ToolPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolPipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::handlers::{Error, Output};

    struct Noop;

    #[async_trait::async_trait]
    impl EffectHandler for Noop {
        async fn call(self: Box<Self>) -> Step {
            Step::Continue
        }
    }

    #[tokio::test]
    async fn test_pipeline_runs_in_order() {
        let pipeline = ToolPipeline::new()
            .then(Noop)
            .then(Output { content: "first".to_string() })
            .then(Output { content: "second".to_string() });

        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.run().await, Ok("second".to_string()));
    }

    #[tokio::test]
    async fn test_error_short_circuits() {
        let pipeline = ToolPipeline::new()
            .then(Error { message: "boom".to_string() })
            .then(Output { content: "unreachable".to_string() });

        assert_eq!(pipeline.run().await, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_error_pipeline() {
        let pipeline = ToolPipeline::error("Invalid params: missing field `url`");
        assert_eq!(pipeline.len(), 1);
        assert_eq!(
            pipeline.run().await,
            Err("Invalid params: missing field `url`".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let pipeline = ToolPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.run().await, Ok(String::new()));
    }
}
