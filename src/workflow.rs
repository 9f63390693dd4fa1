//! Website summarizer workflow
//!
//! A two-step linear pipeline: a content agent fetches the page text, then a
//! summarizer agent condenses it into bullets. Steps run strictly in order
//! and the summarizer receives exactly what the content agent returned.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::agents::{GetContentAgent, SummarizeContentAgent, TextAgent};
use crate::config::{AgentRuntimeConfig, Config};
use crate::llm::LlmProvider;

/// Progress notifications emitted while the workflow runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Started { url: String },
    FetchingContent,
    ContentRetrieved { chars: usize, preview: String },
    Summarizing,
    SummaryReady,
}

/// Fetch-then-summarize pipeline
pub struct WebsiteSummarizerWorkflow {
    get_content: Box<dyn TextAgent>,
    summarize: Box<dyn TextAgent>,
    preview_chars: usize,
}

impl WebsiteSummarizerWorkflow {
    pub fn new(
        get_content: Box<dyn TextAgent>,
        summarize: Box<dyn TextAgent>,
        preview_chars: usize,
    ) -> Self {
        Self {
            get_content,
            summarize,
            preview_chars,
        }
    }

    /// Build the workflow with both LLM agents sharing one provider
    pub fn from_config(provider: Arc<LlmProvider>, config: &Config) -> Self {
        let runtime = AgentRuntimeConfig::from_config(config);
        Self::new(
            Box::new(GetContentAgent::new(
                provider.clone(),
                runtime.clone(),
                config.fetch.clone(),
            )),
            Box::new(SummarizeContentAgent::new(provider, runtime)),
            config.workflow.preview_chars,
        )
    }

    /// Fetch and summarize a URL
    pub async fn run(&self, url: &str) -> Result<String> {
        self.run_with_progress(url, |_| {}).await
    }

    /// Fetch and summarize a URL, reporting each stage to `on_progress`
    pub async fn run_with_progress(
        &self,
        url: &str,
        mut on_progress: impl FnMut(Progress) + Send,
    ) -> Result<String> {
        on_progress(Progress::Started {
            url: url.to_string(),
        });

        on_progress(Progress::FetchingContent);
        let content = self
            .get_content
            .run(url)
            .await
            .context("Get Content step failed")?;

        let chars = content.chars().count();
        info!("Retrieved {} chars of content for {}", chars, url);
        on_progress(Progress::ContentRetrieved {
            chars,
            preview: preview(&content, self.preview_chars),
        });

        on_progress(Progress::Summarizing);
        let summary = self
            .summarize
            .run(&content)
            .await
            .context("Summarize Content step failed")?;

        info!("Generated summary for {} ({} chars)", url, summary.len());
        on_progress(Progress::SummaryReady);
        Ok(summary)
    }
}

/// First `max_chars` characters, with "..." when the content is longer
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Records its inputs and answers with a fixed reply
    struct FakeAgent {
        reply: Result<String, String>,
        inputs: Arc<Mutex<Vec<String>>>,
    }

    impl FakeAgent {
        fn ok(reply: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
            let inputs = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    reply: Ok(reply.to_string()),
                    inputs: inputs.clone(),
                },
                inputs,
            )
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                inputs: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TextAgent for FakeAgent {
        async fn run(&self, input: &str) -> Result<String> {
            self.inputs.lock().unwrap().push(input.to_string());
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    #[tokio::test]
    async fn test_summarizer_receives_fetched_content() {
        let (content, content_inputs) = FakeAgent::ok("Example Domain. This domain is for examples.");
        let (summarizer, summary_inputs) = FakeAgent::ok("• An example domain");
        let workflow = WebsiteSummarizerWorkflow::new(Box::new(content), Box::new(summarizer), 100);

        let summary = workflow.run("https://example.com").await.unwrap();

        assert_eq!(summary, "• An example domain");
        assert_eq!(*content_inputs.lock().unwrap(), vec!["https://example.com"]);
        assert_eq!(
            *summary_inputs.lock().unwrap(),
            vec!["Example Domain. This domain is for examples."]
        );
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let (content, _) = FakeAgent::ok("abcdefghij");
        let (summarizer, _) = FakeAgent::ok("• summary");
        let workflow = WebsiteSummarizerWorkflow::new(Box::new(content), Box::new(summarizer), 4);

        let mut events = Vec::new();
        workflow
            .run_with_progress("https://example.com", |p| events.push(p))
            .await
            .unwrap();

        assert_eq!(
            events,
            vec![
                Progress::Started {
                    url: "https://example.com".to_string()
                },
                Progress::FetchingContent,
                Progress::ContentRetrieved {
                    chars: 10,
                    preview: "abcd...".to_string()
                },
                Progress::Summarizing,
                Progress::SummaryReady,
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_summarizer() {
        let (summarizer, summary_inputs) = FakeAgent::ok("unused");
        let workflow = WebsiteSummarizerWorkflow::new(
            Box::new(FakeAgent::failing("connection refused")),
            Box::new(summarizer),
            100,
        );

        let err = workflow.run("https://example.com").await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Get Content step failed"));
        assert!(message.contains("connection refused"));
        assert!(summary_inputs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_failure_is_reported() {
        let (content, _) = FakeAgent::ok("text");
        let workflow = WebsiteSummarizerWorkflow::new(
            Box::new(content),
            Box::new(FakeAgent::failing("rate limited")),
            100,
        );

        let err = workflow.run("https://example.com").await.unwrap_err();
        assert!(format!("{:#}", err).contains("Summarize Content step failed"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("abcdef", 6), "abcdef");
        assert_eq!(preview("abcdefg", 6), "abcdef...");
        assert_eq!(preview("ünïcödé", 3), "ünï...");
        assert_eq!(preview("", 10), "");
    }
}
