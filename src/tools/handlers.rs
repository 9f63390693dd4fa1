//! Effect handlers used by the website and weather tools
//!
//! A handler owns the data for one effect and turns it into a [`Step`].

use tracing::warn;

use crate::config::FetchConfig;
use crate::tools::io;
use crate::tools::pipeline::{EffectHandler, Step};

// =============================================================================
// Control flow handlers
// =============================================================================

/// Set pipeline output
pub struct Output {
    pub content: String,
}

#[async_trait::async_trait]
impl EffectHandler for Output {
    async fn call(self: Box<Self>) -> Step {
        Step::Output(self.content)
    }
}

/// Fail the pipeline
pub struct Error {
    pub message: String,
}

#[async_trait::async_trait]
impl EffectHandler for Error {
    async fn call(self: Box<Self>) -> Step {
        Step::Error(self.message)
    }
}

// =============================================================================
// Network handlers
// =============================================================================

/// Fetch a website and extract its text.
///
/// Failures are reported to the model as ordinary output so it can relay
/// them, mirroring what a user would see.
pub struct FetchWebsiteContent {
    pub url: String,
    pub config: FetchConfig,
}

#[async_trait::async_trait]
impl EffectHandler for FetchWebsiteContent {
    async fn call(self: Box<Self>) -> Step {
        match io::fetch_website_content(&self.url, &self.config).await {
            Ok(content) => Step::Output(content),
            Err(e) if e.is_request_error() => {
                warn!("Fetching {} failed: {}", self.url, e);
                Step::Output(format!("Error fetching URL: {}", e))
            },
            Err(e) => {
                warn!("Processing {} failed: {}", self.url, e);
                Step::Output(format!("Error processing content: {}", e))
            },
        }
    }
}

// =============================================================================
// Demo handlers
// =============================================================================

/// Canned weather report for a location
pub struct ReportWeather {
    pub location: String,
}

#[async_trait::async_trait]
impl EffectHandler for ReportWeather {
    async fn call(self: Box<Self>) -> Step {
        Step::Output(format!(
            "The weather in {} is cloudy with a high of 15°C.",
            self.location
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_reports_request_errors_as_output() {
        let handler = Box::new(FetchWebsiteContent {
            url: "ftp://example.com".to_string(),
            config: FetchConfig::default(),
        });
        assert_eq!(
            handler.call().await,
            Step::Output(
                "Error fetching URL: Unsupported URL scheme: ftp. Only http and https are allowed."
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_report_weather() {
        let handler = Box::new(ReportWeather {
            location: "Seattle".to_string(),
        });
        assert_eq!(
            handler.call().await,
            Step::Output("The weather in Seattle is cloudy with a high of 15°C.".to_string())
        );
    }
}
