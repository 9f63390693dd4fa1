//! Website content tool

use serde::Deserialize;
use serde_json::json;

use super::{handlers, Tool, ToolPipeline};
use crate::config::FetchConfig;

/// Tool for fetching a website and returning its readable text
pub struct WebsiteContentTool {
    config: FetchConfig,
}

#[derive(Debug, Deserialize)]
struct WebsiteContentParams {
    url: String,
}

impl WebsiteContentTool {
    pub const NAME: &'static str = "get_website_content";

    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

impl Default for WebsiteContentTool {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl Tool for WebsiteContentTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Fetch and extract text content from a website URL. \
         Scripts, styles, navigation, headers and footers are removed. \
         Long pages are truncated."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The website URL to fetch content from"
                }
            },
            "required": ["url"]
        })
    }

    fn compose(&self, params: serde_json::Value) -> ToolPipeline {
        let parsed: WebsiteContentParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolPipeline::error(format!("Invalid params: {}", e)),
        };

        ToolPipeline::new().then(handlers::FetchWebsiteContent {
            url: parsed.url,
            config: self.config.clone(),
        })
    }
}
