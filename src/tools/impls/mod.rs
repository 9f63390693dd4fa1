mod weather;
mod website_content;

pub use super::handlers;
pub use super::pipeline::{Tool, ToolPipeline};

pub use weather::WeatherTool;
pub use website_content::WebsiteContentTool;
