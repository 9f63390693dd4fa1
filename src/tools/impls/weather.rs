//! Demo weather tool

use serde::Deserialize;
use serde_json::json;

use super::{handlers, Tool, ToolPipeline};

/// Tool returning a canned weather report
pub struct WeatherTool;

#[derive(Debug, Deserialize)]
struct WeatherParams {
    location: String,
}

impl WeatherTool {
    pub const NAME: &'static str = "get_weather";
}

impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Get the weather for a given location."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get weather information for"
                }
            },
            "required": ["location"]
        })
    }

    fn compose(&self, params: serde_json::Value) -> ToolPipeline {
        let parsed: WeatherParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolPipeline::error(format!("Invalid params: {}", e)),
        };

        ToolPipeline::new().then(handlers::ReportWeather {
            location: parsed.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_weather_report() {
        let output = WeatherTool
            .compose(json!({ "location": "Tokyo" }))
            .run()
            .await;
        assert_eq!(
            output,
            Ok("The weather in Tokyo is cloudy with a high of 15°C.".to_string())
        );
    }

    #[tokio::test]
    async fn test_weather_requires_location() {
        let output = WeatherTool.compose(json!({})).run().await;
        assert!(output.unwrap_err().contains("missing field `location`"));
    }
}
