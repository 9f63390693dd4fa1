//! Configuration loading
//!
//! This module provides:
//! - `AgentRuntimeConfig` - Runtime configuration for a single agent
//! - `Config` - Full application configuration loaded from config.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default Azure AI endpoint hosting the chat deployment
pub const DEFAULT_ENDPOINT: &str = "https://hosted-agent-deployment.services.ai.azure.com";

/// Default chat deployment name
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o-mini";

/// Desktop browser user agent sent with website fetches
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ENV_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
const ENV_DEPLOYMENT: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT_NAME";
const ENV_API_KEY: &str = "AZURE_OPENAI_API_KEY";

/// Runtime configuration for an Agent instance.
///
/// # Example
///
/// ```
/// use web_summarizer::AgentRuntimeConfig;
///
/// let config = AgentRuntimeConfig {
///     model: "gpt-4o-mini".to_string(),
///     max_tokens: 4096,
///     max_retries: 3,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct AgentRuntimeConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Total attempts per chat request (1 = no retry)
    pub max_retries: u32,
}

impl Default for AgentRuntimeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_DEPLOYMENT.to_string(),
            max_tokens: 4096,
            max_retries: 1,
        }
    }
}

impl AgentRuntimeConfig {
    /// Create runtime config from the application Config
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.deployment.clone(),
            max_tokens: config.llm.max_tokens,
            max_retries: config.llm.max_retries.max(1),
        }
    }
}

/// Main configuration structure loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub fetch: FetchConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config directory path (~/.config/web-summarizer)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("web-summarizer"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Apply Azure OpenAI environment variables on top of file values
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.llm.endpoint = endpoint;
        }
        if let Some(deployment) = lookup(ENV_DEPLOYMENT) {
            self.llm.deployment = deployment;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.llm.api_key = Some(api_key);
        }
    }
}

/// Hosted LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Azure AI / Azure OpenAI resource endpoint
    pub endpoint: String,
    /// Chat deployment (model) name
    pub deployment: String,
    pub auth: AuthMethod,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            auth: AuthMethod::Auto,
            api_key: None,
            max_tokens: 4096,
            max_retries: 1,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// API key when one is configured, Azure CLI token otherwise
    #[default]
    Auto,
    ApiKey,
    AzureCli,
}

/// Website fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum extracted characters handed to the model
    pub max_content_length: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub format: ContentFormat,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_content_length: 8000,
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            format: ContentFormat::Text,
        }
    }
}

/// Representation of extracted page content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    #[default]
    Text,
    Markdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Characters of fetched content shown in progress output
    pub preview_chars: usize,
    pub verbose: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            preview_chars: 100,
            verbose: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    /// EnvFilter directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("/tmp/web-summarizer.log"),
            filter: "info,web_summarizer=debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.llm.auth, AuthMethod::Auto);
        assert_eq!(config.fetch.max_content_length, 8000);
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.fetch.format, ContentFormat::Text);
        assert_eq!(config.workflow.preview_chars, 100);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[llm]
endpoint = "https://example.openai.azure.com"
deployment = "gpt-4o"
auth = "azure_cli"
max_retries = 3

[fetch]
max_content_length = 2000
format = "markdown"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.llm.endpoint, "https://example.openai.azure.com");
        assert_eq!(config.llm.deployment, "gpt-4o");
        assert_eq!(config.llm.auth, AuthMethod::AzureCli);
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.fetch.max_content_length, 2000);
        assert_eq!(config.fetch.format, ContentFormat::Markdown);
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
        assert!(config.workflow.verbose);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[workflow]\npreview_chars = 40\nverbose = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.workflow.preview_chars, 40);
        assert!(!config.workflow.verbose);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\nendpoint = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ENDPOINT, "https://override.openai.azure.com"),
            (ENV_DEPLOYMENT, "gpt-4.1"),
            (ENV_API_KEY, "secret"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.llm.endpoint, "https://override.openai.azure.com");
        assert_eq!(config.llm.deployment, "gpt-4.1");
        assert_eq!(config.llm.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.llm.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.llm.api_key, None);
    }

    #[test]
    fn test_runtime_config_clamps_retries() {
        let mut config = Config::default();
        config.llm.max_retries = 0;
        let runtime = AgentRuntimeConfig::from_config(&config);
        assert_eq!(runtime.max_retries, 1);
        assert_eq!(runtime.model, DEFAULT_DEPLOYMENT);
    }
}
