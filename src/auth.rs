//! Credentials for the hosted chat endpoint
//!
//! Two sources are supported: a static Azure OpenAI API key, or a Microsoft
//! Entra access token obtained from a logged-in Azure CLI session.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{AuthMethod, LlmConfig};

/// Token audience for Azure AI / Azure OpenAI
const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no API key configured (set AZURE_OPENAI_API_KEY or llm.api_key)")]
    MissingApiKey,
    #[error("failed to run Azure CLI: {0}. Install it and run `az login`")]
    CliUnavailable(#[source] std::io::Error),
    #[error("Azure CLI exited with {status}: {stderr}")]
    CliFailed { status: String, stderr: String },
    #[error("unexpected Azure CLI output: {0}")]
    InvalidOutput(String),
}

/// Bearer token with its expiry
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Check if the token is expired (with a 60s buffer)
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Resolved credentials for LLM requests
#[derive(Debug, Clone)]
pub enum Credentials {
    ApiKey(String),
    Bearer(AccessToken),
}

impl Credentials {
    /// Resolve credentials according to the configured auth method
    pub async fn resolve(config: &LlmConfig) -> Result<Self, AuthError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());

        match (config.auth, api_key) {
            (AuthMethod::ApiKey | AuthMethod::Auto, Some(key)) => {
                debug!("Using API key credentials");
                Ok(Self::ApiKey(key.to_string()))
            },
            (AuthMethod::ApiKey, None) => Err(AuthError::MissingApiKey),
            (AuthMethod::AzureCli | AuthMethod::Auto, _) => {
                Ok(Self::Bearer(azure_cli_token().await?))
            },
        }
    }

    /// Refresh an expired Azure CLI token. Returns true if a refresh happened.
    pub async fn refresh_if_needed(&mut self) -> Result<bool, AuthError> {
        match self {
            Self::Bearer(token) if token.is_expired() => {
                info!("Access token expired, requesting a new one from Azure CLI");
                *token = azure_cli_token().await?;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    /// Secret presented as the `Authorization: Bearer` credential.
    ///
    /// The `/openai/v1/` surface accepts either an Entra token or the
    /// resource key here, so the key is sent once and never as `api-key`.
    pub fn auth_value(&self) -> &str {
        match self {
            Self::ApiKey(key) => key,
            Self::Bearer(token) => &token.token,
        }
    }
}

/// Shape of `az account get-access-token --output json`
#[derive(Debug, Deserialize)]
struct CliTokenOutput {
    #[serde(rename = "accessToken")]
    access_token: String,
    /// Epoch seconds (newer CLI versions)
    expires_on: Option<i64>,
    /// Local time, `YYYY-MM-DD HH:MM:SS.ffffff`
    #[serde(rename = "expiresOn")]
    expires_on_local: Option<String>,
}

/// Request an access token from the Azure CLI
async fn azure_cli_token() -> Result<AccessToken, AuthError> {
    let program = if cfg!(windows) { "az.cmd" } else { "az" };
    let output = Command::new(program)
        .args([
            "account",
            "get-access-token",
            "--resource",
            COGNITIVE_SERVICES_RESOURCE,
            "--output",
            "json",
        ])
        .output()
        .await
        .map_err(AuthError::CliUnavailable)?;

    if !output.status.success() {
        return Err(AuthError::CliFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let token = parse_cli_token(&String::from_utf8_lossy(&output.stdout))?;
    info!("Obtained Azure CLI access token (expires {})", token.expires_at);
    Ok(token)
}

fn parse_cli_token(stdout: &str) -> Result<AccessToken, AuthError> {
    let parsed: CliTokenOutput =
        serde_json::from_str(stdout).map_err(|e| AuthError::InvalidOutput(e.to_string()))?;

    let expires_at = match (parsed.expires_on, parsed.expires_on_local.as_deref()) {
        (Some(epoch), _) => Utc
            .timestamp_opt(epoch, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidOutput(format!("bad expires_on: {}", epoch)))?,
        (None, Some(local)) => parse_local_expiry(local)?,
        (None, None) => {
            return Err(AuthError::InvalidOutput("missing token expiry".to_string()))
        },
    };

    Ok(AccessToken {
        token: parsed.access_token,
        expires_at,
    })
}

fn parse_local_expiry(value: &str) -> Result<DateTime<Utc>, AuthError> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| AuthError::InvalidOutput(format!("bad expiresOn '{}': {}", value, e)))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AuthError::InvalidOutput(format!("ambiguous expiresOn: {}", value)))
}
