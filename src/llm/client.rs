//! Azure OpenAI client setup
//!
//! genai's OpenAI adapter speaks the OpenAI chat-completions protocol, which
//! Azure serves under `<resource>/openai/v1/`. A service-target resolver
//! points every model name at that base URL with the resolved credential.

use std::time::Duration;

use anyhow::{Context, Result};
use genai::adapter::AdapterKind;
use genai::resolver::{AuthData, Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::Credentials;
use crate::config::LlmConfig;

/// Normalize a resource endpoint into the OpenAI-compatible base URL
pub fn azure_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/openai/v1") {
        format!("{}/", trimmed)
    } else {
        format!("{}/openai/v1/", trimmed)
    }
}

/// Build a genai client bound to the configured Azure endpoint
pub fn build_client(config: &LlmConfig, credentials: &Credentials) -> Client {
    let base_url = azure_base_url(&config.endpoint);
    let secret = credentials.auth_value().to_string();
    debug!("Routing chat requests to {}", base_url);

    let resolver = ServiceTargetResolver::from_resolver_fn(
        move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { model, .. } = service_target;
            Ok(ServiceTarget {
                endpoint: Endpoint::from_owned(base_url.clone()),
                auth: AuthData::from_single(secret.clone()),
                model: ModelIden::new(AdapterKind::OpenAI, model.model_name),
            })
        },
    );

    Client::builder()
        .with_service_target_resolver(resolver)
        .build()
}

/// Everything an agent needs to talk to the hosted model
pub struct LlmConnection {
    pub client: Client,
    pub request_timeout: Duration,
}

/// Shared source of LLM connections.
///
/// Holds the resolved credentials and refreshes expiring Azure CLI tokens
/// before handing out a client.
pub struct LlmProvider {
    config: LlmConfig,
    credentials: Mutex<Credentials>,
}

impl LlmProvider {
    pub fn new(config: LlmConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials: Mutex::new(credentials),
        }
    }

    /// Resolve credentials for the config and create a provider
    pub async fn connect(config: LlmConfig) -> Result<Self> {
        let credentials = Credentials::resolve(&config)
            .await
            .context("Failed to resolve LLM credentials")?;
        Ok(Self::new(config, credentials))
    }

    /// Get a connection, refreshing the token first if it has expired
    pub async fn connection(&self) -> Result<LlmConnection> {
        let mut credentials = self.credentials.lock().await;
        credentials
            .refresh_if_needed()
            .await
            .context("Failed to refresh LLM credentials")?;

        Ok(LlmConnection {
            client: build_client(&self.config, &credentials),
            request_timeout: Duration::from_secs(self.config.request_timeout_secs),
        })
    }
}
