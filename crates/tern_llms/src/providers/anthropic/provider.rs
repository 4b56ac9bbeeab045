//! Anthropic provider implementation

use super::convert::to_anthropic_request;
use super::stream::create_stream;
use super::types::AnthropicConfig;
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::{GenerateRequest, GenerateStream, Headers};
use async_trait::async_trait;
use reqwest::Client;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::EventSource;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Environment variable for API key
    pub const API_KEY_ENV: &'static str = "ANTHROPIC_API_KEY";
    /// Environment variable overriding the base URL
    pub const BASE_URL_ENV: &'static str = "ANTHROPIC_BASE_URL";

    /// Create a new Anthropic provider
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey("anthropic".to_string()));
        }

        let client = Client::new();
        Ok(Self { config, client })
    }

    /// Create provider from environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(Self::API_KEY_ENV)
            .map_err(|_| Error::MissingApiKey("anthropic".to_string()))?;

        let mut config = AnthropicConfig::new(api_key);
        if let Ok(base_url) = std::env::var(Self::BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Self::new(config)
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    fn request_headers(&self, request: &GenerateRequest) -> Headers {
        let mut extra = Headers::new();
        if !request.betas.is_empty() {
            extra.insert("anthropic-beta", request.betas.join(","));
        }
        self.build_headers(Some(&extra))
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    fn build_headers(&self, custom_headers: Option<&Headers>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("x-api-key", self.config.api_key.clone());
        headers.insert("anthropic-version", self.config.api_version.clone());
        headers.insert("content-type", "application/json");

        if let Some(custom) = custom_headers {
            headers.merge_with(custom);
        }

        headers
    }

    async fn stream(&self, request: GenerateRequest) -> Result<GenerateStream> {
        let url = format!("{}messages", self.config.base_url);
        let body = to_anthropic_request(&request);
        let headers = self.request_headers(&request);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "sending Anthropic request"
        );

        let req_builder = self
            .client
            .post(&url)
            .headers(headers.to_reqwest_headers())
            .json(&body);

        let mut event_source = EventSource::new(req_builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;
        event_source.set_retry_policy(Box::new(Never));

        create_stream(event_source).await
    }
}
