//! Upstream completion API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::OpenAIConfig;

/// OpenAI-compatible upstream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// API key (requests fail upstream without one)
    pub api_key: Option<String>,

    /// Base URL of the `chat/completions` API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when the caller asks for none or for a non-free one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Connect timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Forwarded verbatim as `keep_alive`
    #[serde(default = "default_keep_alive")]
    pub keep_alive: Option<String>,

    /// `HTTP-Referer` attribution header
    pub site_url: Option<String>,

    /// `X-Title` attribution header
    pub site_name: Option<String>,

    /// Hidden reasoning effort; empty disables the reasoning block
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: Option<String>,

    /// Stop sequence; empty disables it
    #[serde(default = "default_stop")]
    pub stop: Option<String>,
}

impl UpstreamConfig {
    /// Get connect timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Builds the provider configuration. Empty optional values count as unset.
    pub fn provider_config(&self) -> OpenAIConfig {
        let mut config = OpenAIConfig::new(self.api_key.clone())
            .with_base_url(&self.base_url)
            .with_connect_timeout(self.timeout());

        config.site_url = non_empty(&self.site_url);
        config.site_name = non_empty(&self.site_name);
        config.keep_alive = non_empty(&self.keep_alive);
        config.reasoning_effort = non_empty(&self.reasoning_effort);
        config.stop = non_empty(&self.stop);
        config
    }

    /// Validate upstream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidUpstreamUrl);
        }
        if self.default_model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("UPSTREAM__DEFAULT_MODEL"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidUpstreamTimeout);
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            timeout_secs: default_timeout(),
            keep_alive: default_keep_alive(),
            site_url: None,
            site_name: None,
            reasoning_effort: default_reasoning_effort(),
            stop: default_stop(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "deepseek/deepseek-chat-v3-0324:free".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_keep_alive() -> Option<String> {
    Some("6000".to_string())
}

fn default_reasoning_effort() -> Option<String> {
    Some("medium".to_string())
}

fn default_stop() -> Option<String> {
    Some("</thinking>".to_string())
}
