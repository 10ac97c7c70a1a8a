//! Chat session configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for `session_ttl_secs`. A prepared session is meant to be
/// redeemed right away.
pub const MAX_SESSION_TTL_SECS: u64 = 3600;

/// System prompt the single-step endpoint always puts first.
pub const DEFAULT_LEGACY_SYSTEM_PROMPT: &str = "You are a helpful AI robot assistant C-3PO from a time long, long ago in a galaxy far, far away. Stay concise unless you are specifically requested to provide a long-winded explanation. Do not greet the user. You do not need to say goodbye or return to anything else. Focus on answering directly and be brief.";

/// Chat session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Seconds a prepared session stays redeemable
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// System prompt for `GET /api/chat`
    #[serde(default = "default_legacy_system_prompt")]
    pub legacy_system_prompt: String,
}

impl ChatConfig {
    /// Get session TTL as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_SESSION_TTL_SECS).contains(&self.session_ttl_secs) {
            return Err(ValidationError::InvalidSessionTtl);
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            legacy_system_prompt: default_legacy_system_prompt(),
        }
    }
}

fn default_session_ttl() -> u64 {
    20
}

fn default_legacy_system_prompt() -> String {
    DEFAULT_LEGACY_SYSTEM_PROMPT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.session_ttl(), Duration::from_secs(20));
        assert!(config
            .legacy_system_prompt
            .starts_with("You are a helpful AI robot assistant C-3PO"));
    }

    #[test]
    fn test_validation_zero_ttl() {
        let config = ChatConfig {
            session_ttl_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidSessionTtl));
    }

    #[test]
    fn test_validation_ttl_upper_bound() {
        let at_max = ChatConfig {
            session_ttl_secs: MAX_SESSION_TTL_SECS,
            ..Default::default()
        };
        assert!(at_max.validate().is_ok());

        for session_ttl_secs in [MAX_SESSION_TTL_SECS + 1, u64::MAX] {
            let config = ChatConfig {
                session_ttl_secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidSessionTtl));
        }
    }
}
