//! Client configuration.

use std::env;
use std::time::Duration;

use anomaly_common::{AnomalyError, AnomalyResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How to reach the anomaly service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL, without the `/api/v1` path
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Ask the service for its synthetic field instead of GFS data
    #[serde(default)]
    pub use_mock: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            use_mock: false,
        }
    }
}

impl ClientConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `ANOMALY_API_URL`, `ANOMALY_TIMEOUT_SECS` and
    /// `ANOMALY_USE_MOCK` where set.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("ANOMALY_API_URL") {
            self.api_url = url;
        }
        if let Some(secs) = env::var("ANOMALY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.timeout_secs = secs;
        }
        if let Ok(v) = env::var("ANOMALY_USE_MOCK") {
            self.use_mock = v.to_lowercase() == "true" || v == "1";
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> AnomalyResult<()> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AnomalyError::invalid_config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AnomalyError::invalid_config("timeout_secs must be at least 1"));
        }
        Ok(())
    }

    /// Full endpoint URL.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/api/v1/temperature/anomaly",
            self.api_url.trim().trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ClientConfig {
            api_url: "http://example.com:8000/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint(),
            "http://example.com:8000/api/v1/temperature/anomaly"
        );
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::default().validate().is_ok());
        let bad = ClientConfig {
            api_url: "ftp://nope".to_string(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let zero = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"use_mock": true}"#).unwrap();
        assert!(config.use_mock);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
