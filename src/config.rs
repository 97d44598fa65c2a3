//! Client configuration

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Configuration shared by every request a client issues
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080/rdf4j-server")
    pub base_url: String,
    /// Default request timeout in milliseconds
    pub timeout_ms: u64,
    /// Basic-auth user name
    pub username: Option<String>,
    /// Basic-auth password
    pub password: Option<String>,
    /// Extra headers sent with every request
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/rdf4j-server".to_string(),
            timeout_ms: 30_000,
            username: None,
            password: None,
            default_headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given server URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Default request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the configuration before building a transport
    pub fn validate(&self) -> ClientResult<()> {
        let base = self.base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::Config("timeout_ms must be positive".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(ClientError::Config(
                "username and password must be set together".to_string(),
            ));
        }
        Ok(())
    }
}
