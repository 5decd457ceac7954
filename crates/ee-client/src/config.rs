//! Client configuration.

use std::time::Duration;

use ee_common::{EeError, EeResult};
use serde::{Deserialize, Serialize};

/// Public REST endpoint of the imagery service.
pub const DEFAULT_BASE_URL: &str = "https://earthengine.googleapis.com";

/// Connection settings for the imagery service.
///
/// Credentials are issued outside this crate; the client only forwards an
/// existing bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root, without the `/v1` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Cloud project that owns the requests
    pub project: String,

    /// OAuth2 bearer token
    #[serde(skip_serializing)]
    pub access_token: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl ClientConfig {
    pub fn new(project: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            project: project.into(),
            access_token: access_token.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    pub fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// `{root}/v1/projects/{project}`
    pub fn project_url(&self) -> String {
        format!("{}/v1/projects/{}", self.root(), self.project)
    }

    /// Validate configuration.
    pub fn validate(&self) -> EeResult<()> {
        if self.project.trim().is_empty() {
            return Err(EeError::invalid("project", "must not be empty"));
        }
        if self.project.contains('/') {
            return Err(EeError::invalid("project", "must be a bare project id"));
        }
        if self.access_token.trim().is_empty() {
            return Err(EeError::invalid("access_token", "must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(EeError::invalid(
                "base_url",
                format!("'{}' is not an http(s) URL", self.base_url),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(EeError::invalid("timeout_secs", "must be > 0"));
        }
        Ok(())
    }
}
