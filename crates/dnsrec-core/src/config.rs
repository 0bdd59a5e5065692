//! Configuration types for dnsrec
//!
//! A task mirrors the arguments an orchestrator hands over for one run:
//!
//! ```yaml
//! api_url: http://dns.lan:8080
//! zone: lan
//! record: host1
//! value: [10.0.0.1, 10.0.0.2]
//! state: present
//! check_mode: false
//! ```

use crate::error::{Error, Result};
use crate::intent::DesiredIntent;
use serde::{Deserialize, Serialize};

/// Zone API connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the zone API, without the `/zones` suffix
    #[serde(rename = "api_url")]
    pub url: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Create a new API configuration with the default timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the API configuration
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::config("Argument 'api_url' is required"));
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(Error::config(format!(
                "Argument 'api_url' must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }

        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(Error::config(format!(
                "Request timeout must be between 1 and 600 seconds. Got: {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }
}

/// Reconciler behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Compute and report the diff but issue no mutating call
    #[serde(default)]
    pub check_mode: bool,
}

impl ReconcileOptions {
    /// Options for a preview-only run
    pub fn check() -> Self {
        Self { check_mode: true }
    }
}

/// Everything needed for one reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(flatten)]
    pub api: ApiConfig,

    #[serde(flatten)]
    pub intent: DesiredIntent,

    #[serde(flatten)]
    pub options: ReconcileOptions,
}

impl TaskConfig {
    /// Parse a YAML task document
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate connection settings and intent
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.intent.validate()
    }
}

fn default_timeout_secs() -> u64 {
    30
}
