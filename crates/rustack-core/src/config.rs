//! Configuration management for the Rustack storage client layers.
//!
//! All configuration is driven by environment variables.

use std::fmt;
use std::str::FromStr;

use crate::error::RustackError;

/// Policy applied when a caller hands a non-bytes value to a request body
/// that only accepts pre-serialized bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyPolicy {
    /// Reject anything that is not raw bytes.
    #[default]
    BytesOnly,
    /// Accept any value, warn, and convert it the way older clients did.
    Legacy,
}

impl BodyPolicy {
    /// Returns the string value of this policy.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BytesOnly => "bytes-only",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for BodyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyPolicy {
    type Err = RustackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bytes-only" | "bytes_only" | "strict" => Ok(Self::BytesOnly),
            "legacy" => Ok(Self::Legacy),
            _ => Err(RustackError::Config(format!("unknown body policy: {s}"))),
        }
    }
}

/// Global configuration for the storage client layers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RustackConfig {
    /// Log level.
    pub log_level: String,
    /// Request body policy for byte-only parameters.
    pub body_policy: BodyPolicy,
}

impl Default for RustackConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            body_policy: BodyPolicy::default(),
        }
    }
}

impl RustackConfig {
    /// Load configuration from environment variables.
    ///
    /// Unknown `STORAGE_BODY_POLICY` values are ignored with a warning and the
    /// default policy is kept.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup, as [`Self::from_env`] does.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("STORAGE_BODY_POLICY") {
            match v.parse() {
                Ok(policy) => config.body_policy = policy,
                Err(e) => tracing::warn!(error = %e, "ignoring STORAGE_BODY_POLICY"),
            }
        }

        config
    }
}
