//! Configuration for loganalytics-rs
//!
//! [`LogAnalyticsConfig`] is the connection bundle handed to the publisher.
//! [`Settings`] is what the `loganalytics-publish` binary reads from disk;
//! the library itself never touches files or the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{LogAnalyticsError, Result};

/// Environment prefix for settings overrides, e.g.
/// `LOGANALYTICS__LOG_ANALYTICS__CLIENT_SECRET`
pub const ENV_PREFIX: &str = "LOGANALYTICS";

/// Connection settings for the Logs Ingestion API
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogAnalyticsConfig {
    /// Client ID of the service principal
    pub client_id: String,
    /// Client secret of the service principal
    pub client_secret: String,
    /// Tenant the service principal lives in
    pub tenant_id: String,
    /// Data Collection Endpoint (DCE) URL
    pub dce: String,
    /// Immutable ID of the Data Collection Rule (DCR)
    pub dcr_immutable_id: String,
    /// Stream receiving aggregate reports
    pub dcr_aggregate_stream: String,
    /// Stream receiving forensic reports
    pub dcr_forensic_stream: String,
}

impl LogAnalyticsConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
        dce: impl Into<String>,
        dcr_immutable_id: impl Into<String>,
        dcr_aggregate_stream: impl Into<String>,
        dcr_forensic_stream: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
            dce: dce.into(),
            dcr_immutable_id: dcr_immutable_id.into(),
            dcr_aggregate_stream: dcr_aggregate_stream.into(),
            dcr_forensic_stream: dcr_forensic_stream.into(),
        }
    }

    /// Names of the settings that are empty
    pub fn missing_settings(&self) -> Vec<&'static str> {
        [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("tenant_id", &self.tenant_id),
            ("dce", &self.dce),
            ("dcr_immutable_id", &self.dcr_immutable_id),
            ("dcr_aggregate_stream", &self.dcr_aggregate_stream),
            ("dcr_forensic_stream", &self.dcr_forensic_stream),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl fmt::Debug for LogAnalyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogAnalyticsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("dce", &self.dce)
            .field("dcr_immutable_id", &self.dcr_immutable_id)
            .field("dcr_aggregate_stream", &self.dcr_aggregate_stream)
            .field("dcr_forensic_stream", &self.dcr_forensic_stream)
            .finish()
    }
}

/// Which report categories the binary publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PublishConfig {
    #[serde(default = "default_true")]
    pub save_aggregate: bool,
    #[serde(default = "default_true")]
    pub save_forensic: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            save_aggregate: true,
            save_forensic: true,
        }
    }
}

impl PublishConfig {
    /// Apply command-line opt-outs; they can only disable a category
    pub fn with_overrides(self, no_aggregate: bool, no_forensic: bool) -> Self {
        Self {
            save_aggregate: self.save_aggregate && !no_aggregate,
            save_forensic: self.save_forensic && !no_forensic,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Settings file for the `loganalytics-publish` binary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub log_analytics: LogAnalyticsConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

impl Settings {
    /// Load settings from a TOML file, then apply `LOGANALYTICS__*`
    /// environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LogAnalyticsError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| LogAnalyticsError::Configuration(format!("Failed to load config: {}", e)))
    }

    /// Parse settings from a TOML string, without environment overrides
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| LogAnalyticsError::Configuration(format!("Failed to parse config: {}", e)))
    }
}
