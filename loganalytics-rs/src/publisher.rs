//! Publishing DMARC reports to Log Analytics via Data Collection Rules
//!
//! See <https://learn.microsoft.com/en-us/azure/azure-monitor/logs/logs-ingestion-api-overview>

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::LogAnalyticsConfig;
use crate::error::{LogAnalyticsError, Result};
use crate::ingestion::{AzureConnector, IngestionConnector, LogsIngestion};
use crate::results::ParsingResults;

/// Pushes parsed aggregate and forensic reports to their DCR streams
pub struct LogAnalyticsClient {
    conf: LogAnalyticsConfig,
    connector: Arc<dyn IngestionConnector>,
}

impl LogAnalyticsClient {
    /// Create a client talking to Azure Monitor
    ///
    /// Fails with [`LogAnalyticsError::Configuration`] if any of the seven
    /// settings is empty.
    pub fn new(conf: LogAnalyticsConfig) -> Result<Self> {
        Self::with_connector(conf, Arc::new(AzureConnector::new()))
    }

    /// Create a client using a custom ingestion connector
    pub fn with_connector(
        conf: LogAnalyticsConfig,
        connector: Arc<dyn IngestionConnector>,
    ) -> Result<Self> {
        let missing = conf.missing_settings();
        if !missing.is_empty() {
            debug!("Missing Log Analytics settings: {}", missing.join(", "));
            return Err(LogAnalyticsError::missing_settings());
        }

        Ok(Self { conf, connector })
    }

    pub fn config(&self) -> &LogAnalyticsConfig {
        &self.conf
    }

    /// Upload one record set to one stream of the configured DCR
    pub async fn publish_json(
        &self,
        results: &[Value],
        logs_client: &dyn LogsIngestion,
        dcr_stream: &str,
    ) -> Result<()> {
        logs_client
            .upload(&self.conf.dcr_immutable_id, dcr_stream, results)
            .await?;
        Ok(())
    }

    /// Publish aggregate and/or forensic reports
    ///
    /// A new credential and ingestion client are built on every call.
    /// Aggregate reports go first; if that upload fails the error is
    /// returned and forensic reports are not attempted.
    pub async fn publish_results(
        &self,
        results: &ParsingResults,
        save_aggregate: bool,
        save_forensic: bool,
    ) -> Result<()> {
        let conf = &self.conf;
        let logs_client = self.connector.connect(conf);

        if should_publish(&results.aggregate_reports, &conf.dcr_aggregate_stream, save_aggregate) {
            info!("Publishing aggregate reports.");
            self.publish_json(
                &results.aggregate_reports,
                logs_client.as_ref(),
                &conf.dcr_aggregate_stream,
            )
            .await?;
            info!("Successfully pushed aggregate reports.");
        }

        if should_publish(&results.forensic_reports, &conf.dcr_forensic_stream, save_forensic) {
            info!("Publishing forensic reports.");
            self.publish_json(
                &results.forensic_reports,
                logs_client.as_ref(),
                &conf.dcr_forensic_stream,
            )
            .await?;
            info!("Successfully pushed forensic reports.");
        }

        Ok(())
    }
}

/// A category is uploaded only when it has records, a stream and is enabled
fn should_publish(records: &[Value], stream: &str, enabled: bool) -> bool {
    !records.is_empty() && !stream.is_empty() && enabled
}
