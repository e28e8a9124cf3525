//! loganalytics-rs: DMARC report publishing to Azure Monitor
//!
//! Pushes parsed DMARC aggregate and forensic reports to Log Analytics
//! through the Logs Ingestion API, one Data Collection Rule stream per
//! report category.
//!
//! # Example
//!
//! ```no_run
//! use loganalytics_rs::{LogAnalyticsClient, LogAnalyticsConfig, ParsingResults};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LogAnalyticsClient::new(LogAnalyticsConfig::new(
//!         "client-id",
//!         "client-secret",
//!         "tenant-id",
//!         "https://dmarc-dce.westeurope-1.ingest.monitor.azure.com",
//!         "dcr-0123456789abcdef0123456789abcdef",
//!         "Custom-DMARCAggregate_CL",
//!         "Custom-DMARCForensic_CL",
//!     ))?;
//!
//!     let results = ParsingResults::from_file("output/reports.json")?;
//!     client.publish_results(&results, true, true).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Connection settings and the CLI settings file
//! - [`credential`]: Service principal token acquisition
//! - [`ingestion`]: Logs Ingestion API client
//! - [`publisher`]: Report publishing
//! - [`results`]: Parsed report bundle

pub mod config;
pub mod credential;
pub mod error;
pub mod ingestion;
pub mod publisher;
pub mod results;

pub use config::{LogAnalyticsConfig, Settings};
pub use error::{LogAnalyticsError, Result};
pub use ingestion::{AzureConnector, IngestionConnector, LogsIngestion};
pub use publisher::LogAnalyticsClient;
pub use results::ParsingResults;
