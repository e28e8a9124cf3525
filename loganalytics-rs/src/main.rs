//! loganalytics-publish: push parsed DMARC reports to Log Analytics
//!
//! # Usage
//!
//! ```bash
//! loganalytics-publish --config loganalytics.toml --input reports.json
//!
//! # Aggregate reports only
//! loganalytics-publish -c loganalytics.toml -i reports.json --no-forensic
//! ```
//!
//! Any setting can be overridden from the environment, e.g.
//! `LOGANALYTICS__LOG_ANALYTICS__CLIENT_SECRET`.

use clap::Parser;
use loganalytics_rs::credential::DEFAULT_AUTHORITY_HOST;
use loganalytics_rs::{AzureConnector, LogAnalyticsClient, ParsingResults, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loganalytics-publish")]
#[command(about = "Publish DMARC reports to Azure Monitor Log Analytics", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, default_value = "loganalytics.toml")]
    config: PathBuf,

    /// Parsed reports (JSON with aggregate_reports / forensic_reports)
    #[arg(short, long)]
    input: PathBuf,

    /// Skip aggregate reports
    #[arg(long)]
    no_aggregate: bool,

    /// Skip forensic reports
    #[arg(long)]
    no_forensic: bool,

    /// Entra ID authority host
    #[arg(long, default_value = DEFAULT_AUTHORITY_HOST)]
    authority_host: String,

    /// Timeout for each token request and upload, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loganalytics_rs=info,loganalytics_publish=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config.display());
    let settings = Settings::load(&cli.config)?;

    let publish = settings
        .publish
        .with_overrides(cli.no_aggregate, cli.no_forensic);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;
    let connector = AzureConnector::new()
        .with_authority_host(cli.authority_host)
        .with_http_client(http);
    let client = LogAnalyticsClient::with_connector(settings.log_analytics, Arc::new(connector))?;

    let results = ParsingResults::from_file(&cli.input)?;
    if results.is_empty() {
        info!("No reports found in {}, nothing to publish", cli.input.display());
        return Ok(());
    }
    info!(
        "Loaded {} aggregate and {} forensic reports from {}",
        results.aggregate_reports.len(),
        results.forensic_reports.len(),
        cli.input.display()
    );

    client
        .publish_results(&results, publish.save_aggregate, publish.save_forensic)
        .await?;

    Ok(())
}
