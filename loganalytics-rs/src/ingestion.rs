//! Logs Ingestion API client
//!
//! [`LogsIngestion`] is the upload seam the publisher talks to.
//! [`LogsIngestionClient`] implements it over HTTPS against a Data
//! Collection Endpoint, and [`AzureConnector`] builds a fresh
//! credential + client pair for every publish.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LogAnalyticsConfig;
use crate::credential::{ClientSecretCredential, CredentialError, DEFAULT_AUTHORITY_HOST};

/// Logs Ingestion API version
pub const API_VERSION: &str = "2023-01-01";

/// Ingestion errors
#[derive(Error, Debug)]
pub enum IngestionError {
    /// No bearer token could be obtained
    #[error(transparent)]
    Authentication(#[from] CredentialError),

    /// The request never got a response
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("({status}) {message}")]
    Response { status: u16, message: String },
}

/// Upload of records to one stream of a Data Collection Rule
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogsIngestion: Send + Sync {
    async fn upload(
        &self,
        rule_id: &str,
        stream_name: &str,
        logs: &[Value],
    ) -> Result<(), IngestionError>;
}

/// Builds the ingestion client used by a single publish
#[cfg_attr(test, mockall::automock)]
pub trait IngestionConnector: Send + Sync {
    fn connect(&self, config: &LogAnalyticsConfig) -> Box<dyn LogsIngestion>;
}

/// Standard Azure error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// HTTPS client for a Data Collection Endpoint
pub struct LogsIngestionClient {
    endpoint: String,
    credential: ClientSecretCredential,
    http: reqwest::Client,
}

impl LogsIngestionClient {
    pub fn new(endpoint: String, credential: ClientSecretCredential) -> Self {
        Self {
            endpoint,
            credential,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn upload_url(&self, rule_id: &str, stream_name: &str) -> String {
        format!(
            "{}/dataCollectionRules/{}/streams/{}?api-version={}",
            self.endpoint.trim_end_matches('/'),
            rule_id,
            stream_name,
            API_VERSION
        )
    }
}

#[async_trait]
impl LogsIngestion for LogsIngestionClient {
    async fn upload(
        &self,
        rule_id: &str,
        stream_name: &str,
        logs: &[Value],
    ) -> Result<(), IngestionError> {
        if logs.is_empty() {
            return Ok(());
        }

        let token = self.credential.get_token().await?;
        let url = self.upload_url(rule_id, stream_name);
        debug!("Uploading {} records to {}", logs.len(), url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token.token)
            .json(logs)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = describe_response_error(&body, status);
            warn!("Upload to stream {} failed with status {}", stream_name, status);
            return Err(IngestionError::Response {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Upload to stream {} accepted with status {}", stream_name, status);
        Ok(())
    }
}

fn describe_response_error(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error:
                ErrorDetail {
                    code: Some(code),
                    message: Some(message),
                },
        }) => format!("{}: {}", code, message),
        Ok(ErrorEnvelope {
            error: ErrorDetail {
                message: Some(message),
                ..
            },
        }) => message,
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        _ => body.to_string(),
    }
}

/// Connects to Azure Monitor with a new service principal credential per call
#[derive(Clone)]
pub struct AzureConnector {
    authority_host: String,
    http: reqwest::Client,
}

impl AzureConnector {
    pub fn new() -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_authority_host(mut self, authority_host: String) -> Self {
        self.authority_host = authority_host;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

impl Default for AzureConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionConnector for AzureConnector {
    fn connect(&self, config: &LogAnalyticsConfig) -> Box<dyn LogsIngestion> {
        let credential = ClientSecretCredential::new(
            config.tenant_id.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
        .with_authority_host(self.authority_host.clone())
        .with_http_client(self.http.clone());

        Box::new(
            LogsIngestionClient::new(config.dce.clone(), credential)
                .with_http_client(self.http.clone()),
        )
    }
}
