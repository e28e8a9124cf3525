//! Client-credential authentication against Microsoft Entra ID
//!
//! A [`ClientSecretCredential`] exchanges a service principal's id and
//! secret for a bearer token scoped to Azure Monitor. The token is fetched
//! on first use and kept for the lifetime of the credential only; callers
//! that want a fresh token build a fresh credential.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Entra ID authority for the public cloud
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Scope required by the Logs Ingestion API
pub const MONITOR_SCOPE: &str = "https://monitor.azure.com//.default";

/// Token acquisition errors
#[derive(Error, Debug)]
pub enum CredentialError {
    /// The token endpoint could not be reached or answered garbage
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The token endpoint refused the client credentials
    #[error("token endpoint returned {status}: {description}")]
    Rejected { status: u16, description: String },

    /// The token endpoint answered 2xx with an unusable token
    #[error("malformed token response: {0}")]
    Malformed(String),
}

/// Bearer token issued by the authority
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: ExpiresIn,
}

/// Entra ID has sent `expires_in` both as a number and as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Result<i64, CredentialError> {
        match self {
            ExpiresIn::Seconds(secs) => Ok(*secs),
            ExpiresIn::Text(text) => text.trim().parse().map_err(|_| {
                CredentialError::Malformed(format!("expires_in is not a number: {:?}", text))
            }),
        }
    }

    /// Absolute expiry measured from `now`
    fn expires_on(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, CredentialError> {
        let secs = self.seconds()?;
        Duration::try_seconds(secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| CredentialError::Malformed(format!("expires_in out of range: {}", secs)))
    }
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Service principal credential (tenant id + client id + client secret)
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    http: reqwest::Client,
    token: OnceCell<AccessToken>,
}

impl ClientSecretCredential {
    pub fn new(tenant_id: String, client_id: String, client_secret: String) -> Self {
        Self {
            tenant_id,
            client_id,
            client_secret,
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http: reqwest::Client::new(),
            token: OnceCell::new(),
        }
    }

    /// Use another authority (sovereign clouds, local test servers)
    pub fn with_authority_host(mut self, authority_host: String) -> Self {
        self.authority_host = authority_host;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// OAuth2 v2.0 token endpoint for the configured tenant
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }

    /// Bearer token for [`MONITOR_SCOPE`], requested on first call
    pub async fn get_token(&self) -> Result<AccessToken, CredentialError> {
        self.token
            .get_or_try_init(|| self.request_token())
            .await
            .cloned()
    }

    async fn request_token(&self) -> Result<AccessToken, CredentialError> {
        let url = self.token_url();
        debug!("Requesting access token from {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", MONITOR_SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let description = describe_token_error(&body);
            warn!("Token request failed with status {}: {}", status, description);
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                description,
            });
        }

        let token: TokenResponse = response.json().await?;
        let expires_on = token.expires_in.expires_on(Utc::now())?;
        debug!("Access token issued, valid until {}", expires_on);

        Ok(AccessToken {
            token: token.access_token,
            expires_on,
        })
    }
}

fn describe_token_error(body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(TokenErrorResponse {
            error_description: Some(description),
            ..
        }) => description,
        Ok(TokenErrorResponse {
            error: Some(error), ..
        }) => error,
        _ => body.to_string(),
    }
}
