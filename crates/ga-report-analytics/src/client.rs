//! Reporting API client.

use crate::auth::TokenProvider;
use crate::query::ReportQuery;
use crate::raw::RawReport;
use async_trait::async_trait;
use ga_report_common::{ReportError, Result};
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, instrument};

/// Production `reports:batchGet` endpoint
pub const DEFAULT_ENDPOINT: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// Where raw reports come from
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Run one report query
    async fn fetch(&self, query: &ReportQuery) -> Result<RawReport>;
}

/// Configuration for the Reporting API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full batchGet URL
    pub endpoint: String,
    /// Request timeout in seconds (default: 60)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Authenticated Reporting API client
#[derive(Clone)]
pub struct AnalyticsClient {
    http: Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalyticsClient {
    /// Create a client with the given configuration and token provider
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        if config.timeout_secs == 0 {
            return Err(ReportError::config("Request timeout must be greater than 0"));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl ReportSource for AnalyticsClient {
    #[instrument(skip(self, query), fields(view_id = %query.view_id))]
    async fn fetch(&self, query: &ReportQuery) -> Result<RawReport> {
        query.validate()?;
        let token = self.tokens.access_token().await?;
        let body = query.to_request();
        debug!(
            dimensions = query.dimensions.len(),
            metrics = query.metrics.len(),
            "Sending batchGet request"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("batchGet returned {}", status);
            return Err(ReportError::api_with_status(
                format!("batchGet returned {}: {}", status, text.trim()),
                status.as_u16(),
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ReportError::network_with_source("Failed to read response body", e))?;
        let raw: RawReport = serde_json::from_str(&text)?;

        info!(rows = raw.row_count(), "Fetched report");
        Ok(raw)
    }
}
