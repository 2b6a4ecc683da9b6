//! OAuth credentials for the Reporting API.
//!
//! Access tokens are read from a JSON cache file written by an earlier
//! consent. An expired token is refreshed through the token endpoint and the
//! cache is rewritten. There is no interactive consent flow: a missing cache
//! is an error naming the expected path.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ga_report_common::{ReportError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Token endpoint used when neither the cache nor the client secrets name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Anything that can hand out a bearer token
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid access token
    async fn access_token(&self) -> Result<String>;
}

/// A fixed token, for tests and short-lived tokens obtained elsewhere
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Content of the token cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedToken {
    /// Bearer token
    pub access_token: String,
    /// Long-lived token used to obtain new access tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiry of `access_token`; absent means it never expires
    #[serde(default)]
    pub token_expiry: Option<DateTime<Utc>>,
    /// OAuth client id used for refreshing
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth client secret used for refreshing
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Token endpoint
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl CachedToken {
    /// Whether the access token can still be used at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.token_expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
            None => true,
        }
    }
}

/// OAuth client identity from the API console's secrets file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    /// Client id
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Read the `installed` (or `web`) section of a client secrets file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::auth_with_source(
                format!("Cannot read client secrets {}", path.display()),
                e,
            )
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&content)?;
        file.installed.or(file.web).ok_or_else(|| {
            ReportError::auth(format!(
                "Client secrets {} has neither an 'installed' nor a 'web' section",
                path.display()
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Token provider backed by the cache file
#[derive(Debug, Clone)]
pub struct CredentialStore {
    cache_path: PathBuf,
    secrets_path: PathBuf,
    http: Client,
}

impl CredentialStore {
    /// Create a store over a cache file and a client secrets file
    pub fn new(cache_path: impl Into<PathBuf>, secrets_path: impl Into<PathBuf>) -> Self {
        Self::with_client(cache_path, secrets_path, Client::new())
    }

    /// Create a store that refreshes through the given HTTP client
    pub fn with_client(
        cache_path: impl Into<PathBuf>,
        secrets_path: impl Into<PathBuf>,
        http: Client,
    ) -> Self {
        Self {
            cache_path: cache_path.into(),
            secrets_path: secrets_path.into(),
            http,
        }
    }

    /// Read the cache file
    pub fn load_cache(&self) -> Result<CachedToken> {
        if !self.cache_path.exists() {
            return Err(ReportError::auth(format!(
                "No cached credentials at {}; authorize once and save the token there",
                self.cache_path.display()
            )));
        }
        let content = std::fs::read_to_string(&self.cache_path)?;
        serde_json::from_str(&content).map_err(|e| {
            ReportError::auth_with_source(
                format!("Malformed credential cache {}", self.cache_path.display()),
                e,
            )
        })
    }

    /// Overwrite the cache file
    pub fn save_cache(&self, token: &CachedToken) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.cache_path, serde_json::to_string_pretty(token)?)?;
        debug!("Wrote credential cache {}", self.cache_path.display());
        Ok(())
    }

    #[instrument(skip(self, cached))]
    async fn refresh(&self, cached: CachedToken) -> Result<CachedToken> {
        let refresh_token = cached.refresh_token.clone().ok_or_else(|| {
            ReportError::auth("Cached access token expired and no refresh token is stored")
        })?;

        let (client_id, client_secret, token_uri) =
            match (cached.client_id.clone(), cached.client_secret.clone()) {
                (Some(id), Some(secret)) => (
                    id,
                    secret,
                    cached.token_uri.clone().unwrap_or_else(default_token_uri),
                ),
                _ => {
                    let secrets = ClientSecrets::load(&self.secrets_path)?;
                    let uri = cached.token_uri.clone().unwrap_or(secrets.token_uri);
                    (secrets.client_id, secrets.client_secret, uri)
                }
            };

        info!("Refreshing access token");
        let response = self
            .http
            .post(&token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Token refresh rejected: {}", status);
            return Err(ReportError::auth(format!(
                "Token refresh failed with {}: {}",
                status,
                body.trim()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or(Some(refresh_token)),
            token_expiry: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            client_id: Some(client_id),
            client_secret: Some(client_secret),
            token_uri: Some(token_uri),
        })
    }
}

#[async_trait]
impl TokenProvider for CredentialStore {
    async fn access_token(&self) -> Result<String> {
        let cached = self.load_cache()?;
        if cached.is_fresh(Utc::now()) {
            return Ok(cached.access_token);
        }

        let refreshed = self.refresh(cached).await?;
        self.save_cache(&refreshed)?;
        Ok(refreshed.access_token)
    }
}
