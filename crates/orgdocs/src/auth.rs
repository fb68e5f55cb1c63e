//! OAuth2 credential and token management.
//!
//! Client credentials live in an installed-app `credentials.json`; the
//! user's token is cached in `token.json` and round-tripped in the shape
//! Google's client libraries write. A cached token is used while valid,
//! refreshed via the refresh-token grant when expired, and obtained through
//! the interactive authorization-code flow when no cache exists at all.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Drive scope granting full read/write access over the document store.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client credentials in the provider's installed-app JSON shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub installed: InstalledApp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
}

impl Credentials {
    /// Load client credentials from disk. Re-read on every sync cycle.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Error loading client secret file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid credentials file {}", path.display()))
    }

    fn redirect_uri(&self) -> anyhow::Result<&str> {
        self.installed
            .redirect_uris
            .first()
            .map(String::as_str)
            .context("credentials file lists no redirect URIs")
    }
}

/// Cached OAuth token, persisted in the Google client-library JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry as epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl StoredToken {
    /// Expired (or close enough that a refresh is safer). Tokens without
    /// expiry metadata are treated as expired.
    pub fn is_expired(&self) -> bool {
        match self.expiry_date {
            Some(exp) => chrono::Utc::now().timestamp_millis() >= exp - 5 * 60 * 1000,
            None => true,
        }
    }
}

/// Token endpoint response for both the code-exchange and refresh grants.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_stored(self, prior_refresh: Option<&str>) -> StoredToken {
        let expiry_date = chrono::Utc::now().timestamp_millis() + self.expires_in * 1000;
        StoredToken {
            access_token: self.access_token,
            // The provider may rotate the refresh token; keep the old one
            // when the response omits it.
            refresh_token: self
                .refresh_token
                .or_else(|| prior_refresh.map(str::to_string)),
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: Some(expiry_date),
        }
    }
}

/// Sequential, single-flight authorization: cached token, refresh grant,
/// or interactive code exchange, in that order.
pub struct Authenticator {
    http: reqwest::Client,
    credentials_path: PathBuf,
    token_path: PathBuf,
    auth_url: String,
    token_url: String,
}

impl Authenticator {
    pub fn new(credentials_path: PathBuf, token_path: PathBuf) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials_path,
            token_path,
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Point the OAuth endpoints somewhere else (tests).
    pub fn with_endpoints(mut self, auth_url: &str, token_url: &str) -> Self {
        self.auth_url = auth_url.to_string();
        self.token_url = token_url.to_string();
        self
    }

    /// Produce a bearer access token, performing whatever flow is needed.
    ///
    /// May block indefinitely on the interactive prompt; the pipeline is
    /// strictly sequential so nothing else is waiting.
    #[instrument(skip(self), level = "debug")]
    pub async fn access_token(&self) -> anyhow::Result<String> {
        let credentials = Credentials::load(&self.credentials_path).await?;

        match self.load_cached_token().await {
            Some(token) if !token.is_expired() => {
                debug!("Using cached token from {}", self.token_path.display());
                Ok(token.access_token)
            }
            Some(token) => match &token.refresh_token {
                Some(refresh) => {
                    info!("Cached token expired, refreshing");
                    let refreshed = self.refresh(&credentials, refresh).await?;
                    self.persist_token(&refreshed).await?;
                    Ok(refreshed.access_token)
                }
                None => {
                    info!("Cached token expired and not refreshable, re-authorizing");
                    let token = self.interactive_flow(&credentials).await?;
                    Ok(token.access_token)
                }
            },
            None => {
                let token = self.interactive_flow(&credentials).await?;
                Ok(token.access_token)
            }
        }
    }

    async fn load_cached_token(&self) -> Option<StoredToken> {
        let bytes = tokio::fs::read(&self.token_path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!(
                    "Ignoring unreadable token file {}: {}",
                    self.token_path.display(),
                    e
                );
                None
            }
        }
    }

    async fn persist_token(&self, token: &StoredToken) -> anyhow::Result<()> {
        let json = serde_json::to_vec(token)?;
        tokio::fs::write(&self.token_path, json)
            .await
            .with_context(|| format!("Failed to store token to {}", self.token_path.display()))?;
        debug!("Stored token to {}", self.token_path.display());
        Ok(())
    }

    /// Build the consent URL the user must visit.
    pub fn authorization_url(&self, credentials: &Credentials) -> anyhow::Result<reqwest::Url> {
        let url = reqwest::Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", credentials.installed.client_id.as_str()),
                ("redirect_uri", credentials.redirect_uri()?),
                ("response_type", "code"),
                ("scope", DRIVE_SCOPE),
                ("access_type", "offline"),
            ],
        )?;
        Ok(url)
    }

    /// One-shot interactive authorization-code flow: show the consent URL,
    /// read the code from the terminal, exchange it, persist the result.
    async fn interactive_flow(&self, credentials: &Credentials) -> anyhow::Result<StoredToken> {
        let auth_url = self.authorization_url(credentials)?;
        println!("Authorize this app by visiting this url: {auth_url}");
        print!("Enter the code from that page here: ");
        std::io::stdout().flush()?;

        let mut code = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut code)
            .await
            .context("Failed to read authorization code from stdin")?;

        let token = self.exchange_code(credentials, code.trim()).await?;
        self.persist_token(&token).await?;
        info!("Authorization complete, token cached");
        Ok(token)
    }

    /// Exchange a one-time authorization code for a token pair.
    #[instrument(skip(self, credentials, code), level = "debug")]
    pub async fn exchange_code(
        &self,
        credentials: &Credentials,
        code: &str,
    ) -> anyhow::Result<StoredToken> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", credentials.installed.client_id.as_str()),
                ("client_secret", credentials.installed.client_secret.as_str()),
                ("redirect_uri", credentials.redirect_uri()?),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Error retrieving access token: {} {}", status, body);
        }

        let token: TokenResponse = resp.json().await?;
        Ok(token.into_stored(None))
    }

    /// Obtain a fresh access token via the refresh-token grant.
    #[instrument(skip(self, credentials, refresh_token), level = "debug")]
    pub async fn refresh(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> anyhow::Result<StoredToken> {
        let resp = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", credentials.installed.client_id.as_str()),
                ("client_secret", credentials.installed.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OAuth token refresh failed: {} {}", status, body);
        }

        let token: TokenResponse = resp.json().await?;
        Ok(token.into_stored(Some(refresh_token)))
    }
}
