//! Credentials for the Earth Engine REST API
//!
//! Two sources are supported: a service account key, exchanged for short-lived
//! OAuth tokens through a signed JWT assertion, and a pre-issued access token
//! taken from configuration or the environment.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::EarthEngineConfig;
use crate::error::{AppError, Result};

const SCOPES: &str =
    "https://www.googleapis.com/auth/earthengine https://www.googleapis.com/auth/cloud-platform";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Fields of a service account JSON key that the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Auth(format!(
                "Failed to read service account key {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::Auth(format!("Invalid service account key: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() + REFRESH_MARGIN < at,
            None => true,
        }
    }
}

enum Source {
    ServiceAccount(PathBuf),
    Static(String),
    Missing,
}

/// Hands out bearer tokens, refreshing service account tokens before expiry
pub struct TokenProvider {
    source: Source,
    client: Client,
    key: RwLock<Option<Arc<ServiceAccountKey>>>,
    cached: RwLock<Option<CachedToken>>,
    /// Serializes token exchanges so concurrent callers share one refresh
    refresh: Mutex<()>,
}

impl TokenProvider {
    pub fn new(key_path: Option<PathBuf>, static_token: Option<String>, client: Client) -> Self {
        let source = match (key_path, static_token) {
            (Some(path), _) => Source::ServiceAccount(path),
            (None, Some(token)) => Source::Static(token),
            (None, None) => Source::Missing,
        };
        Self {
            source,
            client,
            key: RwLock::new(None),
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Resolve the credential source described by `config`.
    ///
    /// Nothing is read here; missing or unreadable credentials surface as
    /// auth errors on first use.
    pub fn from_config(config: &EarthEngineConfig, client: Client) -> Self {
        let key_path = config.service_account_key.as_ref().map(PathBuf::from);
        let static_token = config
            .access_token
            .clone()
            .or_else(|| std::env::var(&config.access_token_env).ok())
            .filter(|t| !t.is_empty());
        Self::new(key_path, static_token, client)
    }

    /// Service account key, read from disk on first use
    fn service_account_key(&self, path: &Path) -> Result<Arc<ServiceAccountKey>> {
        let loaded = self.key.read().clone();
        if let Some(key) = loaded {
            return Ok(key);
        }
        let key = Arc::new(ServiceAccountKey::from_file(path)?);
        *self.key.write() = Some(key.clone());
        Ok(key)
    }

    /// Project id embedded in the service account key, if it can be read
    pub fn key_project(&self) -> Option<String> {
        match &self.source {
            Source::ServiceAccount(path) => self
                .service_account_key(path)
                .ok()
                .and_then(|key| key.project_id.clone()),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.source {
            Source::ServiceAccount(_) => "service_account",
            Source::Static(_) => "access_token",
            Source::Missing => "none",
        }
    }

    fn fresh_cached(&self) -> Option<String> {
        let cached = self.cached.read().clone();
        cached.filter(CachedToken::is_fresh).map(|c| c.token)
    }

    /// Current bearer token, fetching a new one when needed
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.fresh_cached() {
            return Ok(token);
        }

        let _refresh = self.refresh.lock().await;
        // Another caller may have refreshed while we waited
        if let Some(token) = self.fresh_cached() {
            return Ok(token);
        }

        let fresh = match &self.source {
            Source::Static(token) => CachedToken {
                token: token.clone(),
                expires_at: None,
            },
            Source::ServiceAccount(path) => {
                let key = self.service_account_key(path)?;
                self.exchange(&key).await?
            }
            Source::Missing => {
                return Err(AppError::Auth(
                    "No Earth Engine credentials configured; set a service account key or an access token"
                        .to_string(),
                ))
            }
        };

        let token = fresh.token.clone();
        *self.cached.write() = Some(fresh);
        Ok(token)
    }

    async fn exchange(&self, key: &ServiceAccountKey) -> Result<CachedToken> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: SCOPES,
            aud: &key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::Auth(format!("Invalid service account private key: {}", e)))?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
            .map_err(|e| AppError::Auth(format!("Failed to sign token assertion: {}", e)))?;

        debug!(account = %key.client_email, "Exchanging service account assertion");

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token endpoint unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Malformed token response: {}", e)))?;

        info!(account = %key.client_email, expires_in = token.expires_in, "Obtained Earth Engine access token");

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Some(Instant::now() + Duration::from_secs(token.expires_in)),
        })
    }
}
