//! Earth Engine REST client

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::EarthEngineConfig;
use crate::error::{AppError, Result};
use crate::imagery::auth::TokenProvider;
use crate::imagery::expression::Expression;
use crate::imagery::traits::ImageryPlatform;

const LEGACY_PROJECT: &str = "earthengine-legacy";

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Client for `projects/*/value:compute`
pub struct EarthEngineClient {
    client: Client,
    base_url: String,
    configured_project: Option<String>,
    tokens: TokenProvider,
    initialized: AtomicBool,
}

impl EarthEngineClient {
    pub fn new(config: &EarthEngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let tokens = TokenProvider::from_config(config, client.clone());
        Ok(Self::with_tokens(config, client, tokens))
    }

    /// Build around an existing token provider
    pub fn with_tokens(config: &EarthEngineConfig, client: Client, tokens: TokenProvider) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            configured_project: config.project_id.clone(),
            tokens,
            initialized: AtomicBool::new(false),
        }
    }

    /// Cloud project billed for computations: configured id, then the key's
    /// own project, then the legacy shared project
    pub fn project(&self) -> String {
        self.configured_project
            .clone()
            .or_else(|| self.tokens.key_project())
            .unwrap_or_else(|| LEGACY_PROJECT.to_string())
    }

    fn compute_url(&self) -> String {
        format!("{}/v1/projects/{}/value:compute", self.base_url, self.project())
    }

    async fn get_headers(&self) -> Result<HeaderMap> {
        let token = self.tokens.token().await?;
        self.initialized.store(true, Ordering::Release);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| AppError::Auth(format!("Access token is not a valid header value: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

#[async_trait]
impl ImageryPlatform for EarthEngineClient {
    fn name(&self) -> &str {
        "earth-engine"
    }

    async fn initialize(&self) -> Result<()> {
        match self.tokens.token().await {
            Ok(_) => {
                self.initialized.store(true, Ordering::Release);
                info!(
                    project = %self.project(),
                    credentials = self.tokens.kind(),
                    "Earth Engine initialized"
                );
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize Earth Engine");
                Err(e)
            }
        }
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    async fn compute(&self, expression: &Expression) -> Result<Value> {
        let headers = self.get_headers().await?;
        let url = self.compute_url();

        debug!(url = %url, "Sending compute request");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&expression.to_request_body())
            .send()
            .await?;

        if response.status().is_success() {
            let body = response.json::<ComputeResponse>().await.map_err(|e| {
                error!(error = %e, "Failed to parse compute response");
                AppError::Platform(format!("Failed to parse response: {}", e))
            })?;
            Ok(body.result)
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| match env.error.status {
                    Some(code) => format!("{} ({})", env.error.message, code),
                    None => env.error.message,
                })
                .unwrap_or(text);

            warn!(status = %status, message = %message, "Compute request rejected");

            Err(AppError::Platform(format!(
                "Earth Engine returned {}: {}",
                status, message
            )))
        }
    }
}
