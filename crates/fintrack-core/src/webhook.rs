//! External recommendation webhook
//!
//! An automation endpoint that produces free-text recommendations for a user.
//! The core analysis never depends on it; only the CLI `recommend` command
//! calls out.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::WebhookConfig;
use crate::error::{Error, Result};

/// Shown when the webhook is used without a base URL
pub const WEBHOOK_HINT: &str =
    "Set [webhook] base_url in fintrack.toml or the FINTRACK_WEBHOOK_URL environment variable";

/// Body posted to the webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    /// Local timestamp of the request
    pub time: String,
}

/// Webhook reply; either field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub alert_recommendations: Option<String>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_none() && self.alert_recommendations.is_none()
    }
}

/// Anything that can produce recommendations for a user
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn recommendations(&self, user_id: &str) -> Result<Recommendations>;
}

/// HTTP client for the recommendation webhook
#[derive(Clone)]
pub struct RecommendationClient {
    http_client: Client,
    endpoint: String,
}

impl RecommendationClient {
    /// Create a client posting to `{base_url}/{path}`
    pub fn new(base_url: &str, path: &str, timeout: std::time::Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
        })
    }

    /// Create from config; `None` when no base URL is configured
    pub fn from_config(config: &WebhookConfig) -> Result<Option<Self>> {
        match config.base_url.as_deref() {
            Some(base) => Ok(Some(Self::new(
                base,
                &config.recommendations_path,
                config.timeout,
            )?)),
            None => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecommendationSource for RecommendationClient {
    async fn recommendations(&self, user_id: &str) -> Result<Recommendations> {
        let request = RecommendationRequest {
            user_id: user_id.to_string(),
            time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        };

        debug!(endpoint = %self.endpoint, user_id, "Requesting recommendations");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Webhook(format!(
                "{} returned HTTP {}",
                self.endpoint, status
            )));
        }

        let body: Recommendations = response.json().await?;
        debug!(empty = body.is_empty(), "Received recommendations");
        Ok(body)
    }
}
