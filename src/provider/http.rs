// HTTP provider client built on reqwest.
//
// Two JSON POST endpoints: `{base}/recommendations` and `{base}/predictions`.
// Requests carry a bounded timeout distinct from the pick timer; a timeout
// surfaces as a recoverable `ProviderError::Timeout`, never as a draft
// failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;

use super::{
    PredictRequest, Prediction, Provider, ProviderError, Recommendation, RecommendRequest,
};

/// Default per-request timeout when the config does not set one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// HttpProvider
// ---------------------------------------------------------------------------

/// Low-level JSON client for the recommendation/prediction service.
pub struct HttpProvider {
    http: reqwest::Client,
    base_url: String,
}

impl HttpProvider {
    /// Create a client against `base_url` with the given request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Http)?;
        Ok(HttpProvider {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }

        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<Vec<Recommendation>, ProviderError> {
        self.post_json("recommendations", request).await
    }

    async fn predict(&self, request: &PredictRequest) -> Result<Prediction, ProviderError> {
        self.post_json("predictions", request).await
    }
}

/// Classify a reqwest failure into the provider error taxonomy.
fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_decode() {
        ProviderError::Decode(err.to_string())
    } else {
        ProviderError::Http(err)
    }
}

// ---------------------------------------------------------------------------
// ProviderClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that is either an active HTTP client or disabled
/// (no provider section in the config). Disabled calls fail immediately
/// with the recoverable `Disabled` error; the draft itself is unaffected.
pub enum ProviderClient {
    Active(HttpProvider),
    Disabled,
}

impl ProviderClient {
    /// Build a client from the application config. Returns `Active` when a
    /// provider section is present, otherwise `Disabled`.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        match &config.provider {
            Some(provider_config) => {
                let timeout = Duration::from_secs(provider_config.timeout_secs);
                let client = HttpProvider::new(provider_config.base_url.clone(), timeout)?;
                Ok(ProviderClient::Active(client))
            }
            None => Ok(ProviderClient::Disabled),
        }
    }
}

#[async_trait]
impl Provider for ProviderClient {
    async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<Vec<Recommendation>, ProviderError> {
        match self {
            ProviderClient::Active(client) => client.recommend(request).await,
            ProviderClient::Disabled => Err(ProviderError::Disabled),
        }
    }

    async fn predict(&self, request: &PredictRequest) -> Result<Prediction, ProviderError> {
        match self {
            ProviderClient::Active(client) => client.predict(request).await,
            ProviderClient::Disabled => Err(ProviderError::Disabled),
        }
    }
}
