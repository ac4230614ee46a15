// src/remote.rs
//! Remote tier: HTTP GET against the backend API with timeout, transient
//! retry and structural validation, consulting the response cache first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::ServiceConfig;
use crate::error::FetchError;
use crate::status::{ConnectivityStatus, StatusHub};

const HEALTH_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between the fetcher and the actual HTTP stack, so retry, caching and
/// validation can be exercised against a scripted transport in tests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError>;
}

/// Production transport on a shared `reqwest::Client`. The per-request
/// timeout doubles as the abort path: when it fires, reqwest drops the
/// in-flight call and its timer on the spot.
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_millis() as u64)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| self.classify(e))?;
        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub state: HealthState,
    pub status_code: Option<u16>,
    pub checked_at: DateTime<Utc>,
}

pub struct RemoteFetcher {
    transport: Box<dyn HttpTransport>,
    cache: Arc<ResponseCache>,
    status: StatusHub,
    config: ServiceConfig,
}

impl RemoteFetcher {
    pub fn new(config: ServiceConfig, status: StatusHub) -> Result<Self, FetchError> {
        let transport = Box::new(ReqwestTransport::new(config.timeout())?);
        Ok(Self::with_transport(config, status, transport))
    }

    pub fn with_transport(
        config: ServiceConfig,
        status: StatusHub,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        let cache = Arc::new(ResponseCache::new(
            config.cache_ttl(),
            config.cache.enabled,
            config.cache.key_prefix.clone(),
        ));
        Self {
            transport,
            cache,
            status,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Raw videos payload, from cache if fresh, otherwise from the network.
    /// Only transport-level failures are retried; everything else propagates
    /// on the first attempt.
    pub async fn fetch(&self, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = self.config.videos_url(params)?;
        let signature = self.cache.signature(url.as_str());

        if let Some(payload) = self.cache.get(&signature) {
            tracing::debug!(%url, "using cached payload");
            return Ok(payload);
        }

        let max_retries = self.config.request.retry_attempts;
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(&url).await {
                Ok(payload) => {
                    self.cache.put(&signature, payload.clone());
                    return Ok(payload);
                }
                Err(err) if err.is_transient() && attempt < max_retries => {
                    attempt += 1;
                    counter!("playlist_fetch_retries_total").increment(1);
                    tracing::warn!(%url, attempt, max_retries, error = %err, "transient fetch error, retrying");
                    self.status.update(
                        ConnectivityStatus::Retrying,
                        Some(format!("Retrying... ({attempt}/{max_retries})")),
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(err) => {
                    counter!("playlist_fetch_errors_total").increment(1);
                    return Err(err);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<Value, FetchError> {
        let resp = self.transport.get(url).await?;
        if !(200..300).contains(&resp.status) {
            return Err(FetchError::Server {
                status: resp.status,
            });
        }
        let payload: Value =
            serde_json::from_str(&resp.body).map_err(|e| FetchError::Parse(e.to_string()))?;
        validate_payload(&payload)?;
        Ok(payload)
    }

    /// Best-effort health probe of the backend. Never fails.
    pub async fn health_check(&self) -> HealthReport {
        let checked_at = Utc::now();
        let url = match self.config.health_url() {
            Ok(u) => u,
            Err(_) => {
                return HealthReport {
                    state: HealthState::Unavailable,
                    status_code: None,
                    checked_at,
                }
            }
        };
        let outcome = tokio::time::timeout(HEALTH_DEADLINE, self.transport.get(&url)).await;
        match outcome {
            Ok(Ok(resp)) => HealthReport {
                state: if (200..300).contains(&resp.status) {
                    HealthState::Healthy
                } else {
                    HealthState::Unhealthy
                },
                status_code: Some(resp.status),
                checked_at,
            },
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "health check failed");
                HealthReport {
                    state: HealthState::Unavailable,
                    status_code: None,
                    checked_at,
                }
            }
            Err(_elapsed) => HealthReport {
                state: HealthState::Unavailable,
                status_code: None,
                checked_at,
            },
        }
    }
}

/// Structural contract for the videos endpoint: a `success` field is
/// mandatory; a successful envelope must carry a `videos` array, a failed
/// one must carry an `error` message.
fn validate_payload(payload: &Value) -> Result<(), FetchError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| FetchError::InvalidResponse("response body is not an object".into()))?;

    let success = obj
        .get("success")
        .ok_or_else(|| FetchError::InvalidResponse("missing `success` field".into()))?;

    if success.as_bool().unwrap_or(false) {
        match obj.get("videos") {
            Some(v) if v.is_array() => Ok(()),
            Some(_) => Err(FetchError::InvalidResponse(
                "`videos` field is not an array".into(),
            )),
            None => Err(FetchError::InvalidResponse("missing `videos` field".into())),
        }
    } else if obj.contains_key("error") {
        Ok(())
    } else {
        Err(FetchError::InvalidResponse(
            "failure envelope without `error` field".into(),
        ))
    }
}
