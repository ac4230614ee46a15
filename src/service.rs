// src/service.rs
//! The data service: strict two-tier acquisition with status transitions.
//!
//! One `fetch_videos` call walks `loading -> (connected | offline | error)`,
//! with `retrying` sub-states surfaced by the remote fetcher along the way.
//! Remote failure of any class falls through to the local dataset; only when
//! both tiers fail does the caller see an error, never a silent empty list.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::FetchError;
use crate::local::LocalDataReader;
use crate::model::{normalize, VideoRecord};
use crate::remote::{HealthReport, HttpTransport, RemoteFetcher};
use crate::status::{ConnectivitySource, ConnectivityStatus, LinkEvent, StatusHub};

/// One-time metrics registration (so series show up on an exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "playlist_fetch_retries_total",
            "Transient remote errors that led to a retry."
        );
        describe_counter!(
            "playlist_fetch_errors_total",
            "Remote fetch attempts exhausted or failed terminally."
        );
        describe_counter!(
            "playlist_fallback_total",
            "Fetches served from the local dataset."
        );
        describe_counter!(
            "playlist_cache_hits_total",
            "Fetches served from the response cache."
        );
    });
}

pub struct DataService {
    fetcher: RemoteFetcher,
    local: LocalDataReader,
    status: StatusHub,
    fallback_enabled: bool,
}

impl DataService {
    pub fn new(config: ServiceConfig) -> Result<Self, FetchError> {
        let status = StatusHub::new();
        let fetcher = RemoteFetcher::new(config.clone(), status.clone())?;
        Ok(Self::assemble(config, status, fetcher))
    }

    /// Build the service around a custom transport (tests, embedders).
    pub fn with_transport(
        config: ServiceConfig,
        status: StatusHub,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        let fetcher = RemoteFetcher::with_transport(config.clone(), status.clone(), transport);
        Self::assemble(config, status, fetcher)
    }

    fn assemble(config: ServiceConfig, status: StatusHub, fetcher: RemoteFetcher) -> Self {
        ensure_metrics_described();
        let local = LocalDataReader::new(config.fallback.local_data_path.clone());
        Self {
            fetcher,
            local,
            status,
            fallback_enabled: config.fallback.enabled,
        }
    }

    pub fn status(&self) -> &StatusHub {
        &self.status
    }

    pub fn clear_cache(&self) {
        self.fetcher.cache().clear();
    }

    /// Fetch and normalize the playlist. Remote first (cache-aware), local
    /// dataset second, terminal error when both tiers fail.
    pub async fn fetch_videos(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Vec<VideoRecord>, FetchError> {
        self.status.update(ConnectivityStatus::Loading, None);

        let remote_err = match self.fetcher.fetch(params).await {
            Ok(payload) => {
                self.status.update(ConnectivityStatus::Connected, None);
                return Ok(normalize(&payload));
            }
            Err(err) => err,
        };
        tracing::warn!(
            error = %remote_err,
            fallback = %self.local.path().display(),
            "backend unavailable, trying local fallback"
        );

        if !self.fallback_enabled {
            self.status.update(ConnectivityStatus::Error, None);
            return Err(remote_err);
        }

        match self.local.fetch().await {
            Ok(payload) => {
                counter!("playlist_fallback_total").increment(1);
                self.status.update(
                    ConnectivityStatus::Offline,
                    Some("Using local data (server unavailable)".to_string()),
                );
                Ok(normalize(&payload))
            }
            Err(local_err) => {
                tracing::error!(error = %local_err, "local fallback failed");
                self.status.update(
                    ConnectivityStatus::Error,
                    Some("Failed to load video data".to_string()),
                );
                Err(FetchError::fallback_failed(local_err))
            }
        }
    }

    /// Probe the backend health endpoint. Never fails.
    pub async fn health_check(&self) -> HealthReport {
        self.fetcher.health_check().await
    }

    /// Fold ambient online/offline signals into the status hub. The returned
    /// handle stops the watcher when dropped or aborted.
    pub fn watch_connectivity(
        &self,
        source: Arc<dyn ConnectivitySource>,
    ) -> tokio::task::JoinHandle<()> {
        let status = self.status.clone();
        let mut events = source.subscribe();
        tokio::spawn(async move {
            while let Some(ev) = events.recv().await {
                match ev {
                    LinkEvent::Online => status.update(
                        ConnectivityStatus::Connected,
                        Some("Internet connection restored".to_string()),
                    ),
                    LinkEvent::Offline => status.update(
                        ConnectivityStatus::Offline,
                        Some("No internet connection".to_string()),
                    ),
                }
            }
        })
    }
}
