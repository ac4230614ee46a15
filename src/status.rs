// src/status.rs
//! Process-wide connectivity status: who are we talking to right now.
//!
//! The hub pairs a `watch` channel (live subscribers such as a status
//! indicator in the UI layer) with a small in-memory history ring so tests
//! and diagnostics can observe every transition, including short-lived
//! `Retrying` states a `watch` receiver could coalesce away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityStatus {
    Connected,
    Offline,
    Loading,
    Error,
    Retrying,
}

impl ConnectivityStatus {
    /// Default human-readable message for the status indicator.
    pub fn default_message(self) -> &'static str {
        match self {
            ConnectivityStatus::Connected => "Connected to the backend server",
            ConnectivityStatus::Offline => "Offline mode - using local data",
            ConnectivityStatus::Loading => "Loading data from the server...",
            ConnectivityStatus::Error => "Failed to connect to the server",
            ConnectivityStatus::Retrying => "Retrying...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ConnectivityStatus,
    pub message: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug)]
struct HubInner {
    tx: watch::Sender<StatusUpdate>,
    history: Mutex<Vec<StatusUpdate>>,
    cap: usize,
}

/// Shared hub the data service writes to and UI collaborators read from.
/// All writes go through [`StatusHub::update`] so every subscriber sees the
/// same sequence of transitions.
#[derive(Debug, Clone)]
pub struct StatusHub {
    inner: Arc<HubInner>,
}

impl StatusHub {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(cap: usize) -> Self {
        let initial = StatusUpdate {
            status: ConnectivityStatus::Loading,
            message: ConnectivityStatus::Loading.default_message().to_string(),
            changed_at: Utc::now(),
        };
        let (tx, _rx) = watch::channel(initial);
        Self {
            inner: Arc::new(HubInner {
                tx,
                history: Mutex::new(Vec::with_capacity(cap.min(10_000))),
                cap: cap.min(10_000),
            }),
        }
    }

    /// Record a transition and notify subscribers.
    pub fn update(&self, status: ConnectivityStatus, message: Option<String>) {
        let message = message.unwrap_or_else(|| status.default_message().to_string());
        let update = StatusUpdate {
            status,
            message: message.clone(),
            changed_at: Utc::now(),
        };

        tracing::debug!(status = ?status, %message, "connectivity status");

        {
            let mut v = self.inner.history.lock().expect("status history poisoned");
            v.push(update.clone());
            if v.len() > self.inner.cap {
                let excess = v.len() - self.inner.cap;
                v.drain(0..excess);
            }
        }
        // send_replace never fails even with zero receivers
        self.inner.tx.send_replace(update);
    }

    pub fn current(&self) -> StatusUpdate {
        self.inner.tx.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.current().status == ConnectivityStatus::Connected
    }

    pub fn is_offline(&self) -> bool {
        self.current().status == ConnectivityStatus::Offline
    }

    /// Live subscription for a status-indicator collaborator.
    pub fn subscribe(&self) -> watch::Receiver<StatusUpdate> {
        self.inner.tx.subscribe()
    }

    /// Last `n` transitions, oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<StatusUpdate> {
        let v = self.inner.history.lock().expect("status history poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }
}

impl Default for StatusHub {
    fn default() -> Self {
        Self::new()
    }
}

/// A link-level connectivity event from the host platform
/// (browser online/offline, NetworkManager, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Online,
    Offline,
}

/// Capability seam for ambient online/offline signals, so the data service
/// never talks to a platform event system directly.
pub trait ConnectivitySource: Send + Sync {
    fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<LinkEvent>;
}

/// Hand-driven source for tests and embedders without platform signals.
#[derive(Debug, Clone)]
pub struct ManualConnectivitySource {
    tx: tokio::sync::broadcast::Sender<LinkEvent>,
}

impl ManualConnectivitySource {
    pub fn new() -> Self {
        let (tx, _rx) = tokio::sync::broadcast::channel(16);
        Self { tx }
    }

    pub fn emit(&self, event: LinkEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for ManualConnectivitySource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivitySource for ManualConnectivitySource {
    fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<LinkEvent> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut src = self.tx.subscribe();
        tokio::spawn(async move {
            while let Ok(ev) = src.recv().await {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });
        rx
    }
}
