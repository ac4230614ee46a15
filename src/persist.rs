// src/persist.rs
//! Best-effort persisted player state: small JSON blobs by key.
//!
//! Read and write failures are logged and swallowed; callers always get a
//! value back. Losing a resume position is acceptable, failing playback over
//! it is not.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;

pub const LAST_PLAYED_KEY: &str = "video_playlist_last_played";
pub const VOLUME_KEY: &str = "video_playlist_volume";

/// Where playback left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackState {
    pub current_video_index: usize,
    pub current_time: f64,
    pub volume: f32,
}

/// File-backed key-value store, one JSON file per key under a state dir.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Persist `value` under `key`. Returns whether the write landed.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let bytes = match serde_json::to_vec_pretty(value) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(key, "serialize state: {e:#}");
                return false;
            }
        };
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(key, "state dir: {e:#}");
            return false;
        }
        if let Err(e) = tokio::fs::write(self.path_for(key), bytes).await {
            tracing::warn!(key, "write state: {e:#}");
            return false;
        }
        true
    }

    /// Load the value under `key`, or `default` when missing or unreadable.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                tracing::warn!(key, "corrupt state, using default: {e:#}");
                default
            }),
            Err(_) => default,
        }
    }

    pub async fn remove(&self, key: &str) {
        let _ = tokio::fs::remove_file(self.path_for(key)).await;
    }

    pub async fn save_last_played(&self, state: &PlaybackState) -> bool {
        self.save(LAST_PLAYED_KEY, state).await
    }

    pub async fn load_last_played(&self) -> PlaybackState {
        self.load(LAST_PLAYED_KEY, PlaybackState::default()).await
    }

    pub async fn save_volume(&self, volume: f32) -> bool {
        self.save(VOLUME_KEY, &volume.clamp(0.0, 1.0)).await
    }

    /// Saved volume in [0,1], defaulting to full volume.
    pub async fn load_volume(&self) -> f32 {
        self.load(VOLUME_KEY, 1.0_f32).await.clamp(0.0, 1.0)
    }
}
