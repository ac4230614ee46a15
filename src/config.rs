// src/config.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FetchError;

const ENV_CONFIG_PATH: &str = "PLAYLIST_CONFIG_PATH";
const ENV_BASE_URL: &str = "PLAYLIST_BASE_URL";
const ENV_PROFILE: &str = "PLAYLIST_PROFILE";

/// Deployment profile. Production keeps cached responses longer;
/// development allows a slower backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub videos: String,
    pub health: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            videos: "videos.php".to_string(),
            health: "health.php".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_ms: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: 5 * 60 * 1_000,
            key_prefix: "playlist_api_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub local_data_path: PathBuf,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            local_data_path: PathBuf::from("data/videos.json"),
        }
    }
}

/// Full service configuration. Every section has sane defaults, so a missing
/// or partial config file still yields a usable setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub endpoints: Endpoints,
    pub request: RequestConfig,
    pub cache: CacheConfig,
    pub fallback: FallbackConfig,
    pub state_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:81/video-playlist-app/backend/api/".to_string(),
            endpoints: Endpoints::default(),
            request: RequestConfig::default(),
            cache: CacheConfig::default(),
            fallback: FallbackConfig::default(),
            state_dir: PathBuf::from("state"),
        }
    }
}

impl ServiceConfig {
    /// Defaults adjusted per deployment profile.
    pub fn for_profile(profile: Profile) -> Self {
        let mut cfg = Self::default();
        match profile {
            Profile::Development => {
                // Longer timeout for a locally running backend
                cfg.request.timeout_ms = 15_000;
            }
            Profile::Production => {
                // 15 minutes cache in production
                cfg.cache.ttl_ms = 15 * 60 * 1_000;
            }
        }
        cfg
    }

    /// Load configuration from an explicit path. Supports TOML or JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, ext.as_str())?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Load configuration using env var + fallbacks:
    /// 1) $PLAYLIST_CONFIG_PATH
    /// 2) config/playlist.toml
    /// 3) config/playlist.json
    /// 4) profile defaults ($PLAYLIST_PROFILE, development if unset)
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("PLAYLIST_CONFIG_PATH points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/playlist.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/playlist.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }

        let profile = match std::env::var(ENV_PROFILE)
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Profile::Production,
            _ => Profile::Development,
        };
        let mut cfg = Self::for_profile(profile);
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var(ENV_BASE_URL) {
            if !base.trim().is_empty() {
                self.base_url = base;
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.request.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache.ttl_ms)
    }

    /// Full URL for the videos endpoint with query parameters appended.
    pub fn videos_url(&self, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        build_url(&self.base_url, &self.endpoints.videos, params)
    }

    /// Full URL for the health-check endpoint.
    pub fn health_url(&self) -> Result<Url, FetchError> {
        build_url(&self.base_url, &self.endpoints.health, &[])
    }
}

fn build_url(base: &str, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
    let mut joined = base.to_string();
    if !joined.ends_with('/') {
        joined.push('/');
    }
    joined.push_str(endpoint);

    let mut url = Url::parse(&joined).map_err(|e| FetchError::BadUrl(e.to_string()))?;
    if !params.is_empty() {
        let mut qp = url.query_pairs_mut();
        for (k, v) in params {
            qp.append_pair(k, v);
        }
    }
    Ok(url)
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ServiceConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("base_url =");
    if try_toml {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported config format"))
}
