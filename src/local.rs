// src/local.rs
//! Fallback tier: the bundled JSON dataset shipped next to the app.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::error::FetchError;

pub struct LocalDataReader {
    path: PathBuf,
}

impl LocalDataReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the dataset and wrap it in the same success envelope the remote
    /// API produces, so the normalizer never cares where a payload came from.
    pub async fn fetch(&self) -> Result<Value, FetchError> {
        let display = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::NoData(format!("{display}: {e}")))?;

        let data: Value =
            serde_json::from_str(&content).map_err(|e| FetchError::Parse(e.to_string()))?;

        match data.as_array() {
            Some(videos) if !videos.is_empty() => Ok(json!({
                "success": true,
                "videos": videos,
                "message": "Data loaded from local file",
            })),
            _ => Err(FetchError::NoData(display)),
        }
    }
}
