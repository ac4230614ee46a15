// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod cache;
pub mod config;
pub mod error;
pub mod local;
pub mod model;
pub mod persist;
pub mod remote;
pub mod service;
pub mod status;

// ---- Re-exports for stable public API ----
pub use crate::config::{Profile, ServiceConfig};
pub use crate::error::FetchError;
pub use crate::model::{normalize, VideoId, VideoRecord};
pub use crate::persist::{PlaybackState, StateStore};
pub use crate::service::DataService;
pub use crate::status::{ConnectivityStatus, StatusHub, StatusUpdate};
