//! Demo that runs one full acquisition cycle against the configured backend
//! (or the bundled dataset when the backend is down) and prints the playlist.

use anyhow::{Context, Result};
use video_playlist_data::{DataService, ServiceConfig, StateStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let config = ServiceConfig::load_default().context("loading service config")?;
    let state_dir = config.state_dir.clone();
    let service = DataService::new(config).context("building data service")?;

    let health = service.health_check().await;
    tracing::info!(state = ?health.state, status_code = ?health.status_code, "backend health");

    let videos = service
        .fetch_videos(&[])
        .await
        .context("fetching playlist")?;

    let status = service.status().current();
    println!("status: {:?} - {}", status.status, status.message);
    println!("{} video(s):", videos.len());
    for (i, v) in videos.iter().enumerate() {
        println!(
            "  {:>2}. [{}] {} ({}s, {}, {})",
            i + 1,
            v.id,
            v.title,
            v.duration,
            v.category,
            v.level
        );
    }

    // Remember where the playlist left off, best-effort.
    let store = StateStore::new(state_dir);
    let last = store.load_last_played().await;
    println!(
        "last played: index {} at {:.1}s (volume {:.2})",
        last.current_video_index, last.current_time, last.volume
    );

    Ok(())
}
