// src/ingest/scheduler.rs
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use crate::ingest::Pipeline;

/// How often every configured feed is polled. A floor, not a ceiling: ticks
/// never wait for the previous tick's feed tasks to finish.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Spawn the polling loop. The first tick fires immediately; each tick
/// dispatches every feed to its own task.
pub fn spawn_poll_scheduler(
    pipeline: Arc<Pipeline>,
    feeds: Vec<String>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            counter!("ingest_ticks_total").increment(1);
            info!(feeds = feeds.len(), "poll tick");
            for url in &feeds {
                let pipeline = Arc::clone(&pipeline);
                let url = url.clone();
                tokio::spawn(async move {
                    pipeline.poll_feed(&url).await;
                });
            }
        }
    })
}
