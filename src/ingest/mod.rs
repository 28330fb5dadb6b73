// src/ingest/mod.rs
pub mod fetch;
pub mod scheduler;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::dedup::DedupStore;
use crate::ident;
use crate::ingest::types::{FeedMeta, Item};
use crate::sink::Sink;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_ticks_total", "Polling ticks started.");
        describe_counter!("ingest_feed_errors_total", "Feed fetch/parse errors.");
        describe_counter!("ingest_items_total", "Items that passed the startup filter.");
        describe_counter!(
            "ingest_dedup_skipped_total",
            "Items skipped because the dedup store had seen them."
        );
        describe_counter!("ingest_dedup_errors_total", "Dedup store errors.");
        describe_counter!("sink_write_errors_total", "Failed sink writes.");
        describe_counter!("webhook_rate_limited_total", "Webhook 429 responses.");
    });
}

/// Startup-time item filter, chosen once from CLI flags.
#[derive(Clone, Copy, Debug)]
pub enum ItemFilter {
    /// Accept every item the parser returns.
    All,
    /// Accept only items published strictly after the given instant.
    NewerThan(DateTime<Utc>),
}

impl ItemFilter {
    pub fn accepts(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            // Strict comparison: an item published exactly at startup is
            // rejected, as is one without a parseable publish date.
            ItemFilter::NewerThan(since) => {
                item.published_parsed.is_some_and(|published| *since < published)
            }
        }
    }
}

/// The ingest pipeline: fetch, filter, dedup, fan out.
///
/// Shared read-only across feed and item tasks. Sinks are invoked
/// concurrently per item with no barrier between them; a slow sink never
/// holds up a fast one and there is no aggregated per-item result.
pub struct Pipeline {
    client: reqwest::Client,
    sinks: Vec<Arc<dyn Sink>>,
    dedup: Arc<dyn DedupStore>,
    filter: ItemFilter,
}

impl Pipeline {
    pub fn new(sinks: Vec<Arc<dyn Sink>>, dedup: Arc<dyn DedupStore>, filter: ItemFilter) -> Self {
        ensure_metrics_described();
        Self {
            client: reqwest::Client::new(),
            sinks,
            dedup,
            filter,
        }
    }

    /// Poll one feed: fetch, parse, and spawn a task per accepted item.
    /// Errors abandon this tick's work for the feed; the next tick retries.
    pub async fn poll_feed(self: &Arc<Self>, url: &str) {
        let parsed = match fetch::fetch_feed(&self.client, url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                counter!("ingest_feed_errors_total").increment(1);
                warn!(feed = %url, error = ?e, "feed poll failed");
                return;
            }
        };
        let feed = Arc::new(parsed.meta);
        for item in parsed.items {
            if !self.filter.accepts(&item) {
                continue;
            }
            counter!("ingest_items_total").increment(1);
            let pipeline = Arc::clone(self);
            let feed = Arc::clone(&feed);
            tokio::spawn(async move {
                pipeline.process_item(&feed, Arc::new(item)).await;
            });
        }
    }

    /// Dedup-check one item and fan it out to every sink.
    pub async fn process_item(&self, feed: &Arc<FeedMeta>, item: Arc<Item>) {
        let identifier = ident::identifier(&item.guid);
        match self.dedup.seen(&identifier).await {
            Ok(true) => {
                counter!("ingest_dedup_skipped_total").increment(1);
                debug!(%identifier, "already processed");
                return;
            }
            Ok(false) => {
                if let Err(e) = self.dedup.mark(&identifier).await {
                    counter!("ingest_dedup_errors_total").increment(1);
                    warn!(%identifier, error = ?e, "could not mark item, skipping until next poll");
                    return;
                }
            }
            Err(e) => {
                // Not marked, so the next poll gets another chance.
                counter!("ingest_dedup_errors_total").increment(1);
                warn!(%identifier, error = ?e, "dedup store unavailable, skipping item");
                return;
            }
        }
        self.fan_out(feed, item, identifier).await;
    }

    async fn fan_out(&self, feed: &Arc<FeedMeta>, item: Arc<Item>, identifier: String) {
        let mut writes = JoinSet::new();
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let feed = Arc::clone(feed);
            let item = Arc::clone(&item);
            let identifier = identifier.clone();
            writes.spawn(async move {
                if let Err(e) = sink.write(&feed, &item, &identifier).await {
                    counter!("sink_write_errors_total").increment(1);
                    warn!(sink = sink.name(), %identifier, error = ?e, "sink write failed");
                }
            });
        }
        while writes.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn item_published_at(ts: Option<DateTime<Utc>>) -> Item {
        Item {
            guid: "abc".into(),
            published_parsed: ts,
            ..Item::default()
        }
    }

    #[test]
    fn all_filter_accepts_undated_items() {
        assert!(ItemFilter::All.accepts(&item_published_at(None)));
    }

    #[test]
    fn new_only_is_strictly_after_startup() {
        let t0 = Utc.with_ymd_and_hms(2024, 8, 30, 12, 0, 0).unwrap();
        let filter = ItemFilter::NewerThan(t0);
        assert!(filter.accepts(&item_published_at(Some(t0 + Duration::seconds(1)))));
        assert!(!filter.accepts(&item_published_at(Some(t0))));
        assert!(!filter.accepts(&item_published_at(Some(t0 - Duration::seconds(1)))));
    }

    #[test]
    fn new_only_rejects_undated_items() {
        let t0 = Utc.with_ymd_and_hms(2024, 8, 30, 12, 0, 0).unwrap();
        assert!(!ItemFilter::NewerThan(t0).accepts(&item_published_at(None)));
    }
}
