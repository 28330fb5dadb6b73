// src/ingest/fetch.rs
use anyhow::{Context, Result};
use chrono::SecondsFormat;

use crate::ingest::types::{FeedMeta, Item, ItemAuthor};

#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub meta: FeedMeta,
    pub items: Vec<Item>,
}

/// Fetch a feed URL and parse it into domain items.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<ParsedFeed> {
    let bytes = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("fetching feed {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching feed {url}"))?
        .bytes()
        .await
        .with_context(|| format!("reading feed body from {url}"))?;
    parse_feed(&bytes).with_context(|| format!("parsing feed {url}"))
}

/// Parse raw feed bytes (RSS, Atom, or JSON-Feed).
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = feed_rs::parser::parse(bytes)?;
    let meta = FeedMeta {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
    };
    let items = feed.entries.into_iter().map(map_entry).collect();
    Ok(ParsedFeed { meta, items })
}

fn map_entry(entry: feed_rs::model::Entry) -> Item {
    let published = entry.published;
    Item {
        guid: entry.id,
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        description: entry.summary.map(|t| t.content).unwrap_or_default(),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        authors: entry
            .authors
            .into_iter()
            .map(|p| ItemAuthor { name: p.name })
            .collect(),
        published: published
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default(),
        published_parsed: published,
    }
}
