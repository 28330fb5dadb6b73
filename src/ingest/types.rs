// src/ingest/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of feed-level metadata the pipeline actually reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMeta {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemAuthor {
    pub name: String,
}

/// A single feed entry, normalized from whatever dialect the parser saw.
///
/// `published` is the RFC 3339 rendering of `published_parsed` (the webhook
/// embed wants an ISO timestamp string); it is empty when the feed carried no
/// parseable publish date. The whole struct is what storage sinks serialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub guid: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub authors: Vec<ItemAuthor>,
    pub published: String,
    pub published_parsed: Option<DateTime<Utc>>,
}
