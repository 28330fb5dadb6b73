// src/sink/discord.rs
use anyhow::Result;
use serde::Deserialize;

use crate::ingest::types::{FeedMeta, Item};
use crate::sink::Sink;
use crate::webhook::{Embed, EmbedAuthor, WebhookClient, WebhookMessage};

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordOptions {
    pub url: String,
}

/// Chat-webhook sink: a thin enqueuer over the rate-limited webhook client.
/// Best suited to lower-frequency feeds; the bounded queue blocks the
/// fan-out once it fills.
pub struct DiscordSink {
    client: WebhookClient,
}

impl DiscordSink {
    pub fn new(options: DiscordOptions) -> Self {
        Self {
            client: WebhookClient::new(options.url),
        }
    }
}

#[async_trait::async_trait]
impl Sink for DiscordSink {
    async fn write(&self, feed: &FeedMeta, item: &Item, _identifier: &str) -> Result<()> {
        let authors = item
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let message = WebhookMessage {
            content: None,
            embeds: vec![Embed {
                title: format!("[{}] {}", feed.title, item.title),
                description: item.description.clone(),
                author: EmbedAuthor { name: authors },
                url: item.link.clone(),
                timestamp: item.published.clone(),
            }],
        };
        // Delivery failures are the worker's problem; enqueue only fails if
        // the worker is gone.
        self.client.enqueue(message).await
    }

    fn name(&self) -> &'static str {
        "discord"
    }

    async fn shutdown(&self) -> Result<()> {
        self.client.close().await;
        Ok(())
    }
}
