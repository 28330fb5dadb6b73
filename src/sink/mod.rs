// src/sink/mod.rs
pub mod discord;
pub mod file;
pub mod kafka;
pub mod s3;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::SinkDescriptor;
use crate::ingest::types::{FeedMeta, Item};

/// A configured destination for items.
///
/// `write` is best-effort and may block on network; the dispatcher invokes it
/// concurrently and discards errors after logging, so implementations must be
/// safe for concurrent calls.
#[async_trait::async_trait]
pub trait Sink: Send + Sync {
    async fn write(&self, feed: &FeedMeta, item: &Item, identifier: &str) -> Result<()>;

    /// Short tag for logs.
    fn name(&self) -> &'static str;

    /// Flush or drain internal state. Called once at process shutdown.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Build every configured sink, in declared order.
///
/// Kind dispatch is case-insensitive; an unknown kind or a sink that fails
/// construction is fatal to startup.
pub fn build_sinks(outputs: &[SinkDescriptor]) -> Result<Vec<Arc<dyn Sink>>> {
    let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(outputs.len());
    for descriptor in outputs {
        let sink: Arc<dyn Sink> = match descriptor.kind.to_ascii_lowercase().as_str() {
            "s3" => Arc::new(s3::S3Sink::new(decode_options("s3", &descriptor.config)?)?),
            "file" => Arc::new(file::FileSink::new(decode_options("file", &descriptor.config)?)?),
            "kafka" => Arc::new(kafka::KafkaSink::new(decode_options("kafka", &descriptor.config)?)?),
            "discord" => Arc::new(discord::DiscordSink::new(decode_options(
                "discord",
                &descriptor.config,
            )?)),
            other => bail!("unknown sink kind {other:?}"),
        };
        sinks.push(sink);
    }
    Ok(sinks)
}

/// Decode the flat string map into a typed options struct.
///
/// Keys match fields case-insensitively; unknown keys are ignored and missing
/// required keys fail construction.
fn decode_options<T: DeserializeOwned>(kind: &str, options: &BTreeMap<String, String>) -> Result<T> {
    let lowered: serde_json::Map<String, serde_json::Value> = options
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::from_value(serde_json::Value::Object(lowered))
        .with_context(|| format!("invalid options for {kind} sink"))
}
