// src/sink/kafka.rs
use anyhow::{Context, Result};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::ingest::types::{FeedMeta, Item};
use crate::sink::Sink;

/// Every record carries the same key; consumers partition however they like.
const RECORD_KEY: &str = "Item";

const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
pub struct KafkaOptions {
    pub broker: String,
    pub topic: String,
}

/// Broker sink. Holds one long-lived producer for the life of the sink and
/// flushes it at shutdown; `FutureProducer` is safe to share across tasks.
pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaSink {
    pub fn new(options: KafkaOptions) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &options.broker)
            .create()
            .with_context(|| format!("creating kafka producer for {}", options.broker))?;
        Ok(Self {
            producer,
            topic: options.topic,
        })
    }
}

#[async_trait::async_trait]
impl Sink for KafkaSink {
    async fn write(&self, _feed: &FeedMeta, item: &Item, _identifier: &str) -> Result<()> {
        let data = serde_json::to_vec(item).context("serializing item")?;
        let record = FutureRecord::to(&self.topic)
            .key(RECORD_KEY)
            .payload(data.as_slice());
        let (partition, offset) = self
            .producer
            .send(record, Timeout::After(SEND_TIMEOUT))
            .await
            .map_err(|(err, _msg)| err)
            .with_context(|| format!("publishing to topic {}", self.topic))?;
        debug!(topic = %self.topic, partition, offset, "published item");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "kafka"
    }

    async fn shutdown(&self) -> Result<()> {
        self.producer
            .flush(Timeout::After(FLUSH_TIMEOUT))
            .context("flushing kafka producer")
    }
}
