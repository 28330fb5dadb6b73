// src/sink/s3.rs
use anyhow::{Context, Result};
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use serde::Deserialize;
use tracing::info;

use crate::ingest::types::{FeedMeta, Item};
use crate::sink::Sink;
use crate::template::PathTemplate;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Options {
    pub endpoint: String,
    pub region: String,
    pub accesskeyid: String,
    pub accesssecret: String,
    pub bucket: String,
    pub keyformat: String,
}

/// Object-storage sink. Path-style addressing and a configurable endpoint so
/// S3-compatible stores work, with static credentials.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    key_template: PathTemplate,
}

impl S3Sink {
    pub fn new(options: S3Options) -> Result<Self> {
        let key_template = PathTemplate::new(&options.keyformat)?;
        let credentials = Credentials::new(
            options.accesskeyid,
            options.accesssecret,
            None,
            None,
            "sink-options",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(options.region))
            .endpoint_url(options.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket: options.bucket,
            key_template,
        })
    }
}

#[async_trait::async_trait]
impl Sink for S3Sink {
    async fn write(&self, feed: &FeedMeta, item: &Item, identifier: &str) -> Result<()> {
        let prefix = self.key_template.render(item)?;
        let key = format!("{}/{}-{}.json", prefix, feed.title, identifier);
        let body = serde_json::to_vec(item).context("serializing item")?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("uploading object {}/{}", self.bucket, key))?;
        info!(bucket = %self.bucket, %key, "uploaded item");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
