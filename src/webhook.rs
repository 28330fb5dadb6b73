// src/webhook.rs
use anyhow::{anyhow, Result};
use metrics::counter;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Default queue depth. Producers block once this many messages are pending,
/// which backpressures the fan-out instead of growing memory.
const DEFAULT_CAPACITY: usize = 1000;

/// Fallback delay when a 429 body cannot be parsed.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmbedAuthor {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// One embed, shaped after the Discord channel embed object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub author: EmbedAuthor,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

enum Queued {
    Deliver(WebhookMessage),
    Shutdown,
}

/// A rate-limited webhook client.
///
/// Owns a bounded queue of prepared messages and a single worker task that
/// POSTs them in order. A rate-limited message blocks the queue until the
/// server accepts it, so under heavy limits newer messages back up rather
/// than racing past stuck ones.
pub struct WebhookClient {
    tx: mpsc::Sender<Queued>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WebhookClient {
    pub fn new(url: String) -> Self {
        Self::with_capacity(url, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(url: String, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_worker(reqwest::Client::new(), url, rx));
        Self {
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a message for delivery. Blocks while the queue is full.
    pub async fn enqueue(&self, message: WebhookMessage) -> Result<()> {
        self.tx
            .send(Queued::Deliver(message))
            .await
            .map_err(|_| anyhow!("webhook worker has shut down"))
    }

    /// Signal the worker to drain everything enqueued so far and exit, then
    /// wait for it. Messages enqueued after `close` are not delivered.
    pub async fn close(&self) {
        let _ = self.tx.send(Queued::Shutdown).await;
        let handle = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = ?e, "webhook worker ended abnormally");
            }
        }
    }
}

enum Delivery {
    /// The message is done with, successfully or not. Advance the queue.
    Settled,
    /// Server signalled back-off; retry the same message after the delay.
    RateLimited(Duration),
}

async fn run_worker(client: reqwest::Client, url: String, mut rx: mpsc::Receiver<Queued>) {
    while let Some(next) = rx.recv().await {
        let message = match next {
            Queued::Deliver(m) => m,
            Queued::Shutdown => break,
        };
        loop {
            match deliver(&client, &url, &message).await {
                Delivery::Settled => break,
                Delivery::RateLimited(delay) => {
                    counter!("webhook_rate_limited_total").increment(1);
                    warn!(delay_ms = delay.as_millis() as u64, "webhook rate limited, delaying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

async fn deliver(client: &reqwest::Client, url: &str, message: &WebhookMessage) -> Delivery {
    let response = match client.post(url).json(message).send().await {
        Ok(r) => r,
        Err(e) => {
            // Transport failure drops the message; the queue keeps moving.
            warn!(error = ?e, "webhook request failed");
            return Delivery::Settled;
        }
    };

    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Delivery::Settled;
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Delivery::RateLimited(retry_delay(&body));
    }

    warn!(%status, body, "webhook delivery rejected");
    Delivery::Settled
}

/// Parse the back-off out of a 429 body.
///
/// The upstream docs call `retry_after` seconds, but observed values are
/// >1000, so it is treated as milliseconds.
fn retry_delay(body: &str) -> Duration {
    #[derive(Deserialize)]
    struct RateLimitResponse {
        retry_after: f64,
    }
    match serde_json::from_str::<RateLimitResponse>(body) {
        Ok(r) if r.retry_after >= 0.0 => Duration::from_millis(r.retry_after as u64),
        _ => DEFAULT_RETRY_DELAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_reads_milliseconds() {
        assert_eq!(
            retry_delay(r#"{"global": false, "message": "slow down", "retry_after": 500}"#),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn retry_delay_defaults_on_non_json_body() {
        assert_eq!(retry_delay("<html>429</html>"), DEFAULT_RETRY_DELAY);
        assert_eq!(retry_delay(""), DEFAULT_RETRY_DELAY);
    }

    #[test]
    fn empty_fields_are_omitted_from_the_wire_format() {
        let msg = WebhookMessage {
            content: None,
            embeds: vec![Embed {
                title: "[Feed] Title".into(),
                ..Embed::default()
            }],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("content").is_none());
        let embed = &json["embeds"][0];
        assert_eq!(embed["title"], "[Feed] Title");
        assert!(embed.get("description").is_none());
        assert!(embed.get("url").is_none());
    }
}
