// src/dedup.rs
use anyhow::{Context, Result};
use redis::aio::ConnectionManager;

/// Logical name of the membership filter inside the store. Fixed so that a
/// restarted process keeps deduplicating against the same state.
pub const FILTER_KEY: &str = "items-exist";

// Matches the optional BF.RESERVE the store would otherwise auto-size.
const RESERVE_ERROR_RATE: &str = "0.0001";
const RESERVE_CAPACITY: &str = "1000000000";

/// Facade over the approximate-membership store.
///
/// `seen` may return false positives (an unseen item reported as seen);
/// false negatives only happen on data loss at the store. Callers must treat
/// errors as "skip this item without marking" so a later poll retries.
#[async_trait::async_trait]
pub trait DedupStore: Send + Sync {
    async fn seen(&self, id: &str) -> Result<bool>;
    async fn mark(&self, id: &str) -> Result<()>;
}

/// RedisBloom-backed implementation using `BF.EXISTS` / `BF.ADD`.
#[derive(Clone)]
pub struct RedisBloom {
    conn: ConnectionManager,
}

impl RedisBloom {
    pub async fn connect(host: &str) -> Result<Self> {
        let client = redis::Client::open(format!("redis://{host}"))
            .with_context(|| format!("invalid redis host {host:?}"))?;
        let conn = client
            .get_connection_manager()
            .await
            .with_context(|| format!("connecting to redis at {host}"))?;
        Ok(Self { conn })
    }

    /// Reserve the filter with explicit sizing. Best-effort: the filter may
    /// already exist (RedisBloom replies with an error we can ignore), and
    /// without a reservation the store auto-sizes on first insert anyway.
    pub async fn reserve(&self) {
        let mut conn = self.conn.clone();
        let reserved: redis::RedisResult<()> = redis::cmd("BF.RESERVE")
            .arg(FILTER_KEY)
            .arg(RESERVE_ERROR_RATE)
            .arg(RESERVE_CAPACITY)
            .query_async(&mut conn)
            .await;
        if let Err(e) = reserved {
            tracing::debug!(error = ?e, "BF.RESERVE skipped");
        }
    }
}

#[async_trait::async_trait]
impl DedupStore for RedisBloom {
    async fn seen(&self, id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = redis::cmd("BF.EXISTS")
            .arg(FILTER_KEY)
            .arg(id)
            .query_async(&mut conn)
            .await
            .context("BF.EXISTS against dedup store")?;
        Ok(exists)
    }

    async fn mark(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _added: bool = redis::cmd("BF.ADD")
            .arg(FILTER_KEY)
            .arg(id)
            .query_async(&mut conn)
            .await
            .context("BF.ADD against dedup store")?;
        Ok(())
    }
}
