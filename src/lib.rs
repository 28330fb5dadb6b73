// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod dedup;
pub mod ident;
pub mod ingest;
pub mod sink;
pub mod template;
pub mod webhook;

// ---- Re-exports for the binary and tests ----
pub use crate::dedup::{DedupStore, RedisBloom};
pub use crate::ingest::{ItemFilter, Pipeline};
pub use crate::sink::{build_sinks, Sink};
pub use crate::webhook::WebhookClient;
