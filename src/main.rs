//! feed-ingress — Binary entrypoint.
//! Polls configured syndication feeds on a fixed interval and fans every
//! previously unseen item out to the configured sinks.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feed_ingress::ingest::scheduler::{spawn_poll_scheduler, POLL_INTERVAL};
use feed_ingress::{build_sinks, config, ItemFilter, Pipeline, RedisBloom};

#[derive(Debug, Parser)]
#[command(name = "feed-ingress", about = "Polls feeds and fans new items out to sinks")]
struct Args {
    /// Only process items published after startup.
    #[arg(long = "newOnly")]
    new_only: bool,

    /// Path to the YAML configuration file.
    #[arg(default_value = "./config.yaml")]
    config: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        std::process::exit(1);
    });
    let started_at = Utc::now();

    let config = config::load(&args.config)?;
    info!(
        feeds = config.feeds.len(),
        outputs = config.outputs.len(),
        "config loaded"
    );

    // Metrics exporter is best-effort; losing it never blocks ingest.
    if let Err(e) = PrometheusBuilder::new().install() {
        warn!(error = ?e, "metrics exporter disabled");
    }

    let dedup = RedisBloom::connect(&config.redis.host).await?;
    dedup.reserve().await;

    let sinks = build_sinks(&config.outputs)?;
    for sink in &sinks {
        info!(sink = sink.name(), "sink configured");
    }

    let filter = if args.new_only {
        info!(%started_at, "ignoring items published before startup");
        ItemFilter::NewerThan(started_at)
    } else {
        ItemFilter::All
    };

    let pipeline = Arc::new(Pipeline::new(sinks.clone(), Arc::new(dedup), filter));
    let scheduler = spawn_poll_scheduler(pipeline, config.feeds.clone(), POLL_INTERVAL);

    tokio::select! {
        _ = scheduler => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, draining sinks");
            for sink in &sinks {
                if let Err(e) = sink.shutdown().await {
                    warn!(sink = sink.name(), error = ?e, "sink shutdown failed");
                }
            }
        }
    }
    Ok(())
}
