// src/sink/file.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::ingest::types::{FeedMeta, Item};
use crate::sink::Sink;
use crate::template::PathTemplate;

#[derive(Debug, Clone, Deserialize)]
pub struct FileOptions {
    pub pathformat: String,
}

/// Filesystem sink. The path template yields a directory; files are named
/// `<feed.title>-<identifier>.json` and overwritten if present. Same-path
/// concurrent writes are prevented upstream by the dedup oracle, so there is
/// no locking here.
pub struct FileSink {
    path_template: PathTemplate,
}

impl FileSink {
    pub fn new(options: FileOptions) -> Result<Self> {
        Ok(Self {
            path_template: PathTemplate::new(&options.pathformat)?,
        })
    }
}

#[async_trait::async_trait]
impl Sink for FileSink {
    async fn write(&self, feed: &FeedMeta, item: &Item, identifier: &str) -> Result<()> {
        let dir = PathBuf::from(self.path_template.render(item)?);
        let path = dir.join(format!("{}-{}.json", feed.title, identifier));
        let data = serde_json::to_vec(item).context("serializing item")?;
        let written = path.clone();
        tokio::task::spawn_blocking(move || write_with_modes(&dir, &path, &data))
            .await
            .context("file write task panicked")?
            .with_context(|| format!("writing {}", written.display()))?;
        debug!(path = %written.display(), "saved item");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Create the directory tree (0750) and write the file (0640).
fn write_with_modes(dir: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(dir)?;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }
    let mut file = options.open(path)?;
    file.write_all(data)
}
