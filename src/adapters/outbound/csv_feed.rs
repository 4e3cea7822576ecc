use crate::common::DomainResult;
use crate::domains::route::Point;
use crate::domains::telemetry::{encode_feed_row, PositionFeed, FEED_HEADER};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Append-only CSV of generated positions (`lng,lat`), shared with an external renderer.
///
/// The header is written once, when the file is empty at open time. Each row goes out in a
/// single append so readers never see a torn line.
pub struct CsvPositionFeed {
    path: PathBuf,
    file: File,
}

impl CsvPositionFeed {
    pub async fn open<P: Into<PathBuf>>(path: P) -> DomainResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        if file.metadata().await?.len() == 0 {
            file.write_all(format!("{}\n", FEED_HEADER).as_bytes()).await?;
            file.flush().await?;
        }

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PositionFeed for CsvPositionFeed {
    async fn append(&mut self, point: &Point) -> DomainResult<()> {
        let line = format!("{}\n", encode_feed_row(point));
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        Ok(())
    }
}
