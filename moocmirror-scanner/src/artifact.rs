use crate::context::CrawlContext;
use crate::pacing::PacingKind;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file to mirror: where it comes from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRequest {
    pub source_url: String,
    pub destination: PathBuf,
}

impl ArtifactRequest {
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination: destination.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactOutcome {
    Downloaded { bytes: usize },
    /// The destination already existed; nothing was fetched.
    Skipped,
    /// Dry run; nothing was fetched or written.
    Planned,
    Failed(String),
}

pub(crate) async fn download(ctx: &CrawlContext, request: &ArtifactRequest) -> ArtifactOutcome {
    let ArtifactRequest {
        source_url,
        destination,
    } = request;

    if tokio::fs::try_exists(destination).await.unwrap_or(false) {
        info!("Skip {}", destination.display());
        return ArtifactOutcome::Skipped;
    }

    if ctx.is_dry_run() {
        info!("Would download {} <- {}", destination.display(), source_url);
        return ArtifactOutcome::Planned;
    }

    ctx.pause(PacingKind::ArtifactFetch).await;

    info!("Downloading {}", destination.display());
    let body = match ctx.fetcher().fetch(source_url, ctx.headers()).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to download {}: {}", destination.display(), e);
            return ArtifactOutcome::Failed(e.to_string());
        }
    };

    if let Err(e) = write_atomically(destination, &body).await {
        warn!("Failed to write {}: {}", destination.display(), e);
        return ArtifactOutcome::Failed(e.to_string());
    }

    if let Err(e) = ctx.download_log().append(destination, source_url).await {
        warn!(
            "Downloaded {} but could not log it to {}: {}",
            destination.display(),
            ctx.download_log().path().display(),
            e
        );
    }

    ArtifactOutcome::Downloaded { bytes: body.len() }
}

/// Write next to the destination, then rename into place, so a partial file
/// never passes the existence check of a later run.
pub async fn write_atomically(destination: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file_name = destination
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"))?;
    let mut partial_name = std::ffi::OsString::from(".");
    partial_name.push(file_name);
    partial_name.push(".part");
    let partial = destination.with_file_name(partial_name);

    let written = match tokio::fs::write(&partial, bytes).await {
        Ok(()) => tokio::fs::rename(&partial, destination).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    written
}
