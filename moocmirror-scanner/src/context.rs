use crate::artifact::{self, ArtifactOutcome, ArtifactRequest};
use crate::config::{CrawlerConfig, Headers};
use crate::download_log::DownloadLog;
use crate::error::Result;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::pacing::{Pacer, PacingKind};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Everything a node needs to fetch, pace and record during one run.
pub struct CrawlContext {
    fetcher: Arc<dyn Fetcher>,
    pacer: Pacer,
    headers: Headers,
    download_log: DownloadLog,
    dry_run: bool,
}

impl CrawlContext {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        pacer: Pacer,
        headers: Headers,
        download_log: DownloadLog,
        dry_run: bool,
    ) -> Self {
        Self {
            fetcher,
            pacer,
            headers,
            download_log,
            dry_run,
        }
    }

    /// Real HTTP fetcher and randomized pacing, as configured.
    pub fn from_config(
        config: &CrawlerConfig,
        headers: Headers,
        output_dir: &Path,
        dry_run: bool,
    ) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(config)?;
        let pacer = Pacer::new(config.page_pacing, config.artifact_pacing);
        let download_log = DownloadLog::new(config.download_log_path(output_dir));
        Ok(Self::new(Arc::new(fetcher), pacer, headers, download_log, dry_run))
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn download_log(&self) -> &DownloadLog {
        &self.download_log
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Suspend for a freshly drawn delay of the given kind.
    pub async fn pause(&self, kind: PacingKind) {
        let wait = self.pacer.delay(kind);
        if !wait.is_zero() {
            info!("Waiting {:.1} seconds...", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }
    }

    /// Mirror one artifact. Never fails the caller; see [`ArtifactOutcome`].
    pub async fn download_artifact(&self, request: &ArtifactRequest) -> ArtifactOutcome {
        artifact::download(self, request).await
    }
}
