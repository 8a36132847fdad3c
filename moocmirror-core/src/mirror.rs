use crate::adapter::{FunMoocAdapter, default_headers};
use chrono::Local;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use moocmirror_scanner::error::Result;
use moocmirror_scanner::{
    CrawlContext, CrawlReport, CrawlerConfig, NodeStatus, ProgressCallback, ScanError, Traversal,
    TraversalEvent,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Options for configuring a mirror run
pub struct MirrorOptions {
    pub url: String,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub config: CrawlerConfig,
    /// Spinner host. Log output must go through the same `MultiProgress`
    /// (see `MultiProgress::suspend`) to keep the spinner intact.
    pub progress: Option<MultiProgress>,
}

/// Callback for reporting mirror progress as plain messages
pub type MirrorProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Mirror the course rooted at `options.url` into `options.output_dir`
pub async fn execute_mirror(
    options: MirrorOptions,
    progress_callback: Option<MirrorProgressCallback>,
) -> Result<CrawlReport> {
    let MirrorOptions {
        url,
        output_dir,
        dry_run,
        config,
        progress,
    } = options;

    Url::parse(&url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|source| ScanError::Metadata {
            path: output_dir.clone(),
            source,
        })?;

    let headers = config.headers.clone().unwrap_or_else(default_headers);
    let ctx = CrawlContext::from_config(&config, headers, &output_dir, dry_run)?;
    let adapter = FunMoocAdapter::new(&output_dir);

    // Single spinner for overall progress (only if enabled)
    let progress_bar = if let Some(multi) = progress {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| ScanError::Other(e.to_string()))?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting mirror...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let visited_count = Arc::new(AtomicUsize::new(0));
    let pb_clone = progress_bar.clone();
    let count_clone = visited_count.clone();
    let events: ProgressCallback = Arc::new(move |event: &TraversalEvent| {
        let message = match event {
            TraversalEvent::Constructing { url, depth } => {
                format!("Fetching {} (depth {})", extract_url_path(url), depth)
            }
            TraversalEvent::Visited(record) => {
                let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
                format!("Visited {} pages, last {}", count, extract_url_path(&record.url))
            }
            TraversalEvent::DuplicateSkipped { url } => {
                format!("Already seen {}", extract_url_path(url))
            }
        };
        if let Some(ref pb) = pb_clone {
            pb.set_message(message.clone());
        }
        if let Some(ref callback) = progress_callback {
            callback(message);
        }
    });

    let result = Traversal::new(&adapter, &ctx)
        .with_progress_callback(events)
        .walk(&url)
        .await;

    if let Some(ref pb) = progress_bar {
        let total = visited_count.load(Ordering::Relaxed);
        match &result {
            Ok(_) => pb.finish_with_message(format!("Mirror complete! {} pages visited", total)),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}

/// Generate a human readable report of a mirror run
pub fn generate_mirror_report(report: &CrawlReport) -> String {
    let totals = report.artifact_totals();

    let mut out = String::new();
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str("# Summary:\n");
    out.push_str(&format!("  Root: {}\n", report.root_url));
    out.push_str(&format!(
        "  Generated: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    if report.dry_run {
        out.push_str(&format!("  Mode: {}\n", "dry run (no downloads)".yellow()));
    }
    out.push_str(&format!("  Nodes visited: {}\n", report.records.len()));
    out.push_str(&format!("  Duplicates dropped: {}\n", report.duplicates_skipped));
    out.push_str(&format!("  Failed nodes: {}\n", report.failures().len()));
    out.push_str(&format!(
        "  Artifacts: {} downloaded, {} skipped, {} planned, {} failed\n",
        totals.downloaded, totals.skipped, totals.planned, totals.failed
    ));
    out.push_str(&format!("  Elapsed: {:.1}s\n", report.elapsed.as_secs_f64()));

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group by depth, keeping visit order inside each group
    let mut by_depth: BTreeMap<usize, Vec<_>> = BTreeMap::new();
    for record in &report.records {
        by_depth.entry(record.depth).or_default().push(record);
    }

    for (depth, records) in by_depth.iter() {
        out.push_str(&format!("## Depth {}\n", depth));
        out.push_str(&format!("  {} nodes\n\n", records.len()));

        for record in records {
            let status = match &record.status {
                NodeStatus::Visited => "ok".green().to_string(),
                NodeStatus::FetchFailed(_) => "fetch failed".red().to_string(),
                NodeStatus::ParseFailed(_) => "parse failed".red().to_string(),
                NodeStatus::VisitFailed(_) => "visit failed".yellow().to_string(),
            };

            let mut line = format!("  {} {}", status, extract_url_path(&record.url));
            if record.artifacts.total() > 0 {
                line.push_str(&format!(
                    " {}",
                    format!(
                        "[{} new, {} skipped, {} planned, {} failed]",
                        record.artifacts.downloaded,
                        record.artifacts.skipped,
                        record.artifacts.planned,
                        record.artifacts.failed
                    )
                    .bright_black()
                ));
            }
            match &record.status {
                NodeStatus::FetchFailed(reason)
                | NodeStatus::ParseFailed(reason)
                | NodeStatus::VisitFailed(reason) => {
                    line.push_str(&format!("\n      {}", reason.bright_black()));
                }
                NodeStatus::Visited => {}
            }

            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str("# Traversed nodes:\n");
    for identity in report.visited_identities() {
        out.push_str(&format!("  {}\n", identity));
    }

    out
}

pub fn generate_json_report(report: &CrawlReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn render_report(report: &CrawlReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_mirror_report(report)),
        ReportFormat::Json => generate_json_report(report),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}
