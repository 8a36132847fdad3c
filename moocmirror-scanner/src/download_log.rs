use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One `(local path, source URL)` line of the download log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub destination: PathBuf,
    pub source_url: String,
}

/// Append-only record of every artifact written during a run.
pub struct DownloadLog {
    path: PathBuf,
    writer: Mutex<()>,
}

impl DownloadLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, destination: &Path, source_url: &str) -> io::Result<()> {
        let _guard = self.writer.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let line = format!("{} {}\n", destination.display(), source_url);
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Read back every entry. A missing log means nothing was downloaded.
    pub async fn entries(&self) -> io::Result<Vec<LogEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(content.lines().filter_map(parse_line).collect())
    }
}

// URLs never contain a raw space, so the last one separates the two fields.
fn parse_line(line: &str) -> Option<LogEntry> {
    let (destination, source_url) = line.trim_end().rsplit_once(' ')?;
    Some(LogEntry {
        destination: PathBuf::from(destination),
        source_url: source_url.to_string(),
    })
}
