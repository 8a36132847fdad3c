use crate::error::{Result, ScanError};
use crate::pacing::PacingProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Header name to header value, passed unmodified to every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Load a JSON object of header name to value.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScanError::Config(format!("Failed to read headers file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ScanError::Config(format!("Invalid headers file {}: {}", path.display(), e))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Applied before every page fetch (node construction).
    pub page_pacing: PacingProfile,
    /// Applied before every artifact download.
    pub artifact_pacing: PacingProfile,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    /// Relative paths are resolved against the output directory.
    pub download_log: PathBuf,
    /// Replaces the site adapter's default headers when set.
    pub headers: Option<Headers>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_pacing: PacingProfile::new(10.0, 3.0),
            artifact_pacing: PacingProfile::new(15.0, 5.0),
            timeout_secs: 30,
            max_redirects: 5,
            download_log: PathBuf::from("downloads.log"),
            headers: None,
        }
    }
}

impl CrawlerConfig {
    /// No waiting at all; meant for tests and local fixtures.
    pub fn unpaced() -> Self {
        Self {
            page_pacing: PacingProfile::none(),
            artifact_pacing: PacingProfile::none(),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScanError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ScanError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ScanError::Config(e.to_string()))
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn download_log_path(&self, output_dir: &Path) -> PathBuf {
        if self.download_log.is_absolute() {
            self.download_log.clone()
        } else {
            output_dir.join(&self.download_log)
        }
    }
}
