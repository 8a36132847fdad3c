use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum NodeStatus {
    Visited,
    FetchFailed(String),
    ParseFailed(String),
    VisitFailed(String),
}

impl NodeStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, NodeStatus::Visited)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactTally {
    pub downloaded: usize,
    pub skipped: usize,
    pub planned: usize,
    pub failed: usize,
}

impl ArtifactTally {
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.planned + self.failed
    }

    pub fn add(&mut self, other: &ArtifactTally) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.planned += other.planned;
        self.failed += other.failed;
    }
}

/// What happened to one node during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub url: String,
    pub depth: usize,
    pub status: NodeStatus,
    pub children_found: usize,
    pub artifacts: ArtifactTally,
}

impl NodeRecord {
    pub fn new(url: String, depth: usize) -> Self {
        Self {
            url,
            depth,
            status: NodeStatus::Visited,
            children_found: 0,
            artifacts: ArtifactTally::default(),
        }
    }
}

/// Outcome of a whole traversal. Records are in visit order, so a parent
/// always precedes its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub root_url: String,
    pub dry_run: bool,
    pub records: Vec<NodeRecord>,
    pub duplicates_skipped: usize,
    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn visited_identities(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.url.as_str()).collect()
    }

    pub fn failures(&self) -> Vec<&NodeRecord> {
        self.records.iter().filter(|r| r.status.is_failure()).collect()
    }

    pub fn artifact_totals(&self) -> ArtifactTally {
        let mut totals = ArtifactTally::default();
        for record in &self.records {
            totals.add(&record.artifacts);
        }
        totals
    }

    pub fn position(&self, url: &str) -> Option<usize> {
        self.records.iter().position(|r| r.url == url)
    }
}
