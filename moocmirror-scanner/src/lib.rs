pub mod adapter;
pub mod artifact;
pub mod config;
pub mod context;
pub mod download_log;
pub mod error;
pub mod fetcher;
pub mod node;
pub mod pacing;
pub mod registry;
pub mod result;
pub mod traversal;

#[cfg(test)]
mod testing;

pub use adapter::{ChildLink, SiteAdapter, VisitOutcome};
pub use artifact::{ArtifactOutcome, ArtifactRequest};
pub use config::{CrawlerConfig, Headers};
pub use context::CrawlContext;
pub use download_log::{DownloadLog, LogEntry};
pub use error::{AdapterError, FetchError, ScanError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use node::{Node, NodeState};
pub use pacing::{Pacer, PacingKind, PacingProfile};
pub use registry::DedupRegistry;
pub use result::{ArtifactTally, CrawlReport, NodeRecord, NodeStatus};
pub use traversal::{ProgressCallback, Traversal, TraversalEvent, TraversalState};
