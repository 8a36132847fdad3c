use crate::artifact::{ArtifactOutcome, ArtifactRequest};
use crate::context::CrawlContext;
use crate::error::{AdapterError, Result};
use crate::node::Node;
use crate::result::ArtifactTally;
use async_trait::async_trait;

/// A child discovered on a page, plus whatever the child's visit will need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink<M> {
    pub url: String,
    pub meta: M,
}

impl<M> ChildLink<M> {
    pub fn new(url: impl Into<String>, meta: M) -> Self {
        Self {
            url: url.into(),
            meta,
        }
    }
}

#[derive(Debug, Default)]
pub struct VisitOutcome {
    pub artifacts: Vec<(ArtifactRequest, ArtifactOutcome)>,
}

impl VisitOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, request: ArtifactRequest, outcome: ArtifactOutcome) {
        self.artifacts.push((request, outcome));
    }

    pub fn tally(&self) -> ArtifactTally {
        let mut tally = ArtifactTally::default();
        for (_, outcome) in &self.artifacts {
            match outcome {
                ArtifactOutcome::Downloaded { .. } => tally.downloaded += 1,
                ArtifactOutcome::Skipped => tally.skipped += 1,
                ArtifactOutcome::Planned => tally.planned += 1,
                ArtifactOutcome::Failed(_) => tally.failed += 1,
            }
        }
        tally
    }
}

/// Site-specific knowledge plugged into the traversal engine.
///
/// The engine owns identity, ordering and pacing; the adapter owns page
/// structure and everything depth-conditioned.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Parsed form of a page, computed once when the node is constructed.
    type Page: Send + Sync;
    /// Handed from a parent's `children` to the child node.
    type Meta: Clone + Send + Sync;

    fn parse(&self, url: &str, depth: usize, body: &[u8]) -> std::result::Result<Self::Page, AdapterError>;

    /// Only called for nodes whose page was fetched and parsed.
    fn children(
        &self,
        node: &Node<Self::Page, Self::Meta>,
        page: &Self::Page,
    ) -> Vec<ChildLink<Self::Meta>>;

    /// Called exactly once per node, including nodes whose fetch or parse
    /// failed; those have no [`Node::page`] and should be skipped.
    async fn visit(&self, node: &Node<Self::Page, Self::Meta>, ctx: &CrawlContext) -> Result<VisitOutcome>;
}
