use crate::adapter::{ChildLink, SiteAdapter};
use crate::context::CrawlContext;
use crate::error::{AdapterError, FetchError};
use crate::pacing::PacingKind;
use tracing::{info, warn};

#[derive(Debug)]
pub enum NodeState<P> {
    Ready { body: Vec<u8>, page: P },
    ParseFailed { body: Vec<u8>, error: AdapterError },
    FetchFailed(FetchError),
}

/// One fetched page of the crawl graph. Immutable once constructed.
#[derive(Debug)]
pub struct Node<P, M> {
    url: String,
    depth: usize,
    dry_run: bool,
    meta: Option<M>,
    state: NodeState<P>,
}

impl<P, M> Node<P, M> {
    pub fn new(url: String, depth: usize, dry_run: bool, meta: Option<M>, state: NodeState<P>) -> Self {
        Self {
            url,
            depth,
            dry_run,
            meta,
            state,
        }
    }

    /// Wait, fetch and parse. A failed fetch or parse still yields a node,
    /// in a failed state with no page.
    pub async fn construct<A>(
        adapter: &A,
        ctx: &CrawlContext,
        url: String,
        depth: usize,
        meta: Option<M>,
    ) -> Self
    where
        A: SiteAdapter<Page = P, Meta = M>,
    {
        ctx.pause(PacingKind::PageFetch).await;

        info!("Request {}", url);
        let state = match ctx.fetcher().fetch(&url, ctx.headers()).await {
            Ok(body) => match adapter.parse(&url, depth, &body) {
                Ok(page) => NodeState::Ready { body, page },
                Err(error) => {
                    warn!("Could not parse {}: {}", url, error);
                    NodeState::ParseFailed { body, error }
                }
            },
            Err(error) => {
                warn!("Could not fetch {}: {}", url, error);
                NodeState::FetchFailed(error)
            }
        };

        Self::new(url, depth, ctx.is_dry_run(), meta, state)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    pub fn state(&self) -> &NodeState<P> {
        &self.state
    }

    pub fn page(&self) -> Option<&P> {
        match &self.state {
            NodeState::Ready { page, .. } => Some(page),
            _ => None,
        }
    }

    /// Raw fetched bytes; empty when the fetch failed.
    pub fn body(&self) -> &[u8] {
        match &self.state {
            NodeState::Ready { body, .. } | NodeState::ParseFailed { body, .. } => body,
            NodeState::FetchFailed(_) => &[],
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, NodeState::Ready { .. })
    }

    /// Child links, or nothing for a node in a failed state.
    pub fn children<A>(&self, adapter: &A) -> Vec<ChildLink<M>>
    where
        A: SiteAdapter<Page = P, Meta = M>,
    {
        match self.page() {
            Some(page) => adapter.children(self, page),
            None => Vec::new(),
        }
    }
}
