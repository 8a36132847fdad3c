use crate::adapter::{ChildLink, SiteAdapter};
use crate::context::CrawlContext;
use crate::error::{Result, ScanError};
use crate::node::{Node, NodeState};
use crate::registry::DedupRegistry;
use crate::result::{CrawlReport, NodeRecord, NodeStatus};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    /// Root not yet visited.
    Pending,
    /// A node's visit is running and its children are being enumerated.
    Visiting,
    /// Iterating the unvisited children of the node on top of the stack.
    Recursing,
    Done,
}

#[derive(Debug, Clone)]
pub enum TraversalEvent {
    Constructing { url: String, depth: usize },
    Visited(NodeRecord),
    DuplicateSkipped { url: String },
}

pub type ProgressCallback = Arc<dyn Fn(&TraversalEvent) + Send + Sync>;

struct Frame<P, M> {
    node: Node<P, M>,
    pending: std::vec::IntoIter<ChildLink<M>>,
}

/// Walks the node graph from a root, visiting every reachable identity once.
///
/// Children are registered before they are constructed, so a repeated or
/// cyclic reference is dropped instead of fetched again. The walk is depth
/// first over an explicit stack: a node is visited before any of its
/// children, and children are taken in the order the adapter emits them.
pub struct Traversal<'a, A: SiteAdapter> {
    adapter: &'a A,
    ctx: &'a CrawlContext,
    registry: DedupRegistry,
    state: TraversalState,
    records: Vec<NodeRecord>,
    duplicates_skipped: usize,
    progress_callback: Option<ProgressCallback>,
}

impl<'a, A: SiteAdapter> Traversal<'a, A> {
    pub fn new(adapter: &'a A, ctx: &'a CrawlContext) -> Self {
        Self {
            adapter,
            ctx,
            registry: DedupRegistry::new(),
            state: TraversalState::Pending,
            records: Vec::new(),
            duplicates_skipped: 0,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn state(&self) -> TraversalState {
        self.state
    }

    pub fn registry(&self) -> &DedupRegistry {
        &self.registry
    }

    /// Records of the nodes visited so far, in visit order.
    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub async fn walk(&mut self, root_url: &str) -> Result<CrawlReport> {
        if self.state != TraversalState::Pending {
            return Err(ScanError::Other("a traversal can only be walked once".to_string()));
        }
        Url::parse(root_url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", root_url, e)))?;

        info!("Starting traversal of {}", root_url);
        let started = Instant::now();

        self.registry.register(root_url);
        let root = self.construct(root_url.to_string(), 0, None).await;
        match root.state() {
            NodeState::FetchFailed(e) => {
                return Err(ScanError::RootUnavailable {
                    url: root_url.to_string(),
                    reason: e.to_string(),
                });
            }
            NodeState::ParseFailed { error, .. } => {
                return Err(ScanError::RootUnparseable {
                    url: root_url.to_string(),
                    reason: error.to_string(),
                });
            }
            NodeState::Ready { .. } => {}
        }

        let mut stack = Vec::new();
        if let Some(frame) = self.enter(root).await? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            self.transition(TraversalState::Recursing);

            let Some(link) = frame.pending.next() else {
                if let Some(done) = stack.pop() {
                    debug!("Subtree of {} exhausted", done.node.url());
                }
                continue;
            };

            if !self.registry.register(&link.url) {
                debug!("Already seen {}, dropping", link.url);
                self.duplicates_skipped += 1;
                self.emit(TraversalEvent::DuplicateSkipped { url: link.url });
                continue;
            }

            let depth = frame.node.depth() + 1;
            let child = self.construct(link.url, depth, Some(link.meta)).await;
            if let Some(frame) = self.enter(child).await? {
                stack.push(frame);
            }
        }

        self.transition(TraversalState::Done);
        info!(
            "Traversal complete. Visited {} nodes ({} duplicates dropped)",
            self.records.len(),
            self.duplicates_skipped
        );

        Ok(CrawlReport {
            root_url: root_url.to_string(),
            dry_run: self.ctx.is_dry_run(),
            records: self.records.clone(),
            duplicates_skipped: self.duplicates_skipped,
            elapsed: started.elapsed(),
        })
    }

    async fn construct(&mut self, url: String, depth: usize, meta: Option<A::Meta>) -> Node<A::Page, A::Meta> {
        self.emit(TraversalEvent::Constructing {
            url: url.clone(),
            depth,
        });
        Node::construct(self.adapter, self.ctx, url, depth, meta).await
    }

    /// Visit `node` once, record it, and hand back its frame of children.
    /// `None` means the node's further processing is skipped.
    async fn enter(&mut self, node: Node<A::Page, A::Meta>) -> Result<Option<Frame<A::Page, A::Meta>>> {
        self.transition(TraversalState::Visiting);
        info!("Visiting {}...", node.url());

        let mut record = NodeRecord::new(node.url().to_string(), node.depth());
        match node.state() {
            NodeState::FetchFailed(e) => record.status = NodeStatus::FetchFailed(e.to_string()),
            NodeState::ParseFailed { error, .. } => record.status = NodeStatus::ParseFailed(error.to_string()),
            NodeState::Ready { .. } => {}
        }

        let frame = match self.adapter.visit(&node, self.ctx).await {
            Ok(outcome) => {
                record.artifacts = outcome.tally();
                let children = node.children(self.adapter);
                record.children_found = children.len();
                Some(Frame {
                    node,
                    pending: children.into_iter(),
                })
            }
            Err(e) if e.is_fatal() || node.depth() == 0 => {
                warn!("Visit of {} failed, aborting: {}", node.url(), e);
                return Err(e);
            }
            Err(e) => {
                warn!("Visit of {} failed, skipping its children: {}", node.url(), e);
                if !record.status.is_failure() {
                    record.status = NodeStatus::VisitFailed(e.to_string());
                }
                None
            }
        };

        self.emit(TraversalEvent::Visited(record.clone()));
        self.records.push(record);
        Ok(frame)
    }

    fn transition(&mut self, next: TraversalState) {
        if self.state != next {
            debug!("Traversal {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn emit(&self, event: TraversalEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(&event);
        }
    }
}
