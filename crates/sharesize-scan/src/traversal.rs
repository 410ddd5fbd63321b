//! Concurrent depth-first traversal of a remote folder tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use compact_str::CompactString;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, stream};
use tokio::sync::{Semaphore, broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use sharesize_core::{
    Entry, EntryKind, FolderNode, FolderTree, RemoteUnavailable, TraversalConfig, TraversalError,
    TraversalWarning, WarningKind,
};

use crate::fetcher::PageFetcher;
use crate::progress::{Phase, TraversalProgress};
use crate::retry::RetryPolicy;
use crate::top_files::TopFilesTracker;

/// Walks a remote folder tree and aggregates sizes bottom-up.
///
/// Subfolders of every folder are visited concurrently, but no more than
/// `concurrency` folders are being listed at any moment across the whole
/// tree. Results are reassembled in discovery order, so the produced tree
/// does not depend on which fetch finishes first.
pub struct TraversalEngine<F> {
    fetcher: Arc<F>,
    config: TraversalConfig,
    progress_tx: broadcast::Sender<TraversalProgress>,
    cancel: CancellationToken,
}

impl<F: PageFetcher + 'static> TraversalEngine<F> {
    /// Create an engine listing folders through `fetcher`.
    pub fn new(fetcher: F, config: TraversalConfig) -> Self {
        Self::with_shared(Arc::new(fetcher), config)
    }

    /// Create an engine from a fetcher that is shared with other owners.
    pub fn with_shared(fetcher: Arc<F>, config: TraversalConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(256);
        Self {
            fetcher,
            config,
            progress_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` to stop the traversal early.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Subscribe to traversal progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<TraversalProgress> {
        self.progress_tx.subscribe()
    }

    /// Token that cancels this engine's traversals.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configuration in use.
    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Traverse the root configured in [`TraversalConfig::root`].
    pub async fn run(&self) -> Result<FolderTree, TraversalError> {
        self.traverse(&self.config.root).await
    }

    /// Traverse the tree below `root_path`.
    ///
    /// Failures below the root become warnings on the returned tree. Only a
    /// failure to list the root itself, or cancellation, is an error.
    pub async fn traverse(&self, root_path: &str) -> Result<FolderTree, TraversalError> {
        if self.config.concurrency == 0 {
            return Err(TraversalError::InvalidConfig {
                message: "concurrency must be at least 1".into(),
            });
        }

        let start = Instant::now();
        let run = Arc::new(Run {
            fetcher: Arc::clone(&self.fetcher),
            policy: RetryPolicy::from_config(&self.config),
            permits: Semaphore::new(self.config.concurrency),
            top_files: TopFilesTracker::new(self.config.top_n),
            fan_out: self.config.concurrency,
            config: self.config.clone(),
            progress_tx: self.progress_tx.clone(),
            cancel: self.cancel.clone(),
            folders_done: AtomicU64::new(0),
            files_seen: AtomicU64::new(0),
            bytes_seen: AtomicU64::new(0),
        });

        info!(
            root = root_path,
            concurrency = self.config.concurrency,
            "Starting traversal"
        );

        let root_path = CompactString::from(root_path);
        let name = folder_name(&root_path);
        let visit = Run::visit(Arc::clone(&run), root_path.clone(), name, true).await;

        if let Some(source) = visit.failure {
            return Err(TraversalError::RootUnreachable {
                path: root_path,
                source,
            });
        }
        if run.cancel.is_cancelled() {
            return Err(TraversalError::Interrupted);
        }

        let mut config = self.config.clone();
        config.root = root_path.to_string();
        let elapsed = start.elapsed();

        info!(
            files = visit.node.file_count,
            folders = visit.node.folder_count,
            bytes = visit.node.total_size,
            warnings = visit.warnings.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Traversal finished"
        );

        Ok(FolderTree::new(
            visit.node,
            config,
            run.top_files.snapshot(),
            elapsed,
            visit.warnings,
        ))
    }
}

/// State shared by every folder visit of one traversal.
struct Run<F> {
    fetcher: Arc<F>,
    policy: RetryPolicy,
    permits: Semaphore,
    top_files: TopFilesTracker,
    fan_out: usize,
    config: TraversalConfig,
    progress_tx: broadcast::Sender<TraversalProgress>,
    cancel: CancellationToken,
    folders_done: AtomicU64,
    files_seen: AtomicU64,
    bytes_seen: AtomicU64,
}

/// Children of one folder as far as they could be listed.
#[derive(Default)]
struct Listing {
    files: Vec<Entry>,
    folders: Vec<Entry>,
    failure: Option<RemoteUnavailable>,
    cancelled: bool,
}

/// Outcome of visiting one folder and its subtree.
struct Visit {
    node: FolderNode,
    warnings: Vec<TraversalWarning>,
    failure: Option<RemoteUnavailable>,
}

impl<F: PageFetcher + 'static> Run<F> {
    /// Visit `path`, then its subfolders, and return the aggregated subtree.
    fn visit(
        run: Arc<Self>,
        path: CompactString,
        name: CompactString,
        is_root: bool,
    ) -> BoxFuture<'static, Visit> {
        async move {
            let mut node = FolderNode::new(path.clone(), name);
            let mut warnings = Vec::new();

            let listing = run.list_folder(&path).await;
            if listing.cancelled {
                run.emit(&path, Phase::Skipped);
                return Visit {
                    node,
                    warnings,
                    failure: None,
                };
            }

            for file in listing.files {
                run.top_files.observe(&file);
                run.files_seen.fetch_add(1, Ordering::Relaxed);
                run.bytes_seen.fetch_add(file.size, Ordering::Relaxed);
                node.push_file(file);
            }

            let failure = listing.failure;
            if let Some(err) = &failure {
                warn!(
                    path = %path,
                    error = %err,
                    subfolders = listing.folders.len(),
                    "Folder listing failed, keeping partial results"
                );
                warnings.push(TraversalWarning::from_failure(path.clone(), err));
                run.emit(&path, Phase::Failed);
                if is_root {
                    return Visit {
                        node,
                        warnings,
                        failure,
                    };
                }
            } else {
                run.emit(&path, Phase::Listed);
                debug!(
                    path = %path,
                    files = node.files.len(),
                    subfolders = listing.folders.len(),
                    "Folder listed"
                );
            }

            // Subfolders found before a failed page are still visited. At most
            // `fan_out` children per folder are spawned at once; `buffered`
            // yields them in discovery order.
            let mut children = stream::iter(listing.folders)
                .map(|entry| {
                    let handle = tokio::spawn(Run::visit(
                        Arc::clone(&run),
                        entry.path.clone(),
                        entry.name.clone(),
                        false,
                    ));
                    async move { (entry, handle.await) }
                })
                .buffered(run.fan_out);

            while let Some((entry, joined)) = children.next().await {
                match joined {
                    Ok(child) => {
                        warnings.extend(child.warnings);
                        node.push_subfolder(child.node);
                    }
                    Err(err) => {
                        warn!(path = %entry.path, error = %err, "Folder visit aborted");
                        warnings.push(TraversalWarning::new(
                            entry.path.clone(),
                            format!("Visit aborted: {err}"),
                            WarningKind::RemoteUnavailable,
                        ));
                        node.push_subfolder(FolderNode::new(entry.path, entry.name));
                    }
                }
            }

            Visit {
                node,
                warnings,
                failure,
            }
        }
        .boxed()
    }

    /// Fetch every page of `path`, holding a worker slot for the duration.
    async fn list_folder(&self, path: &str) -> Listing {
        let mut listing = Listing::default();

        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                listing.cancelled = true;
                return listing;
            }
            permit = self.permits.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    listing.cancelled = true;
                    return listing;
                }
            },
        };

        self.emit(path, Phase::Listing);

        let fetcher = &self.fetcher;
        let mut token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page_token = token.as_deref();
            let result = self
                .policy
                .run(move || fetcher.list_children(path, page_token))
                .await;

            let page = match result {
                Ok(page) => page,
                Err(err) => {
                    listing.failure = Some(err);
                    break;
                }
            };
            pages += 1;

            for entry in page.entries {
                if self.config.should_skip(&entry.name) {
                    trace!(path = %entry.path, "Skipping system entry");
                    continue;
                }
                match entry.kind {
                    EntryKind::File => listing.files.push(entry),
                    EntryKind::Folder => listing.folders.push(entry),
                }
            }

            match page.next_page {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        trace!(path, pages, "Listing complete");
        listing
    }

    fn emit(&self, path: &str, phase: Phase) {
        let folders_done = if phase == Phase::Listing {
            self.folders_done.load(Ordering::Relaxed)
        } else {
            self.folders_done.fetch_add(1, Ordering::Relaxed) + 1
        };

        let _ = self.progress_tx.send(TraversalProgress {
            path: path.into(),
            phase,
            folders_done,
            files_seen: self.files_seen.load(Ordering::Relaxed),
            bytes_seen: self.bytes_seen.load(Ordering::Relaxed),
        });
    }
}

/// Display name for a folder path: its last segment, or `Root`.
pub fn folder_name(path: &str) -> CompactString {
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(CompactString::from)
        .unwrap_or_else(|| CompactString::from("Root"))
}
