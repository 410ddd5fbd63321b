//! Remote folder traversal engine for sharesize.
//!
//! This crate walks a remote folder tree through a [`PageFetcher`] and builds
//! a fully aggregated [`FolderTree`]. Key features:
//!
//! - **Bounded concurrency**: subfolders are visited in parallel, with a
//!   global cap on folders being listed at once
//! - **Deterministic output**: subfolders keep discovery order regardless of
//!   completion order
//! - **Retry with backoff** on throttling and transient failures
//! - **Partial results**: a failing subfolder becomes a warning, not an error
//! - **Top files** tracked across all workers
//!
//! # Example
//!
//! ```rust,ignore
//! use sharesize_scan::{TraversalConfig, TraversalEngine};
//!
//! let config = TraversalConfig::new("Shared Documents/Projects");
//! let engine = TraversalEngine::new(fetcher, config);
//! let tree = engine.run().await?;
//!
//! println!("Total size: {} bytes", tree.total_size());
//! println!("Warnings: {}", tree.warnings.len());
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,ignore
//! let mut progress_rx = engine.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("{:?} {}", progress.phase, progress.path);
//!     }
//! });
//! ```

mod fetcher;
mod progress;
mod retry;
mod top_files;
mod traversal;

pub use fetcher::{Page, PageFetcher};
pub use progress::{Phase, TraversalProgress};
pub use retry::{RetryPolicy, with_retry};
pub use top_files::TopFilesTracker;
pub use traversal::{TraversalEngine, folder_name};

// Re-export core types for convenience
pub use sharesize_core::{
    Entry, EntryKind, FetchError, FolderNode, FolderTree, RemoteUnavailable, TopFileRecord,
    TraversalConfig, TraversalError, TraversalWarning, WarningKind,
};
