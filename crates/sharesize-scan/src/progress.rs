//! Traversal progress reporting.

use compact_str::CompactString;

/// Stage of a folder visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The folder's pages are being fetched.
    Listing,
    /// The folder's listing completed.
    Listed,
    /// The folder's listing failed; its subtree is partial.
    Failed,
    /// The folder was not visited because the run is shutting down.
    Skipped,
}

/// Progress information emitted during a traversal.
#[derive(Debug, Clone)]
pub struct TraversalProgress {
    /// Folder the event refers to.
    pub path: CompactString,
    /// What happened to it.
    pub phase: Phase,
    /// Folders whose listing has finished (successfully or not).
    pub folders_done: u64,
    /// Files seen so far across all workers.
    pub files_seen: u64,
    /// Bytes seen so far across all workers.
    pub bytes_seen: u64,
}

impl TraversalProgress {
    /// Check if this event ends a folder's listing.
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Listed | Phase::Failed | Phase::Skipped)
    }
}
