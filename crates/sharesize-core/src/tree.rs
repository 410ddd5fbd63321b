//! Completed traversal result.

use std::time::{Duration, SystemTime};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::config::TraversalConfig;
use crate::error::TraversalWarning;
use crate::node::FolderNode;

/// One of the largest files seen during a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopFileRecord {
    /// Server-relative path of the file.
    pub path: CompactString,
    /// File name.
    pub name: CompactString,
    /// Size in bytes.
    pub size: u64,
}

/// Aggregated folder tree with run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    /// Root node of the tree.
    pub root: FolderNode,

    /// When the traversal finished.
    pub scanned_at: SystemTime,

    /// Duration of the traversal.
    pub scan_duration: Duration,

    /// Configuration used.
    pub config: TraversalConfig,

    /// Largest files, descending by size.
    pub top_files: Vec<TopFileRecord>,

    /// Folders whose listing did not complete.
    pub warnings: Vec<TraversalWarning>,
}

impl FolderTree {
    /// Create a new folder tree.
    pub fn new(
        root: FolderNode,
        config: TraversalConfig,
        top_files: Vec<TopFileRecord>,
        scan_duration: Duration,
        warnings: Vec<TraversalWarning>,
    ) -> Self {
        Self {
            root,
            scanned_at: SystemTime::now(),
            scan_duration,
            config,
            top_files,
            warnings,
        }
    }

    /// Get the total size of the tree.
    pub fn total_size(&self) -> u64 {
        self.root.total_size
    }

    /// Get the total number of files.
    pub fn total_files(&self) -> u64 {
        self.root.file_count
    }

    /// Get the total number of folders below the root.
    pub fn total_folders(&self) -> u64 {
        self.root.folder_count
    }

    /// Check if there were any warnings during traversal.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
