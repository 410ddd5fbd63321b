//! Flattening of the folder tree into report rows.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use sharesize_core::{Entry, EntryKind, FolderNode};

/// One row of the tabular report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    /// Server-relative path.
    pub path: CompactString,
    /// Folder or file name.
    pub name: CompactString,
    /// Whether the row describes a folder or a file.
    pub kind: EntryKind,
    /// File size, or aggregate size for folders.
    pub size: u64,
    /// Descendant files (0 for file rows).
    pub file_count: u64,
    /// Descendant folders (0 for file rows).
    pub folder_count: u64,
}

impl RowRecord {
    /// Row for an aggregated folder.
    pub fn folder(node: &FolderNode) -> Self {
        Self {
            path: node.path.clone(),
            name: node.name.clone(),
            kind: EntryKind::Folder,
            size: node.total_size,
            file_count: node.file_count,
            folder_count: node.folder_count,
        }
    }

    /// Row for a file.
    pub fn file(entry: &Entry) -> Self {
        Self {
            path: entry.path.clone(),
            name: entry.name.clone(),
            kind: EntryKind::File,
            size: entry.size,
            file_count: 0,
            folder_count: 0,
        }
    }
}

/// Builds the flat row sequence used by the CSV export.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    /// Create an assembler.
    pub fn new() -> Self {
        Self
    }

    /// Flatten `root` in pre-order: each folder row, then its direct files,
    /// then its subfolders in stored order.
    pub fn flatten(&self, root: &FolderNode) -> Vec<RowRecord> {
        // Stored counts may be arbitrary after `read_json`; never size from them.
        let mut rows = Vec::new();
        // Explicit stack: deep trees must not overflow the call stack.
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            rows.push(RowRecord::folder(node));
            rows.extend(node.files.iter().map(RowRecord::file));
            stack.extend(node.subfolders.iter().rev());
        }

        rows
    }
}
