//! Aggregated folder node.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;

/// Result of aggregating one remote folder.
///
/// Totals always equal the sum over direct files plus the totals of direct
/// subfolders. [`FolderNode::push_file`] and [`FolderNode::push_subfolder`]
/// maintain this; nodes built by hand can be checked with
/// [`FolderNode::is_consistent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    /// Server-relative path of this folder.
    pub path: CompactString,

    /// Folder name.
    pub name: CompactString,

    /// Sum of all descendant file sizes.
    pub total_size: u64,

    /// Number of descendant files, recursive.
    pub file_count: u64,

    /// Number of descendant folders, recursive, excluding self.
    pub folder_count: u64,

    /// Direct files in discovery order.
    #[serde(default)]
    pub files: Vec<Entry>,

    /// Direct subfolders in discovery order.
    #[serde(default)]
    pub subfolders: Vec<FolderNode>,
}

impl FolderNode {
    /// Create an empty folder node.
    pub fn new(path: impl Into<CompactString>, name: impl Into<CompactString>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            total_size: 0,
            file_count: 0,
            folder_count: 0,
            files: Vec::new(),
            subfolders: Vec::new(),
        }
    }

    /// Append a direct file and fold its size into the totals.
    pub fn push_file(&mut self, file: Entry) {
        self.total_size += file.size;
        self.file_count += 1;
        self.files.push(file);
    }

    /// Append a finished subfolder and fold its totals into ours.
    pub fn push_subfolder(&mut self, child: FolderNode) {
        self.total_size += child.total_size;
        self.file_count += child.file_count;
        self.folder_count += child.folder_count + 1;
        self.subfolders.push(child);
    }

    /// Check if the folder has no files and no subfolders.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.subfolders.is_empty()
    }

    /// Check the bottom-up sum invariant at every node of this subtree.
    pub fn is_consistent(&self) -> bool {
        let size: u64 = self.files.iter().map(|f| f.size).sum::<u64>()
            + self.subfolders.iter().map(|s| s.total_size).sum::<u64>();
        let files = self.files.len() as u64
            + self.subfolders.iter().map(|s| s.file_count).sum::<u64>();
        let folders = self
            .subfolders
            .iter()
            .map(|s| s.folder_count + 1)
            .sum::<u64>();

        size == self.total_size
            && files == self.file_count
            && folders == self.folder_count
            && self.subfolders.iter().all(FolderNode::is_consistent)
    }

    /// Iterate over every file in this subtree in pre-order.
    pub fn iter_files(&self) -> Box<dyn Iterator<Item = &Entry> + '_> {
        Box::new(
            self.files
                .iter()
                .chain(self.subfolders.iter().flat_map(|s| s.iter_files())),
        )
    }

    /// Find a descendant folder (or self) by path.
    pub fn find(&self, path: &str) -> Option<&FolderNode> {
        if self.path.as_str() == path {
            return Some(self);
        }
        self.subfolders.iter().find_map(|s| s.find(path))
    }
}
