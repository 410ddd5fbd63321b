//! Remote entry types.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Name prefix marking a system folder (`_catalogs`, `_cts`, ...).
pub const SYSTEM_PREFIX: char = '_';

/// Name of the hidden forms library present in every document library.
///
/// Matched exactly; localized variants are not recognised.
pub const FORMS_LIBRARY: &str = "Forms";

/// Check whether a name is reserved by the remote system.
pub fn is_system_name(name: &str) -> bool {
    name.starts_with(SYSTEM_PREFIX) || name == FORMS_LIBRARY
}

/// Kind of remote item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum EntryKind {
    /// Regular file with a server-reported size.
    File,
    /// Folder; its size is always computed from descendants.
    Folder,
}

/// One remote item as returned by a page listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Server-relative path, unique within a drive.
    pub path: CompactString,

    /// Item name (last path segment).
    pub name: CompactString,

    /// File or folder.
    pub kind: EntryKind,

    /// Size in bytes. Always 0 for folders as listed.
    pub size: u64,

    /// Last modification time, when the server reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create a file entry.
    pub fn file(
        path: impl Into<CompactString>,
        name: impl Into<CompactString>,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: EntryKind::File,
            size,
            last_modified,
        }
    }

    /// Create a folder entry.
    pub fn folder(path: impl Into<CompactString>, name: impl Into<CompactString>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: EntryKind::Folder,
            size: 0,
            last_modified: None,
        }
    }

    /// Check if this entry is a file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Check if this entry is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}
