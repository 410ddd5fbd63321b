//! Wire types returned by the Graph API.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::IgnoredAny;
use sharesize_core::Entry;

use crate::path::{DEFAULT_LIBRARIES, join_path};

/// A SharePoint site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A document library.
#[derive(Debug, Clone, Deserialize)]
pub struct Drive {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A `value` collection, with the link to the next page if any.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// A file or folder inside a drive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub last_modified_date_time: Option<DateTime<Utc>>,
    /// Present on folders; its content is not needed.
    #[serde(default)]
    pub folder: Option<IgnoredAny>,
    /// Present on files.
    #[serde(default)]
    pub file: Option<IgnoredAny>,
}

impl DriveItem {
    /// Convert into an [`Entry`] below `parent`.
    ///
    /// Items that are neither files nor folders (notebooks, packages) yield
    /// `None`.
    pub fn into_entry(self, parent: &str) -> Option<Entry> {
        let path = join_path(parent, &self.name);
        if self.folder.is_some() {
            Some(Entry::folder(path, self.name))
        } else if self.file.is_some() {
            Some(Entry::file(
                path,
                self.name,
                self.size.unwrap_or(0),
                self.last_modified_date_time,
            ))
        } else {
            None
        }
    }
}

/// Pick the default document library, falling back to the first drive.
pub fn pick_drive(drives: &[Drive]) -> Option<&Drive> {
    drives
        .iter()
        .find(|drive| DEFAULT_LIBRARIES.contains(&drive.name.as_str()))
        .or_else(|| drives.first())
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
