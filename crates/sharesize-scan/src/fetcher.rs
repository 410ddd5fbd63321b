//! Page listing contract for remote folders.

use std::future::Future;
use std::sync::Arc;

use sharesize_core::{Entry, FetchError};

/// One page of a folder listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Direct children on this page, in server order.
    pub entries: Vec<Entry>,
    /// Opaque token for the next page, `None` on the last page.
    pub next_page: Option<String>,
}

impl Page {
    /// Create a page.
    pub fn new(entries: Vec<Entry>, next_page: Option<String>) -> Self {
        Self { entries, next_page }
    }

    /// Create the final page of a listing.
    pub fn last(entries: Vec<Entry>) -> Self {
        Self::new(entries, None)
    }
}

/// Lists the immediate children of a remote folder, one page at a time.
///
/// Implementations must be read-only and idempotent: the traversal may call
/// `list_children` again with the same arguments after a failure.
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of children of `path`. `page_token` is `None` for the
    /// first page and the previous page's `next_page` afterwards.
    fn list_children(
        &self,
        path: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

impl<T: PageFetcher> PageFetcher for Arc<T> {
    fn list_children(
        &self,
        path: &str,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<Page, FetchError>> + Send {
        (**self).list_children(path, page_token)
    }
}
