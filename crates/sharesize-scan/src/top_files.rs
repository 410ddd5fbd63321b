//! Bounded tracker for the largest files seen during a traversal.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Mutex;

use compact_str::CompactString;
use sharesize_core::{Entry, TopFileRecord};

/// Heap slot ordered by size, then by observation order (earlier ranks higher).
#[derive(Debug, PartialEq, Eq)]
struct Ranked {
    size: u64,
    seq: u64,
    path: CompactString,
    name: CompactString,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.size
            .cmp(&other.size)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
struct Inner {
    // Min-heap: the weakest retained record sits on top.
    heap: BinaryHeap<Reverse<Ranked>>,
    observed: u64,
}

/// Keeps the `N` largest files observed, safe to share between workers.
///
/// Each observation costs `O(log N)`; the full file set is never rescanned.
#[derive(Debug)]
pub struct TopFilesTracker {
    limit: usize,
    inner: Mutex<Inner>,
}

impl TopFilesTracker {
    /// Create a tracker retaining at most `limit` files.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            inner: Mutex::new(Inner {
                heap: BinaryHeap::with_capacity(limit + 1),
                observed: 0,
            }),
        }
    }

    /// Offer a file to the tracker. Folders are ignored.
    pub fn observe(&self, entry: &Entry) {
        if !entry.is_file() {
            return;
        }

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let seq = inner.observed;
        inner.observed += 1;

        if self.limit == 0 {
            return;
        }

        if inner.heap.len() == self.limit {
            let weakest = match inner.heap.peek() {
                Some(Reverse(r)) => r,
                None => return,
            };
            // Equal size never displaces: the earlier observation wins the tie.
            if entry.size <= weakest.size {
                return;
            }
            inner.heap.pop();
        }

        inner.heap.push(Reverse(Ranked {
            size: entry.size,
            seq,
            path: entry.path.clone(),
            name: entry.name.clone(),
        }));
    }

    /// Number of files observed so far.
    pub fn observed(&self) -> u64 {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).observed
    }

    /// Retained files, largest first; ties in observation order.
    pub fn snapshot(&self) -> Vec<TopFileRecord> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut ranked: Vec<&Ranked> = inner.heap.iter().map(|Reverse(r)| r).collect();
        ranked.sort_by(|a, b| b.cmp(a));
        ranked
            .into_iter()
            .map(|r| TopFileRecord {
                path: r.path.clone(),
                name: r.name.clone(),
                size: r.size,
            })
            .collect()
    }
}

impl Default for TopFilesTracker {
    fn default() -> Self {
        Self::new(10)
    }
}
