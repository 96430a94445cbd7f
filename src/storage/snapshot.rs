//! Read snapshots - the page and payload source iterators walk.
//!
//! A [`Snapshot`] is the read side of a transaction: it resolves page
//! numbers to pages and container names to their inline payload. Pages are
//! handed out as `Arc<Page>` so any number of iterators can hold the same
//! page without copying it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Read-only view of a transaction's pages and container payloads.
///
/// Implementations must return the same bytes for the same page number for
/// as long as the snapshot lives; iterators rely on that to hold pages across
/// calls without locking.
pub trait Snapshot {
    /// Fetch a page by number.
    ///
    /// # Errors
    /// `Error::PageNotFound`, or any I/O/checksum failure of the backing store.
    fn resolve_page(&self, page_id: PageId) -> Result<Arc<Page>>;

    /// Fetch the inline payload stored under `name`, if there is one.
    ///
    /// For a fixed-size tree this is its header, followed by the entry array
    /// when the tree is embedded.
    fn read_payload(&self, name: &str) -> Result<Option<Arc<[u8]>>>;
}

impl<S: Snapshot + ?Sized> Snapshot for &S {
    fn resolve_page(&self, page_id: PageId) -> Result<Arc<Page>> {
        (**self).resolve_page(page_id)
    }

    fn read_payload(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        (**self).read_payload(name)
    }
}

impl<S: Snapshot + ?Sized> Snapshot for Arc<S> {
    fn resolve_page(&self, page_id: PageId) -> Result<Arc<Page>> {
        (**self).resolve_page(page_id)
    }

    fn read_payload(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        (**self).read_payload(name)
    }
}

/// A snapshot held entirely in memory.
///
/// Used by tests and by callers that assemble trees in memory. Pages and
/// payloads are installed before iteration starts; replacing a page while an
/// iterator holds the old one is allowed, the iterator keeps reading the old
/// `Arc`.
///
/// # Thread Safety
/// - `pages`, `payloads`: `RwLock` — many readers, few writers
/// - `next_page_id`: atomic counter
#[derive(Debug, Default)]
pub struct MemorySnapshot {
    pages: RwLock<HashMap<PageId, Arc<Page>>>,
    payloads: RwLock<HashMap<String, Arc<[u8]>>>,
    next_page_id: AtomicU64,
}

impl MemorySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next unused page number.
    pub fn allocate_page_id(&self) -> PageId {
        PageId::new(self.next_page_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Install (or replace) a page.
    pub fn put_page(&self, page_id: PageId, page: Page) {
        self.pages.write().insert(page_id, Arc::new(page));
    }

    /// Install (or replace) the payload stored under `name`.
    pub fn put_payload(&self, name: impl Into<String>, payload: impl Into<Arc<[u8]>>) {
        self.payloads.write().insert(name.into(), payload.into());
    }

    /// Drop the payload stored under `name`.
    pub fn remove_payload(&self, name: &str) -> bool {
        self.payloads.write().remove(name).is_some()
    }

    /// Number of pages installed.
    pub fn page_count(&self) -> usize {
        self.pages.read().len()
    }
}

impl Snapshot for MemorySnapshot {
    fn resolve_page(&self, page_id: PageId) -> Result<Arc<Page>> {
        self.pages
            .read()
            .get(&page_id)
            .cloned()
            .ok_or(Error::PageNotFound(page_id.0))
    }

    fn read_payload(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        Ok(self.payloads.read().get(name).cloned())
    }
}
