//! A [`Snapshot`] backed by a page file on disk.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::common::{PageId, Result};
use crate::storage::page::Page;
use crate::storage::snapshot::Snapshot;
use crate::storage::DiskManager;

/// Read snapshot over a [`DiskManager`].
///
/// Pages are read (and checksum-verified) on first use and cached, so every
/// iterator over it sees the same bytes.
///
/// # Memory
/// The cache is unbounded: a snapshot keeps every page it has read until it
/// is dropped or [`FileSnapshot::evict_unused`] is called. Keep snapshots
/// short-lived over large files, or evict between scans.
/// Container payloads live in the caller's catalog, not in the page file;
/// they are registered with [`FileSnapshot::put_payload`].
///
/// # Thread Safety
/// - `disk`: `Mutex` — the disk manager is single-threaded
/// - `cache`: `RwLock` — hits only take the read lock
/// - `payloads`: `RwLock`
pub struct FileSnapshot {
    disk: Mutex<DiskManager>,
    cache: RwLock<HashMap<PageId, Arc<Page>>>,
    payloads: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl FileSnapshot {
    /// Wrap an open disk manager.
    pub fn new(disk: DiskManager) -> Self {
        Self {
            disk: Mutex::new(disk),
            cache: RwLock::new(HashMap::new()),
            payloads: RwLock::new(HashMap::new()),
        }
    }

    /// Open an existing page file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DiskManager::open(path)?))
    }

    /// Register the payload stored under `name`.
    pub fn put_payload(&self, name: impl Into<String>, payload: impl Into<Arc<[u8]>>) {
        self.payloads.write().insert(name.into(), payload.into());
    }

    /// Number of pages read from disk so far.
    pub fn cached_pages(&self) -> usize {
        self.cache.read().len()
    }

    /// Drop cached pages that no iterator currently holds.
    ///
    /// Returns the number of pages evicted. An evicted page is re-read from
    /// disk on its next use; the file is not written while the snapshot
    /// lives, so the bytes are the same.
    pub fn evict_unused(&self) -> usize {
        let mut cache = self.cache.write();
        let before = cache.len();
        cache.retain(|_, page| Arc::strong_count(page) > 1);
        let evicted = before - cache.len();
        trace!(evicted, kept = cache.len(), "evicted unused pages");
        evicted
    }

    /// Number of pages in the underlying file.
    pub fn page_count(&self) -> u64 {
        self.disk.lock().page_count()
    }
}

impl Snapshot for FileSnapshot {
    fn resolve_page(&self, page_id: PageId) -> Result<Arc<Page>> {
        if let Some(page) = self.cache.read().get(&page_id) {
            return Ok(Arc::clone(page));
        }

        let page = {
            let mut disk = self.disk.lock();
            Arc::new(disk.read_page(page_id)?)
        };
        trace!(page = page_id.0, "page read from disk");

        // Another reader may have raced us here; keep whichever landed first.
        let mut cache = self.cache.write();
        Ok(Arc::clone(cache.entry(page_id).or_insert(page)))
    }

    fn read_payload(&self, name: &str) -> Result<Option<Arc<[u8]>>> {
        Ok(self.payloads.read().get(name).cloned())
    }
}
