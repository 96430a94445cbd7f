//! Disk Manager - low-level file I/O for tree pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading pages, verifying their checksum
//! - Writing pages, stamping their number and checksum
//! - Allocating new pages

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};

/// Manages disk I/O for a single page file.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Every page on disk carries a valid checksum: freshly allocated pages are
/// written as empty [`PageType::Free`] pages rather than raw zeros, so any
/// page that fails verification was damaged after it was written.
///
/// # Thread Safety
/// `DiskManager` is **single-threaded**. [`FileSnapshot`](crate::storage::FileSnapshot)
/// serializes access to it behind a mutex.
pub struct DiskManager {
    file: File,
    /// Number of pages in the file.
    page_count: u64,
}

impl DiskManager {
    /// Create a new page file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
        })
    }

    /// Open an existing page file.
    ///
    /// A trailing partial page (torn extension) is ignored.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let page_count = file.metadata()?.len() / PAGE_SIZE as u64;

        debug!(pages = page_count, "opened page file");
        Ok(Self { file, page_count })
    }

    /// Open an existing page file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Read a page from disk and verify it.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page doesn't exist
    /// - `Error::ChecksumMismatch` if the stored checksum is wrong
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.check_bounds(page_id)?;

        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        if !page.verify_checksum() {
            warn!(page = page_id.0, "page failed checksum verification");
            return Err(Error::ChecksumMismatch { page_id: page_id.0 });
        }

        Ok(page)
    }

    /// Write a page to disk.
    ///
    /// The page's header is stamped with `page_id` and a fresh checksum
    /// before it is written, so the caller does not need to maintain either.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been allocated.
    pub fn write_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        self.check_bounds(page_id)?;
        Self::stamp(page_id, page);

        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_data()?;

        Ok(())
    }

    /// Allocate a new page at the end of the file.
    ///
    /// The page is written as an empty free page with a valid checksum.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        let page_id = PageId::new(self.page_count);

        let mut page = Page::for_tree(PageType::Free, page_id, 0);
        Self::stamp(page_id, &mut page);

        self.file.seek(SeekFrom::Start(Self::offset_of(page_id)))?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_data()?;

        self.page_count += 1;
        Ok(page_id)
    }

    /// Flush file contents and metadata to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Get the number of pages in the file.
    #[inline]
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Get the total size of the page file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        self.page_count * PAGE_SIZE as u64
    }

    #[inline]
    fn offset_of(page_id: PageId) -> u64 {
        page_id.0 * PAGE_SIZE as u64
    }

    fn check_bounds(&self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }
        Ok(())
    }

    fn stamp(page_id: PageId, page: &mut Page) {
        let mut header = page.header();
        header.page_number = page_id.0;
        page.set_header(&PageHeader { checksum: 0, ..header });
        page.update_checksum();
    }
}
