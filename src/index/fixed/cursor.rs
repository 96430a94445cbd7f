//! Cursor frames: one page of a paged tree plus a traversal position.
//!
//! Pages are shared (`Arc<Page>`) between every iterator that reads them, so
//! the search position cannot live in the page. Each iterator keeps its own
//! position in a [`CursorFrame`]: the current leaf in one frame, each
//! ancestor on its cursor stack in another.

use std::sync::Arc;

use tracing::warn;

use crate::common::config::{PAGE_NUMBER_SIZE, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader};
use crate::storage::Snapshot;

use super::entry::{EntryArray, EntryLayout};

/// A resolved tree page and where a traversal stands on it.
#[derive(Debug, Clone)]
pub(crate) struct CursorFrame {
    page_id: PageId,
    page: Arc<Page>,
    layout: EntryLayout,
    is_branch: bool,
    start: usize,
    end: usize,
    /// Slot the traversal is on; `len()` means past the end of this page.
    pub(crate) pos: usize,
}

impl CursorFrame {
    /// Resolve `page_id` and validate it as a page of a paged tree.
    ///
    /// Leaf pages must carry the tree's value width and keys must be strictly
    /// ascending. The frame starts at slot 0.
    pub(crate) fn load<S: Snapshot + ?Sized>(
        snapshot: &S,
        page_id: PageId,
        leaf_layout: EntryLayout,
    ) -> Result<Self> {
        let page = snapshot.resolve_page(page_id)?;
        let header = page.header();

        if !header.page_type.is_tree_page() {
            return Err(reject(page_id, "not a fixed-size tree page"));
        }
        if header.page_number != page_id.0 {
            return Err(reject(page_id, "page number mismatch"));
        }

        let is_branch = header.is_branch();
        let layout = if is_branch {
            if header.value_size as usize != PAGE_NUMBER_SIZE {
                return Err(reject(page_id, "branch entry width is not a page number"));
            }
            EntryLayout::branch()
        } else {
            let actual = header.value_size as usize;
            if actual != leaf_layout.value_size() {
                return Err(Error::ValueSizeMismatch {
                    expected: leaf_layout.value_size(),
                    actual,
                });
            }
            leaf_layout
        };

        let count = header.entry_count as usize;
        if count == 0 {
            return Err(reject(page_id, "empty page in a paged tree"));
        }
        let start = header.start_position as usize;
        if start < PageHeader::SIZE {
            return Err(reject(page_id, "entry array overlaps page header"));
        }
        let end = start + layout.region_len(count);
        if end > PAGE_SIZE {
            return Err(reject(page_id, "entry array overruns page"));
        }

        let frame = Self {
            page_id,
            page,
            layout,
            is_branch,
            start,
            end,
            pos: 0,
        };
        if !frame.entries().is_sorted() {
            return Err(reject(page_id, "keys out of order"));
        }
        Ok(frame)
    }

    #[inline]
    pub(crate) fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub(crate) fn is_branch(&self) -> bool {
        self.is_branch
    }

    /// Number of entries on the page.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        (self.end - self.start) / self.layout.entry_size()
    }

    #[inline]
    pub(crate) fn entries(&self) -> EntryArray<'_> {
        EntryArray::from_exact(&self.page.as_slice()[self.start..self.end], self.layout)
    }

    #[inline]
    pub(crate) fn key(&self) -> i64 {
        self.entries().key_at(self.pos)
    }

    #[inline]
    pub(crate) fn value(&self) -> &[u8] {
        self.entries().value_at(self.pos)
    }

    /// Child page under the current slot of a branch page.
    #[inline]
    pub(crate) fn child(&self) -> PageId {
        self.entries().child_at(self.pos)
    }
}

fn reject(page_id: PageId, reason: &'static str) -> Error {
    warn!(page = page_id.0, reason, "rejected fixed-size tree page");
    Error::CorruptPage {
        page_id: page_id.0,
        reason,
    }
}
