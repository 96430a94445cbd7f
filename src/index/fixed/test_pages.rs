//! Hand-built pages for unit tests.
//!
//! Leaves use a 4-byte value holding the key as a little-endian `u32`.

use crate::common::PageId;
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::{MemorySnapshot, Snapshot};

use super::entry::{EntryArray, EntryLayout};

pub(crate) const VALUE_SIZE: usize = 4;

pub(crate) fn value_for(key: i64) -> [u8; 4] {
    (key as u32).to_le_bytes()
}

/// Install a leaf holding `keys`.
pub(crate) fn leaf(snapshot: &MemorySnapshot, keys: &[i64]) -> PageId {
    let pid = snapshot.allocate_page_id();
    let layout = EntryLayout::leaf(VALUE_SIZE);
    let mut page = Page::for_tree(PageType::FixedLeaf, pid, VALUE_SIZE as u16);
    set_count(&mut page, keys.len());
    let region = &mut page.as_mut_slice()[PageHeader::SIZE..];
    for (i, &key) in keys.iter().enumerate() {
        layout.write_entry(region, i, key, &value_for(key));
    }
    snapshot.put_page(pid, page);
    pid
}

/// Install a branch over `children`, each separated by its maximum key.
pub(crate) fn branch(snapshot: &MemorySnapshot, children: &[PageId]) -> PageId {
    let pid = snapshot.allocate_page_id();
    let layout = EntryLayout::branch();
    let mut page = Page::for_tree(PageType::FixedBranch, pid, 8);
    set_count(&mut page, children.len());
    let region = &mut page.as_mut_slice()[PageHeader::SIZE..];
    for (i, &child) in children.iter().enumerate() {
        layout.write_branch_entry(region, i, max_key(snapshot, child), child);
    }
    snapshot.put_page(pid, page);
    pid
}

fn set_count(page: &mut Page, count: usize) {
    let mut header = page.header();
    header.entry_count = count as u16;
    page.set_header(&header);
}

fn max_key(snapshot: &MemorySnapshot, pid: PageId) -> i64 {
    let page = snapshot.resolve_page(pid).unwrap();
    let header = page.header();
    let layout = if header.is_branch() {
        EntryLayout::branch()
    } else {
        EntryLayout::leaf(VALUE_SIZE)
    };
    let count = header.entry_count as usize;
    let array = EntryArray::new(&page.as_slice()[PageHeader::SIZE..], count, layout).unwrap();
    array.key_at(count - 1)
}
