//! Shared fixtures: bulk loaders for embedded payloads and paged trees.

#![allow(dead_code)]

use fixedtree::index::fixed::EntryLayout;
use fixedtree::{DiskManager, MemorySnapshot, Page, PageHeader, PageId, PageType, TreeHeader};

/// Deterministic value of width `value_size` for `key`.
pub fn value_of(key: i64, value_size: usize) -> Vec<u8> {
    key.to_le_bytes().iter().copied().cycle().take(value_size).collect()
}

/// Destination for pages produced by [`TreeBuilder`].
pub trait PageStore {
    fn allocate(&mut self) -> PageId;
    fn store(&mut self, page_id: PageId, page: Page);
}

impl PageStore for &MemorySnapshot {
    fn allocate(&mut self) -> PageId {
        self.allocate_page_id()
    }

    fn store(&mut self, page_id: PageId, page: Page) {
        self.put_page(page_id, page);
    }
}

impl PageStore for DiskManager {
    fn allocate(&mut self) -> PageId {
        self.allocate_page().unwrap()
    }

    fn store(&mut self, page_id: PageId, mut page: Page) {
        self.write_page(page_id, &mut page).unwrap();
    }
}

/// Result of bulk-loading a paged tree.
#[derive(Debug, Clone, Copy)]
pub struct LargeTree {
    pub root: PageId,
    pub depth: u32,
    pub page_count: u64,
    pub entries: u64,
    pub value_size: usize,
}

impl LargeTree {
    /// Tree header to store as the container payload.
    pub fn payload(&self) -> Vec<u8> {
        TreeHeader::Large {
            value_size: self.value_size as u16,
            entry_count: self.entries,
            root: self.root,
            depth: self.depth,
            page_count: self.page_count,
        }
        .encode()
    }
}

/// Bottom-up bulk loader with controllable fanout.
///
/// Small fanouts make deep trees out of few keys, which is what boundary
/// crossing tests need.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder {
    pub value_size: usize,
    pub leaf_fanout: usize,
    pub branch_fanout: usize,
}

impl TreeBuilder {
    pub fn new(value_size: usize, leaf_fanout: usize, branch_fanout: usize) -> Self {
        assert!(leaf_fanout >= 1);
        assert!(branch_fanout >= 2);
        Self {
            value_size,
            leaf_fanout,
            branch_fanout,
        }
    }

    /// Load `keys` (sorted, distinct, non-empty) into `store`.
    pub fn build<P: PageStore>(&self, store: &mut P, keys: &[i64]) -> LargeTree {
        assert!(!keys.is_empty());
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let leaf_layout = EntryLayout::leaf(self.value_size);
        let mut pages = 0u64;
        let mut level: Vec<(i64, PageId)> = Vec::new();

        for chunk in keys.chunks(self.leaf_fanout) {
            let pid = store.allocate();
            let mut page = Page::for_tree(PageType::FixedLeaf, pid, self.value_size as u16);
            set_count(&mut page, chunk.len());
            let region = &mut page.as_mut_slice()[PageHeader::SIZE..];
            for (i, &key) in chunk.iter().enumerate() {
                leaf_layout.write_entry(region, i, key, &value_of(key, self.value_size));
            }
            store.store(pid, page);
            pages += 1;
            level.push((*chunk.last().unwrap(), pid));
        }

        let branch_layout = EntryLayout::branch();
        let mut depth = 1;
        while level.len() > 1 {
            let mut parents = Vec::new();
            for chunk in level.chunks(self.branch_fanout) {
                let pid = store.allocate();
                let mut page = Page::for_tree(PageType::FixedBranch, pid, 8);
                set_count(&mut page, chunk.len());
                let region = &mut page.as_mut_slice()[PageHeader::SIZE..];
                for (i, &(max_key, child)) in chunk.iter().enumerate() {
                    branch_layout.write_branch_entry(region, i, max_key, child);
                }
                store.store(pid, page);
                pages += 1;
                parents.push((chunk.last().unwrap().0, pid));
            }
            level = parents;
            depth += 1;
        }

        LargeTree {
            root: level[0].1,
            depth,
            page_count: pages,
            entries: keys.len() as u64,
            value_size: self.value_size,
        }
    }
}

fn set_count(page: &mut Page, count: usize) {
    let mut header = page.header();
    header.entry_count = count as u16;
    page.set_header(&header);
}

/// Embedded payload (header plus inline entry array) holding `keys`.
pub fn embedded_payload(keys: &[i64], value_size: usize) -> Vec<u8> {
    let layout = EntryLayout::leaf(value_size);
    let mut payload = TreeHeader::Embedded {
        value_size: value_size as u16,
        entry_count: keys.len() as u16,
    }
    .encode();
    let start = payload.len();
    payload.resize(start + layout.region_len(keys.len()), 0);
    for (i, &key) in keys.iter().enumerate() {
        layout.write_entry(&mut payload[start..], i, key, &value_of(key, value_size));
    }
    payload
}

/// Install `keys` as an embedded tree under `name`.
pub fn install_embedded(snapshot: &MemorySnapshot, name: &str, keys: &[i64], value_size: usize) {
    snapshot.put_payload(name, embedded_payload(keys, value_size));
}

/// Install `keys` as a paged tree under `name`.
pub fn install_large(
    snapshot: &MemorySnapshot,
    name: &str,
    keys: &[i64],
    builder: TreeBuilder,
) -> LargeTree {
    let mut store = snapshot;
    let tree = builder.build(&mut store, keys);
    snapshot.put_payload(name, tree.payload());
    tree
}
