//! Entry codec for fixed-stride (key, value) arrays.
//!
//! Every byte offset computed while reading a fixed-size tree is computed
//! here. [`EntryArray`] is built once over a region whose length has been
//! checked against the entry count, after which indexing by slot cannot leave
//! the region.
//!
//! # Entry layout
//! ```text
//! ┌────────────────┬──────────────────────────┐
//! │ key (i64, LE)  │ value (value_size bytes) │   leaf: 8 + value_size
//! ├────────────────┼──────────────────────────┤
//! │ key (i64, LE)  │ child page (u64, LE)     │   branch: 16
//! └────────────────┴──────────────────────────┘
//! ```

use crate::common::config::{KEY_SIZE, PAGE_NUMBER_SIZE};
use crate::common::PageId;

/// Stride and value width of one kind of entry array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    value_size: usize,
}

impl EntryLayout {
    /// Layout of leaf (and embedded) entries for a tree with `value_size`.
    #[inline]
    pub const fn leaf(value_size: usize) -> Self {
        Self { value_size }
    }

    /// Layout of branch entries: key and child page number.
    #[inline]
    pub const fn branch() -> Self {
        Self {
            value_size: PAGE_NUMBER_SIZE,
        }
    }

    #[inline]
    pub const fn value_size(&self) -> usize {
        self.value_size
    }

    /// Size of one entry: key plus value.
    #[inline]
    pub const fn entry_size(&self) -> usize {
        KEY_SIZE + self.value_size
    }

    /// Bytes taken by `count` entries.
    #[inline]
    pub const fn region_len(&self, count: usize) -> usize {
        count * self.entry_size()
    }

    /// Encode `(key, value)` into slot `index` of `region`.
    ///
    /// # Panics
    /// Panics if `value` is not exactly `value_size` bytes or the slot does
    /// not fit in `region`.
    pub fn write_entry(&self, region: &mut [u8], index: usize, key: i64, value: &[u8]) {
        assert_eq!(value.len(), self.value_size, "value width mismatch");
        let start = index * self.entry_size();
        region[start..start + KEY_SIZE].copy_from_slice(&key.to_le_bytes());
        region[start + KEY_SIZE..start + self.entry_size()].copy_from_slice(value);
    }

    /// Encode a branch entry pointing at `child` into slot `index`.
    pub fn write_branch_entry(&self, region: &mut [u8], index: usize, key: i64, child: PageId) {
        self.write_entry(region, index, key, &child.to_le_bytes());
    }
}

/// A validated, read-only view of a sorted entry array.
#[derive(Debug, Clone, Copy)]
pub struct EntryArray<'a> {
    data: &'a [u8],
    count: usize,
    layout: EntryLayout,
}

impl<'a> EntryArray<'a> {
    /// View the first `count` entries of `data`.
    ///
    /// Returns `None` when `data` is too short to hold them.
    pub fn new(data: &'a [u8], count: usize, layout: EntryLayout) -> Option<Self> {
        let len = layout.region_len(count);
        let data = data.get(..len)?;
        Some(Self {
            data,
            count,
            layout,
        })
    }

    /// View a region already checked to hold a whole number of entries.
    #[inline]
    pub(crate) fn from_exact(data: &'a [u8], layout: EntryLayout) -> Self {
        debug_assert_eq!(data.len() % layout.entry_size(), 0);
        Self {
            data,
            count: data.len() / layout.entry_size(),
            layout,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn layout(&self) -> EntryLayout {
        self.layout
    }

    /// Key stored in slot `index`.
    #[inline]
    pub fn key_at(&self, index: usize) -> i64 {
        debug_assert!(index < self.count);
        let start = index * self.layout.entry_size();
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&self.data[start..start + KEY_SIZE]);
        i64::from_le_bytes(bytes)
    }

    /// Value bytes stored in slot `index`.
    #[inline]
    pub fn value_at(&self, index: usize) -> &'a [u8] {
        debug_assert!(index < self.count);
        let start = index * self.layout.entry_size() + KEY_SIZE;
        &self.data[start..start + self.layout.value_size]
    }

    /// Child page number stored in branch slot `index`.
    #[inline]
    pub fn child_at(&self, index: usize) -> PageId {
        let mut bytes = [0u8; PAGE_NUMBER_SIZE];
        bytes.copy_from_slice(&self.value_at(index)[..PAGE_NUMBER_SIZE]);
        PageId::from_le_bytes(bytes)
    }

    /// Lowest slot whose key is `>= key`, or `len()` if there is none.
    ///
    /// Embedded search and every level of a paged descent use this one rule,
    /// so both representations agree on where a seek lands.
    pub fn lower_bound(&self, key: i64) -> usize {
        let (mut low, mut high) = (0, self.count);
        while low < high {
            let mid = low + (high - low) / 2;
            if self.key_at(mid) < key {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }

    /// Whether keys are strictly increasing.
    pub fn is_sorted(&self) -> bool {
        (1..self.count).all(|i| self.key_at(i - 1) < self.key_at(i))
    }
}
