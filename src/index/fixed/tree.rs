//! Read handle over one named fixed-size tree.

use std::sync::Arc;

use tracing::debug;

use crate::common::config::{EMBEDDED_THRESHOLD_BYTES, MAX_VALUE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::Snapshot;

use super::embedded::EmbeddedIterator;
use super::entry::EntryLayout;
use super::header::{TreeHeader, TreeKind};
use super::iter::{FixedSizeIterator, NullIterator, TreeIterator};
use super::large::LargeIterator;

/// A fixed-size tree as seen by one snapshot.
///
/// Opening reads the tree header from the container payload stored under the
/// tree's name. An embedded tree's payload is captured at that point and
/// shared by every iterator handed out afterwards.
///
/// # Example
/// ```
/// use fixedtree::{FixedSizeIterator, FixedSizeTree, MemorySnapshot, TreeHeader};
///
/// let snapshot = MemorySnapshot::new();
/// let mut payload = TreeHeader::Embedded { value_size: 0, entry_count: 2 }.encode();
/// payload.extend_from_slice(&5i64.to_le_bytes());
/// payload.extend_from_slice(&9i64.to_le_bytes());
/// snapshot.put_payload("ids", payload);
///
/// let tree = FixedSizeTree::open(&snapshot, "ids", 0)?;
/// let mut it = tree.iter();
/// assert!(it.seek(6)?);
/// assert_eq!(it.current_key()?, 9);
/// # Ok::<(), fixedtree::Error>(())
/// ```
pub struct FixedSizeTree<'s, S: Snapshot + ?Sized> {
    snapshot: &'s S,
    name: String,
    layout: EntryLayout,
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    Empty,
    Embedded {
        payload: Arc<[u8]>,
        count: usize,
    },
    Large {
        root: PageId,
        entry_count: u64,
        depth: u32,
        page_count: u64,
    },
}

impl<'s, S: Snapshot + ?Sized> FixedSizeTree<'s, S> {
    /// Open the tree stored under `name`, expecting values of `value_size`
    /// bytes.
    ///
    /// A missing payload opens as an empty tree.
    ///
    /// # Errors
    /// - `Error::ValueSizeTooLarge` if `value_size` exceeds [`MAX_VALUE_SIZE`]
    /// - `Error::ValueSizeMismatch` if the stored header records another width
    /// - `Error::CorruptHeader` if the header or the inline entry array is
    ///   malformed
    /// - any error of [`Snapshot::read_payload`]
    pub fn open(snapshot: &'s S, name: &str, value_size: usize) -> Result<Self> {
        if value_size > MAX_VALUE_SIZE {
            return Err(Error::ValueSizeTooLarge {
                requested: value_size,
                max: MAX_VALUE_SIZE,
            });
        }
        let layout = EntryLayout::leaf(value_size);

        let repr = match snapshot.read_payload(name)? {
            None => Repr::Empty,
            Some(payload) => Self::decode(payload, layout)?,
        };

        let tree = Self {
            snapshot,
            name: name.to_string(),
            layout,
            repr,
        };
        debug!(
            tree = %tree.name,
            kind = ?tree.kind(),
            entries = tree.number_of_entries(),
            "opened fixed-size tree"
        );
        Ok(tree)
    }

    fn decode(payload: Arc<[u8]>, layout: EntryLayout) -> Result<Repr> {
        let header = TreeHeader::decode(&payload)?;
        if header.value_size() != layout.value_size() {
            return Err(Error::ValueSizeMismatch {
                expected: layout.value_size(),
                actual: header.value_size(),
            });
        }
        if header.kind() == TreeKind::Empty {
            return Ok(Repr::Empty);
        }

        match header {
            TreeHeader::Embedded { entry_count, .. } => {
                let count = entry_count as usize;
                let end = TreeHeader::EMBEDDED_SIZE + layout.region_len(count);
                if payload.len() < end {
                    return Err(Error::CorruptHeader("embedded entries overrun payload"));
                }
                Ok(Repr::Embedded { payload, count })
            }
            TreeHeader::Large {
                entry_count,
                root,
                depth,
                page_count,
                ..
            } => {
                if !root.is_valid() {
                    return Err(Error::CorruptHeader("large tree without a root page"));
                }
                Ok(Repr::Large {
                    root,
                    entry_count,
                    depth,
                    page_count,
                })
            }
        }
    }

    /// Name the tree was opened under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_size(&self) -> usize {
        self.layout.value_size()
    }

    pub fn kind(&self) -> TreeKind {
        match self.repr {
            Repr::Empty => TreeKind::Empty,
            Repr::Embedded { .. } => TreeKind::Embedded,
            Repr::Large { .. } => TreeKind::Large,
        }
    }

    /// Entry count recorded in the tree header.
    pub fn number_of_entries(&self) -> u64 {
        match self.repr {
            Repr::Empty => 0,
            Repr::Embedded { count, .. } => count as u64,
            Repr::Large { entry_count, .. } => entry_count,
        }
    }

    /// Levels of a paged tree, leaves included. 0 for the other kinds.
    pub fn depth(&self) -> u32 {
        match self.repr {
            Repr::Large { depth, .. } => depth,
            _ => 0,
        }
    }

    /// Pages owned by a paged tree. 0 for the other kinds.
    pub fn page_count(&self) -> u64 {
        match self.repr {
            Repr::Large { page_count, .. } => page_count,
            _ => 0,
        }
    }

    /// Most entries an embedded tree of this value size holds before the
    /// engine moves it to pages.
    pub fn max_embedded_entries(&self) -> usize {
        EMBEDDED_THRESHOLD_BYTES / self.layout.entry_size()
    }

    /// A fresh, unpositioned iterator.
    pub fn iter(&self) -> TreeIterator<'s, S> {
        match &self.repr {
            Repr::Empty => TreeIterator::Null(NullIterator),
            Repr::Embedded { payload, count } => {
                let start = TreeHeader::EMBEDDED_SIZE;
                let end = start + self.layout.region_len(*count);
                TreeIterator::Embedded(EmbeddedIterator::new(
                    Arc::clone(payload),
                    start..end,
                    self.layout,
                ))
            }
            Repr::Large { root, depth, .. } => TreeIterator::Large(LargeIterator::new(
                self.snapshot,
                *root,
                self.layout,
                *depth as usize,
            )),
        }
    }

    /// Whether `key` is stored.
    pub fn contains(&self, key: i64) -> Result<bool> {
        let mut it = self.iter();
        let found = it.seek(key)? && it.current_key()? == key;
        it.dispose();
        Ok(found)
    }

    /// Copy of the value stored under `key`.
    pub fn get(&self, key: i64) -> Result<Option<Vec<u8>>> {
        let mut it = self.iter();
        let value = if it.seek(key)? && it.current_key()? == key {
            Some(it.value()?.to_vec())
        } else {
            None
        };
        it.dispose();
        Ok(value)
    }
}

impl<S: Snapshot + ?Sized> std::fmt::Debug for FixedSizeTree<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedSizeTree")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("value_size", &self.value_size())
            .field("entries", &self.number_of_entries())
            .finish()
    }
}
