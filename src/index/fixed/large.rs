//! Iterator over a paged fixed-size tree.
//!
//! Leaves carry no sibling pointers. Moving from the last entry of one leaf
//! to the first entry of the next means climbing to the nearest ancestor
//! with an unvisited child and descending again, so the iterator keeps the
//! ancestors it came through on an explicit cursor stack:
//!
//! ```text
//!               ┌──────────┐
//!   cursor[0]   │  root    │  pos = 1
//!               └────┬─────┘
//!               ┌────▼─────┐
//!   cursor[1]   │  branch  │  pos = 0
//!               └────┬─────┘
//!               ┌────▼─────┐
//!   current     │  leaf    │  pos = 3  ← current entry
//!               └──────────┘
//! ```
//!
//! Within a leaf a step is an index increment. A leaf crossing costs at most
//! one pop and one push per level. The stack's capacity is reserved from the
//! tree depth, so a traversal does not allocate after construction.

use tracing::{debug, trace};

use crate::common::config::MAX_TREE_DEPTH;
use crate::common::{Error, PageId, Result};
use crate::storage::Snapshot;

use super::cursor::CursorFrame;
use super::entry::EntryLayout;
use super::iter::{FixedSizeIterator, NO_CURRENT_PAGE};
use super::value::ValueSlice;

/// Walks a paged tree leaf by leaf.
pub struct LargeIterator<'s, S: Snapshot + ?Sized> {
    snapshot: &'s S,
    root: PageId,
    layout: EntryLayout,
    /// Leaf holding the current entry; `None` when unpositioned or past end.
    current: Option<CursorFrame>,
    /// Ancestors of `current`, root first, each on the child it descended into.
    cursor: Vec<CursorFrame>,
}

impl<'s, S: Snapshot + ?Sized> LargeIterator<'s, S> {
    pub(crate) fn new(snapshot: &'s S, root: PageId, layout: EntryLayout, depth: usize) -> Self {
        Self {
            snapshot,
            root,
            layout,
            current: None,
            cursor: Vec::with_capacity(depth.clamp(1, MAX_TREE_DEPTH)),
        }
    }

    /// Number of ancestor frames currently held.
    pub fn cursor_depth(&self) -> usize {
        self.cursor.len()
    }

    fn load(&self, page_id: PageId) -> Result<CursorFrame> {
        CursorFrame::load(self.snapshot, page_id, self.layout)
    }

    fn push(&mut self, frame: CursorFrame) -> Result<()> {
        if self.cursor.len() >= MAX_TREE_DEPTH {
            return Err(Error::CorruptPage {
                page_id: frame.page_id().0,
                reason: "tree is deeper than the traversal limit",
            });
        }
        self.cursor.push(frame);
        Ok(())
    }

    /// Follow the child under each branch's current slot down to a leaf.
    /// Every child is entered at slot 0.
    fn descend(&mut self, mut frame: CursorFrame) -> Result<CursorFrame> {
        while frame.is_branch() {
            let child = frame.child();
            self.push(frame)?;
            frame = self.load(child)?;
        }
        Ok(frame)
    }

    /// Step past `frame`'s current slot, climbing the cursor stack whenever a
    /// page runs out.
    fn advance(&mut self, mut frame: CursorFrame) -> Result<bool> {
        loop {
            frame.pos += 1;
            if frame.pos < frame.len() {
                let crossing = frame.is_branch();
                let leaf = self.descend(frame)?;
                if crossing {
                    debug!(
                        page = leaf.page_id().0,
                        depth = self.cursor.len(),
                        "iterator crossed into next leaf"
                    );
                }
                self.current = Some(leaf);
                return Ok(true);
            }

            match self.cursor.pop() {
                Some(parent) => frame = parent,
                None => return Ok(false),
            }
        }
    }

    fn seek_from_root(&mut self, key: i64) -> Result<bool> {
        let mut frame = self.load(self.root)?;

        while frame.is_branch() {
            // First child whose separator (its maximum key) is >= key. Past
            // the last separator nothing can match; the last child's leaf
            // will report that.
            let pos = frame.entries().lower_bound(key).min(frame.len() - 1);
            frame.pos = pos;
            trace!(page = frame.page_id().0, pos, "descending");

            let child = frame.child();
            self.push(frame)?;
            frame = self.load(child)?;
        }

        frame.pos = frame.entries().lower_bound(key);
        if frame.pos < frame.len() {
            self.current = Some(frame);
            return Ok(true);
        }

        // The separator overstated this leaf's range; the answer, if any,
        // is the first entry of the next leaf.
        match self.cursor.pop() {
            Some(parent) => self.advance(parent),
            None => Ok(false),
        }
    }

    fn current(&self) -> Result<&CursorFrame> {
        self.current
            .as_ref()
            .ok_or(Error::InvalidState(NO_CURRENT_PAGE))
    }

    fn settle(&mut self, outcome: Result<bool>) -> Result<bool> {
        if !matches!(outcome, Ok(true)) {
            self.dispose();
        }
        outcome
    }
}

impl<S: Snapshot + ?Sized> FixedSizeIterator for LargeIterator<'_, S> {
    fn seek(&mut self, key: i64) -> Result<bool> {
        self.dispose();
        let outcome = self.seek_from_root(key);
        self.settle(outcome)
    }

    fn current_key(&self) -> Result<i64> {
        Ok(self.current()?.key())
    }

    fn value(&self) -> Result<ValueSlice<'_>> {
        Ok(ValueSlice::new(self.current()?.value()))
    }

    fn move_next(&mut self) -> Result<bool> {
        let frame = self
            .current
            .take()
            .ok_or(Error::InvalidState(NO_CURRENT_PAGE))?;
        let outcome = self.advance(frame);
        self.settle(outcome)
    }

    fn dispose(&mut self) {
        self.current = None;
        self.cursor.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixed::test_pages::{branch, leaf, value_for, VALUE_SIZE};
    use crate::storage::MemorySnapshot;

    fn iterator(snapshot: &MemorySnapshot, root: PageId) -> LargeIterator<'_, MemorySnapshot> {
        LargeIterator::new(snapshot, root, EntryLayout::leaf(VALUE_SIZE), 3)
    }

    fn drain(it: &mut LargeIterator<'_, MemorySnapshot>) -> Vec<i64> {
        let mut keys = vec![it.current_key().unwrap()];
        while it.move_next().unwrap() {
            keys.push(it.current_key().unwrap());
        }
        keys
    }

    /// Two leaves {1,2,3} and {10,11,12} under one branch.
    fn two_leaf_tree(snapshot: &MemorySnapshot) -> PageId {
        let left = leaf(snapshot, &[1, 2, 3]);
        let right = leaf(snapshot, &[10, 11, 12]);
        branch(snapshot, &[left, right])
    }

    /// Three levels: root -> 2 branches -> 4 leaves.
    fn three_level_tree(snapshot: &MemorySnapshot) -> PageId {
        let l0 = leaf(snapshot, &[1, 2]);
        let l1 = leaf(snapshot, &[4, 6]);
        let l2 = leaf(snapshot, &[8, 9]);
        let l3 = leaf(snapshot, &[20, 30]);
        let b0 = branch(snapshot, &[l0, l1]);
        let b1 = branch(snapshot, &[l2, l3]);
        branch(snapshot, &[b0, b1])
    }

    #[test]
    fn test_cross_leaf_boundary() {
        let snapshot = MemorySnapshot::new();
        let root = two_leaf_tree(&snapshot);
        let mut it = iterator(&snapshot, root);

        assert!(it.seek(3).unwrap());
        assert_eq!(it.current_key().unwrap(), 3);
        assert!(it.move_next().unwrap());
        assert_eq!(it.current_key().unwrap(), 10);
        assert!(it.move_next().unwrap());
        assert_eq!(it.current_key().unwrap(), 11);
        assert!(it.move_next().unwrap());
        assert_eq!(it.current_key().unwrap(), 12);
        assert!(!it.move_next().unwrap());

        assert_eq!(it.cursor_depth(), 0);
        assert!(matches!(it.current_key(), Err(Error::InvalidState(_))));
        assert!(matches!(it.move_next(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_values_follow_keys() {
        let snapshot = MemorySnapshot::new();
        let root = two_leaf_tree(&snapshot);
        let mut it = iterator(&snapshot, root);

        assert!(it.seek(11).unwrap());
        assert_eq!(it.value().unwrap().as_bytes(), &value_for(11));
        let mut reader = it.create_reader_for_current().unwrap();
        assert_eq!(reader.read_i32().unwrap(), 11);
    }

    #[test]
    fn test_seek_lands_on_next_key() {
        let snapshot = MemorySnapshot::new();
        let root = two_leaf_tree(&snapshot);
        let mut it = iterator(&snapshot, root);

        assert!(it.seek(4).unwrap());
        assert_eq!(it.current_key().unwrap(), 10);
        assert!(it.seek(i64::MIN).unwrap());
        assert_eq!(it.current_key().unwrap(), 1);
        assert!(!it.seek(13).unwrap());
        assert!(matches!(it.value(), Err(Error::InvalidState(_))));
        assert_eq!(it.cursor_depth(), 0);
    }

    #[test]
    fn test_three_level_scan() {
        let snapshot = MemorySnapshot::new();
        let root = three_level_tree(&snapshot);
        let mut it = iterator(&snapshot, root);

        assert!(it.seek(i64::MIN).unwrap());
        assert_eq!(it.cursor_depth(), 2);
        assert_eq!(drain(&mut it), vec![1, 2, 4, 6, 8, 9, 20, 30]);
        assert_eq!(it.cursor_depth(), 0);
    }

    #[test]
    fn test_three_level_boundary_crossing() {
        let snapshot = MemorySnapshot::new();
        let root = three_level_tree(&snapshot);
        let mut it = iterator(&snapshot, root);

        // Last entry of the last leaf under the first branch.
        assert!(it.seek(6).unwrap());
        assert_eq!(it.current_key().unwrap(), 6);
        assert!(it.move_next().unwrap());
        assert_eq!(it.current_key().unwrap(), 8);
        assert_eq!(it.cursor_depth(), 2);
    }

    #[test]
    fn test_stale_separator_falls_through_to_next_leaf() {
        let snapshot = MemorySnapshot::new();
        let left = leaf(&snapshot, &[1, 2, 3]);
        let right = leaf(&snapshot, &[10, 11]);
        let root = branch(&snapshot, &[left, right]);

        // Rewrite the left leaf without its maximum; the separator stays at 3.
        let shrunk = leaf(&snapshot, &[1, 2]);
        let page = snapshot.resolve_page(shrunk).unwrap();
        let mut copy = crate::storage::page::Page::new();
        copy.as_mut_slice().copy_from_slice(page.as_slice());
        let mut header = copy.header();
        header.page_number = left.0;
        copy.set_header(&header);
        snapshot.put_page(left, copy);

        let mut it = iterator(&snapshot, root);
        assert!(it.seek(3).unwrap());
        assert_eq!(it.current_key().unwrap(), 10);
    }

    #[test]
    fn test_single_leaf_root() {
        let snapshot = MemorySnapshot::new();
        let root = leaf(&snapshot, &[5, 7]);
        let mut it = iterator(&snapshot, root);

        assert!(it.seek(6).unwrap());
        assert_eq!(drain(&mut it), vec![7]);
        assert!(!it.seek(8).unwrap());
    }

    #[test]
    fn test_missing_child_propagates() {
        let snapshot = MemorySnapshot::new();
        let left = leaf(&snapshot, &[1]);
        let right = leaf(&snapshot, &[2]);
        let root = branch(&snapshot, &[left, right]);
        let orphaned = MemorySnapshot::new();
        for pid in [left, root] {
            let page = snapshot.resolve_page(pid).unwrap();
            let mut copy = crate::storage::page::Page::new();
            copy.as_mut_slice().copy_from_slice(page.as_slice());
            orphaned.put_page(pid, copy);
        }

        let mut it = iterator(&orphaned, root);
        assert!(it.seek(1).unwrap());
        assert!(matches!(it.move_next(), Err(Error::PageNotFound(_))));
        // The failed step leaves the iterator unpositioned.
        assert!(matches!(it.current_key(), Err(Error::InvalidState(_))));
        assert_eq!(it.cursor_depth(), 0);
    }

    #[test]
    fn test_dispose_in_any_state() {
        let snapshot = MemorySnapshot::new();
        let root = two_leaf_tree(&snapshot);

        let mut never_sought = iterator(&snapshot, root);
        never_sought.dispose();
        never_sought.dispose();

        let mut it = iterator(&snapshot, root);
        assert!(it.seek(2).unwrap());
        it.dispose();
        it.dispose();
        assert!(matches!(it.current_key(), Err(Error::InvalidState(_))));
        assert!(it.seek(2).unwrap());
    }

    #[test]
    fn test_interleaved_iterators_are_independent() {
        let snapshot = MemorySnapshot::new();
        let root = three_level_tree(&snapshot);
        let mut a = iterator(&snapshot, root);
        let mut b = iterator(&snapshot, root);

        assert!(a.seek(i64::MIN).unwrap());
        assert!(b.seek(8).unwrap());
        assert!(a.move_next().unwrap());
        assert!(a.move_next().unwrap());
        assert_eq!(a.current_key().unwrap(), 4);
        assert_eq!(b.current_key().unwrap(), 8);
        assert!(b.move_next().unwrap());
        assert_eq!(b.current_key().unwrap(), 9);
        assert_eq!(a.current_key().unwrap(), 4);
    }
}
