//! Iterator over an embedded (inline) fixed-size tree.

use std::ops::Range;
use std::sync::Arc;

use crate::common::{Error, Result};

use super::entry::{EntryArray, EntryLayout};
use super::iter::{FixedSizeIterator, PAST_END};
use super::value::ValueSlice;

/// Walks the sorted entry array stored inline in the container payload.
///
/// The payload is captured when the tree is opened and never refreshed, so
/// the iterator does not observe later changes to the container. Seeking is
/// a binary search; stepping is an index increment. No pages are touched.
#[derive(Debug, Clone)]
pub struct EmbeddedIterator {
    payload: Arc<[u8]>,
    region: Range<usize>,
    layout: EntryLayout,
    count: usize,
    /// Current slot; `count` means unpositioned / past the end.
    pos: usize,
}

impl EmbeddedIterator {
    /// `region` must already be checked to hold `count` entries of `layout`.
    pub(crate) fn new(payload: Arc<[u8]>, region: Range<usize>, layout: EntryLayout) -> Self {
        let count = region.len() / layout.entry_size();
        Self {
            payload,
            region,
            layout,
            count,
            pos: count,
        }
    }

    #[inline]
    fn entries(&self) -> EntryArray<'_> {
        EntryArray::from_exact(&self.payload[self.region.clone()], self.layout)
    }

    #[inline]
    fn check_positioned(&self) -> Result<()> {
        if self.pos >= self.count {
            return Err(Error::InvalidState(PAST_END));
        }
        Ok(())
    }
}

impl FixedSizeIterator for EmbeddedIterator {
    fn seek(&mut self, key: i64) -> Result<bool> {
        self.pos = self.entries().lower_bound(key);
        Ok(self.pos != self.count)
    }

    fn current_key(&self) -> Result<i64> {
        self.check_positioned()?;
        Ok(self.entries().key_at(self.pos))
    }

    fn value(&self) -> Result<ValueSlice<'_>> {
        self.check_positioned()?;
        Ok(ValueSlice::new(self.entries().value_at(self.pos)))
    }

    fn move_next(&mut self) -> Result<bool> {
        self.check_positioned()?;
        self.pos += 1;
        Ok(self.pos < self.count)
    }

    fn dispose(&mut self) {
        // The payload stays shared with the tree.
        self.pos = self.count;
    }
}
