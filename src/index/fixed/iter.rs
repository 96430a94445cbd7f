//! The iteration contract shared by every tree representation.
//!
//! ```text
//!                   FixedSizeTree::iter()
//!                           │
//!        ┌──────────────────┼──────────────────┐
//!        ▼                  ▼                  ▼
//!   NullIterator    EmbeddedIterator     LargeIterator
//!   (no entries)    (inline array)       (paged, cursor stack)
//!        └──────────────────┼──────────────────┘
//!                           ▼
//!                   TreeIterator (enum)
//! ```
//!
//! Callers hold a [`TreeIterator`] and never branch on representation.

use std::iter::FusedIterator;

use crate::common::{Error, Result};
use crate::storage::Snapshot;

use super::embedded::EmbeddedIterator;
use super::header::TreeKind;
use super::large::LargeIterator;
use super::value::{ValueReader, ValueSlice};

pub(crate) const PAST_END: &str = "invalid position, cannot read past end of tree";
pub(crate) const NO_CURRENT_PAGE: &str = "no current page was set";

/// Ordered forward iteration over a fixed-size tree.
///
/// An iterator starts unpositioned. [`seek`](Self::seek) positions it on the
/// first key `>=` the target; [`move_next`](Self::move_next) walks forward in
/// ascending key order. Accessors fail with [`Error::InvalidState`] whenever
/// there is no current entry.
pub trait FixedSizeIterator {
    /// Position on the smallest key `>= key`.
    ///
    /// Returns `false`, leaving the iterator unpositioned, when every stored
    /// key is smaller than `key`.
    fn seek(&mut self, key: i64) -> Result<bool>;

    /// Key of the current entry.
    fn current_key(&self) -> Result<i64>;

    /// Value of the current entry, borrowed from the underlying page.
    fn value(&self) -> Result<ValueSlice<'_>>;

    /// Advance to the next key.
    ///
    /// Returns `false` once, when the end of the tree is passed; the iterator
    /// is then unpositioned and a further call is an `InvalidState` error.
    fn move_next(&mut self) -> Result<bool>;

    /// Sequential reader over the current entry's value.
    fn create_reader_for_current(&self) -> Result<ValueReader<'_>> {
        Ok(self.value()?.reader())
    }

    /// Drop the current position and any pages held for it.
    ///
    /// Idempotent and safe in any state. The iterator can be sought again
    /// afterwards and behaves like a fresh one.
    fn dispose(&mut self);

    /// Scan keys in ascending order, starting at the first key `>= start`.
    fn keys_from(&mut self, start: i64) -> Keys<'_, Self>
    where
        Self: Sized,
    {
        Keys::new(self, start)
    }
}

/// Iterator over an empty (or missing) tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIterator;

impl FixedSizeIterator for NullIterator {
    fn seek(&mut self, _key: i64) -> Result<bool> {
        Ok(false)
    }

    fn current_key(&self) -> Result<i64> {
        Err(Error::InvalidState(PAST_END))
    }

    fn value(&self) -> Result<ValueSlice<'_>> {
        Err(Error::InvalidState(PAST_END))
    }

    fn move_next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn create_reader_for_current(&self) -> Result<ValueReader<'_>> {
        Err(Error::InvalidState(NO_CURRENT_PAGE))
    }

    fn dispose(&mut self) {}
}

/// The iterator a [`FixedSizeTree`](super::FixedSizeTree) hands out.
///
/// The variant is chosen once, from the tree header, and never changes.
pub enum TreeIterator<'s, S: Snapshot + ?Sized> {
    Null(NullIterator),
    Embedded(EmbeddedIterator),
    Large(LargeIterator<'s, S>),
}

impl<S: Snapshot + ?Sized> TreeIterator<'_, S> {
    /// Representation this iterator walks.
    pub fn kind(&self) -> TreeKind {
        match self {
            TreeIterator::Null(_) => TreeKind::Empty,
            TreeIterator::Embedded(_) => TreeKind::Embedded,
            TreeIterator::Large(_) => TreeKind::Large,
        }
    }
}

impl<S: Snapshot + ?Sized> FixedSizeIterator for TreeIterator<'_, S> {
    fn seek(&mut self, key: i64) -> Result<bool> {
        match self {
            TreeIterator::Null(it) => it.seek(key),
            TreeIterator::Embedded(it) => it.seek(key),
            TreeIterator::Large(it) => it.seek(key),
        }
    }

    fn current_key(&self) -> Result<i64> {
        match self {
            TreeIterator::Null(it) => it.current_key(),
            TreeIterator::Embedded(it) => it.current_key(),
            TreeIterator::Large(it) => it.current_key(),
        }
    }

    fn value(&self) -> Result<ValueSlice<'_>> {
        match self {
            TreeIterator::Null(it) => it.value(),
            TreeIterator::Embedded(it) => it.value(),
            TreeIterator::Large(it) => it.value(),
        }
    }

    fn move_next(&mut self) -> Result<bool> {
        match self {
            TreeIterator::Null(it) => it.move_next(),
            TreeIterator::Embedded(it) => it.move_next(),
            TreeIterator::Large(it) => it.move_next(),
        }
    }

    fn create_reader_for_current(&self) -> Result<ValueReader<'_>> {
        match self {
            TreeIterator::Null(it) => it.create_reader_for_current(),
            TreeIterator::Embedded(it) => it.create_reader_for_current(),
            TreeIterator::Large(it) => it.create_reader_for_current(),
        }
    }

    fn dispose(&mut self) {
        match self {
            TreeIterator::Null(it) => it.dispose(),
            TreeIterator::Embedded(it) => it.dispose(),
            TreeIterator::Large(it) => it.dispose(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum KeysState {
    Seek(i64),
    Next,
    Done,
}

/// Keys of a [`FixedSizeIterator`] as a standard iterator.
///
/// Stops after the last key or after yielding the first error.
pub struct Keys<'i, I> {
    iter: &'i mut I,
    state: KeysState,
}

impl<'i, I: FixedSizeIterator> Keys<'i, I> {
    fn new(iter: &'i mut I, start: i64) -> Self {
        Self {
            iter,
            state: KeysState::Seek(start),
        }
    }
}

impl<I: FixedSizeIterator> Iterator for Keys<'_, I> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        let positioned = match self.state {
            KeysState::Seek(key) => self.iter.seek(key),
            KeysState::Next => self.iter.move_next(),
            KeysState::Done => return None,
        };

        let step = positioned.and_then(|more| {
            if more {
                self.iter.current_key().map(Some)
            } else {
                Ok(None)
            }
        });

        match step {
            Ok(Some(key)) => {
                self.state = KeysState::Next;
                Some(Ok(key))
            }
            Ok(None) => {
                self.state = KeysState::Done;
                None
            }
            Err(err) => {
                self.state = KeysState::Done;
                Some(Err(err))
            }
        }
    }
}

impl<I: FixedSizeIterator> FusedIterator for Keys<'_, I> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySnapshot;

    #[test]
    fn test_null_iterator() {
        let mut it = NullIterator;
        assert!(!it.seek(0).unwrap());
        assert!(!it.seek(i64::MIN).unwrap());
        assert!(!it.move_next().unwrap());
        assert!(!it.move_next().unwrap());
        assert!(matches!(it.current_key(), Err(Error::InvalidState(_))));
        assert!(matches!(it.value(), Err(Error::InvalidState(_))));
        assert!(matches!(
            it.create_reader_for_current(),
            Err(Error::InvalidState(_))
        ));
        it.dispose();
        it.dispose();
    }

    #[test]
    fn test_null_keys_is_empty() {
        let mut it = NullIterator;
        assert_eq!(it.keys_from(i64::MIN).count(), 0);
    }

    #[test]
    fn test_facade_kind() {
        let it: TreeIterator<'_, MemorySnapshot> = TreeIterator::Null(NullIterator);
        assert_eq!(it.kind(), TreeKind::Empty);
    }
}
