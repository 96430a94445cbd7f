//! Fixed-size trees: `i64` keys mapped to values of one fixed width.
//!
//! A tree lives either inline in its container's payload (embedded) or as a
//! paged B+tree (large). [`FixedSizeTree::iter`] picks the matching
//! [`FixedSizeIterator`] so callers walk both the same way.
//!
//! ```text
//!   entry      ─ (key, value) codec and lower-bound search
//!   header     ─ tree header stored in the container payload
//!   cursor     ─ page + per-traversal position
//!   embedded   ─ inline array iterator
//!   large      ─ paged iterator with an explicit cursor stack
//!   iter       ─ iterator trait, null iterator, façade enum
//!   tree       ─ opens a tree and hands out iterators
//! ```

mod cursor;
mod embedded;
mod entry;
mod header;
mod iter;
mod large;
mod tree;
mod value;

#[cfg(test)]
mod test_pages;

pub use embedded::EmbeddedIterator;
pub use entry::{EntryArray, EntryLayout};
pub use header::{TreeHeader, TreeKind};
pub use iter::{FixedSizeIterator, Keys, NullIterator, TreeIterator};
pub use large::LargeIterator;
pub use tree::FixedSizeTree;
pub use value::{ValueReader, ValueSlice};
