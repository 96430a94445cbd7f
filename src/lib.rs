//! fixedtree - ordered iteration over fixed-size trees.
//!
//! A fixed-size tree maps `i64` keys to values of one fixed width. Small
//! trees are stored inline in their container's payload; large ones are
//! paged B+trees. Both are read through the same iterator contract.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           fixedtree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/fixed/)                  │   │
//! │  │   FixedSizeTree → TreeIterator                           │   │
//! │  │        Null | Embedded (inline) | Large (cursor stack)   │   │
//! │  │   EntryArray codec + lower-bound search                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Snapshot (storage/snapshot)                    │   │
//! │  │     resolve_page + read_payload                          │   │
//! │  │     MemorySnapshot | FileSnapshot                        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     DiskManager + Page + PageHeader                      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - Page formats, disk I/O and snapshots
//! - [`index`] - Fixed-size trees and their iterators
//!
//! # Quick Start
//! ```no_run
//! use fixedtree::{FileSnapshot, FixedSizeIterator, FixedSizeTree};
//!
//! # fn main() -> fixedtree::Result<()> {
//! let snapshot = FileSnapshot::open("trees.db")?;
//! let tree = FixedSizeTree::open(&snapshot, "events", 16)?;
//!
//! let mut it = tree.iter();
//! if it.seek(1_000)? {
//!     loop {
//!         let mut reader = it.create_reader_for_current()?;
//!         let _ts = reader.read_i64()?;
//!         if !it.move_next()? {
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, PageId, Result};

pub use index::fixed::{
    EmbeddedIterator, FixedSizeIterator, FixedSizeTree, Keys, LargeIterator, NullIterator,
    TreeHeader, TreeIterator, TreeKind, ValueReader, ValueSlice,
};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{DiskManager, FileSnapshot, MemorySnapshot, Snapshot};
