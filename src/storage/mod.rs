//! Storage layer - pages, page files and read snapshots.
//!
//! This module handles the data iterators read from:
//! - [`page`] - Page types and layouts
//! - [`DiskManager`] - Low-level file I/O
//! - [`Snapshot`] - The page/payload source a traversal runs against, with
//!   an in-memory ([`MemorySnapshot`]) and a file-backed ([`FileSnapshot`])
//!   implementation

mod disk_manager;
mod file_snapshot;
pub mod page;
mod snapshot;

pub use disk_manager::DiskManager;
pub use file_snapshot::FileSnapshot;
pub use snapshot::{MemorySnapshot, Snapshot};
