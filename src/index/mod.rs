//! Index structures.
//!
//! - [`fixed`] - Fixed-size trees (embedded and paged) and their iterators

pub mod fixed;
