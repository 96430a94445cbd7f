//! Configuration constants for fixed-size trees.

/// Size of a page in bytes (4KB).
///
/// # Memory Layout
/// With 4KB pages and 64-bit page numbers a paged tree is bounded by its
/// depth long before it is bounded by addressable pages.
///
/// # Alignment
/// Pages are aligned to 4096 bytes for efficient Direct I/O (O_DIRECT).
pub const PAGE_SIZE: usize = 4096;

/// Width of an entry key (signed 64-bit, little-endian).
pub const KEY_SIZE: usize = 8;

/// Width of a child page number stored in a branch entry.
pub const PAGE_NUMBER_SIZE: usize = 8;

/// Stride of a branch entry: separator key followed by a child page number.
///
/// Branch pages use this stride regardless of the tree's value size.
pub const BRANCH_ENTRY_SIZE: usize = KEY_SIZE + PAGE_NUMBER_SIZE;

/// Deepest paged tree a traversal will descend into.
///
/// A descent that goes past this is treated as a cycle in corrupt page data.
pub const MAX_TREE_DEPTH: usize = 32;

/// Inline budget of an embedded tree's entry array.
///
/// The engine promotes an embedded tree to a paged one once its entries
/// would exceed this many bytes. Iterators never act on it; it is reported
/// by [`FixedSizeTree::max_embedded_entries`](crate::index::fixed::FixedSizeTree::max_embedded_entries).
pub const EMBEDDED_THRESHOLD_BYTES: usize = 512;

/// Largest value width a tree may declare.
///
/// A leaf must hold at least one entry after the page header.
pub const MAX_VALUE_SIZE: usize = PAGE_SIZE - 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        assert!(PAGE_SIZE.is_power_of_two());
        assert_eq!(PAGE_SIZE, 4096);
    }

    #[test]
    fn test_branch_stride() {
        assert_eq!(BRANCH_ENTRY_SIZE, 16);
        // A 4KB branch page holds a couple hundred children.
        assert!((PAGE_SIZE - 64) / BRANCH_ENTRY_SIZE > 250);
    }
}
