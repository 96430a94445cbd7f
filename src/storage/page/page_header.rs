//! Page header and type definitions.
//!
//! Every page starts with a [`PageHeader`] containing metadata:
//! - [`PageType`] discriminator
//! - CRC32 checksum for integrity
//! - the page's own number, to catch misdirected reads
//! - the fixed-size entry array descriptor (count, start, value width)

use crate::common::PageId;

/// Type of page stored in a snapshot.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized or corrupted page.
    #[default]
    Invalid = 0,
    /// Fixed-size tree branch page: (separator key, child page) entries.
    FixedBranch = 1,
    /// Fixed-size tree leaf page: (key, value) entries.
    FixedLeaf = 2,
    /// Page on the free list.
    Free = 3,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::FixedBranch,
            2 => PageType::FixedLeaf,
            3 => PageType::Free,
            _ => PageType::Invalid,
        }
    }

    /// Whether this is a page of a paged fixed-size tree.
    #[inline]
    pub fn is_tree_page(self) -> bool {
        matches!(self, PageType::FixedBranch | PageType::FixedLeaf)
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (19 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     page_type (PageType as u8)
/// 1       4     checksum (CRC32, little-endian)
/// 5       8     page_number (little-endian)
/// 13      2     entry_count (little-endian)
/// 15      2     start_position (little-endian)
/// 17      2     value_size (little-endian)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire page with the checksum field
/// itself set to zero. This allows verification without special handling.
///
/// # Entry array
/// `start_position` is the byte offset where the sorted entry array begins.
/// It is at least [`PageHeader::SIZE`] but may be larger: the engine can drop
/// entries off the front of a page by moving the start forward.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Type of this page.
    pub page_type: PageType,
    /// CRC32 checksum of the page contents.
    pub checksum: u32,
    /// Number this page is stored under.
    pub page_number: u64,
    /// Number of entries in the entry array.
    pub entry_count: u16,
    /// Byte offset of the entry array within the page.
    pub start_position: u16,
    /// Width of each entry's value (8 on branch pages).
    pub value_size: u16,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 19;

    /// Offset of each field within the header.
    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;
    pub const OFFSET_PAGE_NUMBER: usize = 5;
    pub const OFFSET_ENTRY_COUNT: usize = 13;
    pub const OFFSET_START_POSITION: usize = 15;
    pub const OFFSET_VALUE_SIZE: usize = 17;

    /// Create an empty header for a tree page.
    ///
    /// The entry array starts right after the header and the checksum is zero.
    pub fn new(page_type: PageType, page_id: PageId, value_size: u16) -> Self {
        Self {
            page_type,
            checksum: 0,
            page_number: page_id.0,
            entry_count: 0,
            start_position: Self::SIZE as u16,
            value_size,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        Self {
            page_type: PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]),
            checksum: read_u32(data, Self::OFFSET_CHECKSUM),
            page_number: read_u64(data, Self::OFFSET_PAGE_NUMBER),
            entry_count: read_u16(data, Self::OFFSET_ENTRY_COUNT),
            start_position: read_u16(data, Self::OFFSET_START_POSITION),
            value_size: read_u16(data, Self::OFFSET_VALUE_SIZE),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
        data[Self::OFFSET_PAGE_NUMBER..Self::OFFSET_PAGE_NUMBER + 8]
            .copy_from_slice(&self.page_number.to_le_bytes());
        data[Self::OFFSET_ENTRY_COUNT..Self::OFFSET_ENTRY_COUNT + 2]
            .copy_from_slice(&self.entry_count.to_le_bytes());
        data[Self::OFFSET_START_POSITION..Self::OFFSET_START_POSITION + 2]
            .copy_from_slice(&self.start_position.to_le_bytes());
        data[Self::OFFSET_VALUE_SIZE..Self::OFFSET_VALUE_SIZE + 2]
            .copy_from_slice(&self.value_size.to_le_bytes());
    }

    /// Whether this header describes a branch page.
    #[inline]
    pub fn is_branch(&self) -> bool {
        self.page_type == PageType::FixedBranch
    }

    /// Compute CRC32 checksum of a page.
    ///
    /// The checksum is computed with the checksum field (bytes 1-4) zeroed out,
    /// so the checksum doesn't include itself.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);
        hasher.finalize()
    }

    /// Verify that the stored checksum matches the computed checksum.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

#[inline]
fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

// ============================================================================
// TESTS
// ============================================================================
