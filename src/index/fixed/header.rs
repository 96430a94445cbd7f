//! Tree header stored at the start of a fixed-size tree's container payload.
//!
//! # Layout
//! ```text
//! Embedded (5 bytes, entry array follows)   Large (31 bytes)
//! Offset  Size  Field                       Offset  Size  Field
//! 0       1     kind = 1                    0       1     kind = 2
//! 1       2     value_size                  1       2     value_size
//! 3       2     entry_count                 3       8     entry_count
//!                                           11      8     root page
//!                                           19      4     depth
//!                                           23      8     page_count
//! ```
//! All integers are little-endian.

use crate::common::{Error, PageId, Result};

const KIND_EMBEDDED: u8 = 1;
const KIND_LARGE: u8 = 2;

/// Which physical representation a tree uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
    /// No entries (missing payload, or a zero count).
    Empty,
    /// Inline sorted array inside the container payload.
    Embedded,
    /// Multi-level paged B+tree.
    Large,
}

/// Decoded tree header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeHeader {
    Embedded {
        value_size: u16,
        entry_count: u16,
    },
    Large {
        value_size: u16,
        entry_count: u64,
        root: PageId,
        depth: u32,
        page_count: u64,
    },
}

impl TreeHeader {
    /// Size of an embedded header; the entry array starts here.
    pub const EMBEDDED_SIZE: usize = 5;

    /// Size of a large header.
    pub const LARGE_SIZE: usize = 31;

    /// Decode the header at the front of `payload`.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let kind = *payload
            .first()
            .ok_or(Error::CorruptHeader("empty tree payload"))?;

        match kind {
            KIND_EMBEDDED => {
                let bytes = payload
                    .get(..Self::EMBEDDED_SIZE)
                    .ok_or(Error::CorruptHeader("truncated embedded header"))?;
                Ok(TreeHeader::Embedded {
                    value_size: u16::from_le_bytes([bytes[1], bytes[2]]),
                    entry_count: u16::from_le_bytes([bytes[3], bytes[4]]),
                })
            }
            KIND_LARGE => {
                let bytes = payload
                    .get(..Self::LARGE_SIZE)
                    .ok_or(Error::CorruptHeader("truncated large header"))?;
                Ok(TreeHeader::Large {
                    value_size: u16::from_le_bytes([bytes[1], bytes[2]]),
                    entry_count: le_u64(&bytes[3..11]),
                    root: PageId::new(le_u64(&bytes[11..19])),
                    depth: u32::from_le_bytes([bytes[19], bytes[20], bytes[21], bytes[22]]),
                    page_count: le_u64(&bytes[23..31]),
                })
            }
            _ => Err(Error::CorruptHeader("unknown tree kind")),
        }
    }

    /// Encode this header; embedded entries are appended by the caller.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            TreeHeader::Embedded {
                value_size,
                entry_count,
            } => {
                let mut out = Vec::with_capacity(Self::EMBEDDED_SIZE);
                out.push(KIND_EMBEDDED);
                out.extend_from_slice(&value_size.to_le_bytes());
                out.extend_from_slice(&entry_count.to_le_bytes());
                out
            }
            TreeHeader::Large {
                value_size,
                entry_count,
                root,
                depth,
                page_count,
            } => {
                let mut out = Vec::with_capacity(Self::LARGE_SIZE);
                out.push(KIND_LARGE);
                out.extend_from_slice(&value_size.to_le_bytes());
                out.extend_from_slice(&entry_count.to_le_bytes());
                out.extend_from_slice(&root.to_le_bytes());
                out.extend_from_slice(&depth.to_le_bytes());
                out.extend_from_slice(&page_count.to_le_bytes());
                out
            }
        }
    }

    pub fn value_size(&self) -> usize {
        match *self {
            TreeHeader::Embedded { value_size, .. } | TreeHeader::Large { value_size, .. } => {
                value_size as usize
            }
        }
    }

    pub fn entry_count(&self) -> u64 {
        match *self {
            TreeHeader::Embedded { entry_count, .. } => entry_count as u64,
            TreeHeader::Large { entry_count, .. } => entry_count,
        }
    }

    /// Representation, with a zero count reported as [`TreeKind::Empty`].
    pub fn kind(&self) -> TreeKind {
        match self {
            _ if self.entry_count() == 0 => TreeKind::Empty,
            TreeHeader::Embedded { .. } => TreeKind::Embedded,
            TreeHeader::Large { .. } => TreeKind::Large,
        }
    }
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut out = [0u8; 8];
    out.copy_from_slice(bytes);
    u64::from_le_bytes(out)
}
