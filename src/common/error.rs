//! Error types for fixed-size tree traversal.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised while reading a fixed-size tree.
///
/// Two families live here:
/// - caller contract violations ([`Error::InvalidState`]), which are bugs in
///   the calling code and never a sign of bad data;
/// - page resolution and validation failures, which are propagated to the
///   caller unchanged. Nothing in this crate retries.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist in the snapshot.
    #[error("Page {0} not found")]
    PageNotFound(u64),

    /// The page on disk does not match its stored checksum.
    #[error("Page {page_id} failed checksum verification")]
    ChecksumMismatch { page_id: u64 },

    /// A page was admitted that violates the fixed-size page layout.
    #[error("Page {page_id} is corrupt: {reason}")]
    CorruptPage { page_id: u64, reason: &'static str },

    /// A tree header or embedded payload could not be decoded.
    #[error("Tree header is corrupt: {0}")]
    CorruptHeader(&'static str),

    /// The tree was opened with a value size its data does not use.
    #[error("The expected value len {expected} does not match actual value len {actual}")]
    ValueSizeMismatch { expected: usize, actual: usize },

    /// The caller asked for a value width no tree page can hold.
    #[error("Value size {requested} exceeds the maximum of {max}")]
    ValueSizeTooLarge { requested: usize, max: usize },

    /// An iterator was used while it had no current entry.
    ///
    /// Never sought, sought past the last key, or already past the end.
    #[error("Invalid iterator state: {0}")]
    InvalidState(&'static str),

    /// A value reader was asked for more bytes than remain.
    #[error("Cannot read {requested} bytes, only {remaining} remain")]
    ReadPastEnd { requested: usize, remaining: usize },
}

impl Error {
    /// Whether this error came from resolving or validating stored data,
    /// as opposed to misuse of an iterator.
    pub fn is_storage_failure(&self) -> bool {
        !matches!(
            self,
            Error::InvalidState(_) | Error::ReadPastEnd { .. } | Error::ValueSizeTooLarge { .. }
        )
    }
}
