//! Errors that end the inspection of a file, a font, or a table.

use thiserror::Error;
use types::Tag;

/// An error that aborts the smallest enclosing unit of work.
///
/// Depending on where it is returned this is the whole file (for instance
/// [`ReadError::NotAFont`]), one font of a collection (for instance
/// [`ReadError::TooManyTables`]) or a single table (for instance a broken
/// `name` table). Recoverable problems such as checksum mismatches are not
/// errors; see [`Finding`](crate::Finding).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    #[error("file is too small to be a font ({0} bytes)")]
    TooSmall(u64),
    #[error("not a font file (signature {0})")]
    NotAFont(Tag),
    #[error("collection declares {0} fonts, at most 29 are supported")]
    CollectionTooLarge(u32),
    #[error("font declares {0} tables, expected 1 to 299")]
    TooManyTables(u16),
    #[error("name table declares {0} records, expected 1 to 9999")]
    InvalidNameCount(u16),
    #[error("name table string storage at 0x{offset:X} is outside the table")]
    BadStringOffset { offset: u64 },
    #[error("{what} at 0x{offset:X} ({length} bytes) exceeds the {available} bytes available")]
    BoundsError {
        what: &'static str,
        offset: u64,
        length: u64,
        available: u64,
    },
    #[error("the '{0}' table is missing")]
    TableIsMissing(Tag),
    #[error("operation cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Returns `true` if this error only records that work was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ReadError::Cancelled)
    }

    pub(crate) fn out_of_bounds(
        what: &'static str,
        offset: u64,
        length: u64,
        available: u64,
    ) -> Self {
        ReadError::BoundsError {
            what,
            offset,
            length,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_causes() {
        let err = ReadError::NotAFont(Tag::new(b"%!PS"));
        assert_eq!(err.to_string(), "not a font file (signature %!PS)");
        let err = ReadError::out_of_bounds("name table", 0x100, 64, 32);
        assert_eq!(
            err.to_string(),
            "name table at 0x100 (64 bytes) exceeds the 32 bytes available"
        );
        assert!(!err.to_string().contains('\n'));
        assert!(ReadError::Cancelled.is_cancelled());
    }
}
