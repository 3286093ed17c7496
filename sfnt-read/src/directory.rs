//! The table directory of one font
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>

use types::Tag;

use crate::{container::is_sfnt_version, source::check_range, ByteSource, ReadError};

/// The largest number of tables accepted in one font.
pub const MAX_TABLES: u16 = 299;

const OFFSET_TABLE_HEADER_LEN: u64 = 12;
const TABLE_RECORD_LEN: u64 = 16;

pub const HEAD_TAG: Tag = Tag::new(b"head");
pub const NAME_TAG: Tag = Tag::new(b"name");
pub const OS2_TAG: Tag = Tag::new(b"OS/2");

/// A table record as stored in the file.
#[derive(Clone, Copy, bytemuck::AnyBitPattern)]
#[repr(C)]
struct RawTableRecord {
    tag: [u8; 4],
    checksum: [u8; 4],
    offset: [u8; 4],
    length: [u8; 4],
}

/// One entry of a table directory.
///
/// Offsets are relative to the start of the file, even inside a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl From<&RawTableRecord> for TableRecord {
    fn from(raw: &RawTableRecord) -> Self {
        TableRecord {
            tag: Tag::from_be_bytes(raw.tag),
            checksum: u32::from_be_bytes(raw.checksum),
            offset: u32::from_be_bytes(raw.offset),
            length: u32::from_be_bytes(raw.length),
        }
    }
}

impl TableRecord {
    /// One past the last byte of the table.
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.length as u64
    }

    /// `true` if the table starts on a four byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.offset % 4 == 0
    }

    /// Ensure the whole table lies within a file of `file_len` bytes.
    pub fn check_bounds(&self, file_len: u64, what: &'static str) -> Result<(), ReadError> {
        check_range(file_len, what, self.offset as u64, self.length as u64)
    }
}

/// The offset table of one font: its version and table records.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetTable {
    pub sfnt_version: u32,
    /// Where this offset table starts in the file.
    pub font_offset: u32,
    pub records: Vec<TableRecord>,
}

impl OffsetTable {
    /// Read the offset table starting at `font_offset`.
    ///
    /// Table records are parsed but the tables themselves are not checked;
    /// see [`TableRecord::check_bounds`].
    pub fn read<S: ByteSource>(source: &mut S, font_offset: u32) -> Result<Self, ReadError> {
        let file_size = source.len();
        let base = font_offset as u64;
        check_range(file_size, "offset table", base, OFFSET_TABLE_HEADER_LEN)?;
        let sfnt_version: u32 = source.read_at(base)?;
        if !is_sfnt_version(sfnt_version) {
            return Err(ReadError::NotAFont(Tag::from_u32(sfnt_version)));
        }
        let num_tables: u16 = source.read_at(base + 4)?;
        if !(1..=MAX_TABLES).contains(&num_tables) {
            return Err(ReadError::TooManyTables(num_tables));
        }
        let records_len = num_tables as u64 * TABLE_RECORD_LEN;
        let records_start = base + OFFSET_TABLE_HEADER_LEN;
        check_range(file_size, "table directory", records_start, records_len)?;
        let raw = source.read_vec(records_start, records_len as usize)?;
        let records = bytemuck::try_cast_slice::<u8, RawTableRecord>(&raw)
            .map_err(|_| {
                ReadError::out_of_bounds("table directory", records_start, records_len, file_size)
            })?
            .iter()
            .map(TableRecord::from)
            .collect::<Vec<_>>();
        log::debug!(
            "font at 0x{font_offset:X}: version 0x{sfnt_version:08X}, {num_tables} tables"
        );
        for record in &records {
            log::trace!(
                "  '{}' checksum 0x{:08X} offset 0x{:X} length {}",
                record.tag,
                record.checksum,
                record.offset,
                record.length
            );
        }
        Ok(OffsetTable {
            sfnt_version,
            font_offset,
            records,
        })
    }

    /// The size of the offset table itself, in bytes.
    pub fn byte_len(&self) -> u64 {
        OFFSET_TABLE_HEADER_LEN + self.records.len() as u64 * TABLE_RECORD_LEN
    }

    /// Look up a table by exact tag.
    ///
    /// If the directory lists a tag more than once, the last record wins.
    pub fn find(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().rev().find(|record| record.tag == tag)
    }

    /// Like [`find`](Self::find), but a missing table is an error.
    pub fn expect_table(&self, tag: Tag) -> Result<&TableRecord, ReadError> {
        self.find(tag).ok_or(ReadError::TableIsMissing(tag))
    }

    pub fn name(&self) -> Option<&TableRecord> {
        self.find(NAME_TAG)
    }

    pub fn os2(&self) -> Option<&TableRecord> {
        self.find(OS2_TAG)
    }

    pub fn head(&self) -> Option<&TableRecord> {
        self.find(HEAD_TAG)
    }
}

#[cfg(test)]
mod tests {
    use sfnt_test_data::{head_table, BeBuffer, FontBuilder};
    use types::TT_SFNT_VERSION;

    use super::*;
    use crate::SliceSource;

    fn directory(records: &[(Tag, u32, u32, u32)]) -> BeBuffer {
        let mut buf = BeBuffer::new()
            .push(TT_SFNT_VERSION)
            .push(records.len() as u16)
            .extend([0u16; 3]);
        for (tag, checksum, offset, length) in records {
            buf = buf.push(*tag).extend([*checksum, *offset, *length]);
        }
        buf
    }

    #[test]
    fn read_records() {
        let font = FontBuilder::new()
            .table(HEAD_TAG, head_table(0, 0))
            .table(NAME_TAG, vec![0u8; 10])
            .build();
        let table = OffsetTable::read(&mut SliceSource::new(&font), 0).unwrap();
        assert_eq!(table.sfnt_version, TT_SFNT_VERSION);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.byte_len(), 44);
        let head = table.head().unwrap();
        assert_eq!(head.offset, 44);
        assert_eq!(head.length, 54);
        // 54 bytes of head, padded to 56
        assert_eq!(table.name().unwrap().offset, 100);
        assert!(table.os2().is_none());
        assert!(matches!(
            table.expect_table(OS2_TAG),
            Err(ReadError::TableIsMissing(tag)) if tag == OS2_TAG
        ));
    }

    #[test]
    fn last_duplicate_wins() {
        let buf = directory(&[
            (NAME_TAG, 0, 44, 0),
            (OS2_TAG, 0, 44, 0),
            (NAME_TAG, 0, 48, 0),
        ]);
        let table = OffsetTable::read(&mut SliceSource::new(&buf), 0).unwrap();
        assert_eq!(table.name().unwrap().offset, 48);
    }

    #[test]
    fn tag_match_is_exact() {
        let buf = directory(&[(Tag::new(b"NAME"), 0, 28, 0)]);
        let table = OffsetTable::read(&mut SliceSource::new(&buf), 0).unwrap();
        assert!(table.name().is_none());
    }

    #[test]
    fn table_count_limits() {
        for count in [0u16, 300] {
            let buf = BeBuffer::new()
                .push(TT_SFNT_VERSION)
                .push(count)
                .extend([0u16; 3]);
            assert!(matches!(
                OffsetTable::read(&mut SliceSource::new(&buf), 0),
                Err(ReadError::TooManyTables(n)) if n == count
            ));
        }
    }

    #[test]
    fn truncated_directory() {
        let buf = directory(&[(NAME_TAG, 0, 0, 0), (HEAD_TAG, 0, 0, 0)]);
        let truncated = &buf[..buf.len() - 1];
        assert!(matches!(
            OffsetTable::read(&mut SliceSource::new(truncated), 0),
            Err(ReadError::BoundsError { .. })
        ));
    }

    #[test]
    fn bad_signature_at_offset() {
        let buf = BeBuffer::new().extend([0u32; 8]);
        assert!(matches!(
            OffsetTable::read(&mut SliceSource::new(&buf), 4),
            Err(ReadError::NotAFont(_))
        ));
        assert!(matches!(
            OffsetTable::read(&mut SliceSource::new(&buf), 1000),
            Err(ReadError::BoundsError { .. })
        ));
    }

    #[test]
    fn record_geometry() {
        let record = TableRecord {
            tag: NAME_TAG,
            checksum: 0,
            offset: 0xFFFF_FFFE,
            length: 0xFFFF_FFFF,
        };
        assert_eq!(record.end(), 0x1_FFFF_FFFD);
        assert!(!record.is_aligned());
        assert!(record.check_bounds(u64::MAX, "table").is_ok());
        assert!(record.check_bounds(100, "table").is_err());
    }
}
