//! The [name (Naming)](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table

use types::NameId;

use crate::{
    encoding::{decode_or_hex, NameText, Validation},
    source::check_range,
    ByteSource, CancelToken, ReadError, TableRecord,
};

/// The smallest `name` table accepted.
pub const MIN_NAME_TABLE_LEN: u32 = 16;
/// The largest record count accepted.
pub const MAX_NAME_RECORDS: u16 = 9999;

const HEADER_LEN: u64 = 6;
const NAME_RECORD_LEN: u64 = 12;

#[derive(Clone, Copy, bytemuck::AnyBitPattern)]
#[repr(C)]
struct RawNameRecord {
    platform_id: [u8; 2],
    encoding_id: [u8; 2],
    language_id: [u8; 2],
    name_id: [u8; 2],
    length: [u8; 2],
    string_offset: [u8; 2],
}

/// Part of [Name]: one string's identifiers and location.
///
/// A record owns no string data; its bytes are read on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
    /// String length, in bytes.
    pub length: u16,
    /// String offset from the start of string storage.
    pub offset: u16,
}

impl From<&RawNameRecord> for NameRecord {
    fn from(raw: &RawNameRecord) -> Self {
        NameRecord {
            platform_id: u16::from_be_bytes(raw.platform_id),
            encoding_id: u16::from_be_bytes(raw.encoding_id),
            language_id: u16::from_be_bytes(raw.language_id),
            name_id: NameId::new(u16::from_be_bytes(raw.name_id)),
            length: u16::from_be_bytes(raw.length),
            offset: u16::from_be_bytes(raw.string_offset),
        }
    }
}

impl NameRecord {
    /// Return `true` if the string is stored in a Unicode encoding.
    pub fn is_unicode(&self) -> bool {
        self.platform_id == 0 || (self.platform_id == 3 && matches!(self.encoding_id, 0 | 1 | 10))
    }
}

/// A decoded name record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameEntry {
    pub record: NameRecord,
    pub text: NameText,
}

/// The decoded records of a `name` table, in table order.
///
/// Decoding stops at the first record that cannot be read. The entries
/// decoded before it are kept, and `error` holds the reason.
#[derive(Debug, Default)]
pub struct NameEntries {
    pub entries: Vec<NameEntry>,
    pub error: Option<ReadError>,
}

impl NameEntries {
    /// Returns `true` if every record was decoded.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The preferred entry for `name_id`; see [`best_name`].
    pub fn best(&self, name_id: NameId) -> Option<&NameEntry> {
        best_name(&self.entries, name_id)
    }
}

/// The header and records of a `name` table.
///
/// [Naming Table](https://docs.microsoft.com/en-us/typography/opentype/spec/name)
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name {
    pub format: u16,
    pub count: u16,
    /// Absolute file offset of string storage.
    pub string_area_offset: u64,
    /// The directory record this table was read from.
    pub table: TableRecord,
    pub records: Vec<NameRecord>,
}

impl Name {
    /// Read and check the table header and every record.
    ///
    /// String bytes are not read; see [`Name::entries`].
    pub fn read<S: ByteSource>(
        source: &mut S,
        table: &TableRecord,
        cancel: &CancelToken,
    ) -> Result<Self, ReadError> {
        let file_size = source.len();
        table.check_bounds(file_size, "name table")?;
        if table.length < MIN_NAME_TABLE_LEN {
            return Err(ReadError::out_of_bounds(
                "name table header",
                table.offset as u64,
                MIN_NAME_TABLE_LEN as u64,
                table.length as u64,
            ));
        }
        let start = table.offset as u64;
        let format: u16 = source.read_at(start)?;
        let count: u16 = source.read_at(start + 2)?;
        let string_offset: u16 = source.read_at(start + 4)?;
        if !(1..=MAX_NAME_RECORDS).contains(&count) {
            return Err(ReadError::InvalidNameCount(count));
        }
        if string_offset as u32 > table.length {
            return Err(ReadError::BadStringOffset {
                offset: string_offset as u64,
            });
        }

        let records_len = count as u64 * NAME_RECORD_LEN;
        check_range(
            table.length as u64,
            "name records",
            HEADER_LEN,
            records_len,
        )?;
        let raw = source.read_vec(start + HEADER_LEN, records_len as usize)?;
        let raw_records = bytemuck::try_cast_slice::<u8, RawNameRecord>(&raw).map_err(|_| {
            ReadError::out_of_bounds("name records", start + HEADER_LEN, records_len, file_size)
        })?;
        let mut records = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            cancel.check()?;
            records.push(NameRecord::from(raw));
        }
        log::debug!("name table format {format}, {count} records");
        Ok(Name {
            format,
            count,
            string_area_offset: start + string_offset as u64,
            table: *table,
            records,
        })
    }

    /// Read the raw bytes of one record's string.
    ///
    /// The string must lie entirely within the table's declared length.
    pub fn string_bytes<S: ByteSource>(
        &self,
        source: &mut S,
        record: &NameRecord,
    ) -> Result<Vec<u8>, ReadError> {
        let relative = self.string_area_offset - self.table.offset as u64 + record.offset as u64;
        check_range(
            self.table.length as u64,
            "name record",
            relative,
            record.length as u64,
        )?;
        source.read_vec(self.table.offset as u64 + relative, record.length as usize)
    }

    /// Decode every record, in table order.
    ///
    /// Informational strings (copyright, trademark, description, license)
    /// are always checked with [`Validation::Relaxed`]. The first record that
    /// overruns the table ends decoding; it and the records after it are
    /// left out of the result. Only cancellation is returned as an `Err`.
    pub fn entries<S: ByteSource>(
        &self,
        source: &mut S,
        validation: Validation,
        cancel: &CancelToken,
    ) -> Result<NameEntries, ReadError> {
        let mut entries = Vec::with_capacity(self.records.len());
        for record in &self.records {
            cancel.check()?;
            let bytes = match self.string_bytes(source, record) {
                Ok(bytes) => bytes,
                Err(ReadError::Cancelled) => return Err(ReadError::Cancelled),
                Err(e) => {
                    log::warn!(
                        "name record {} abandoned after {} decoded: {e}",
                        record.name_id,
                        entries.len()
                    );
                    return Ok(NameEntries {
                        entries,
                        error: Some(e),
                    });
                }
            };
            let validation = if record.name_id.is_informational() {
                Validation::Relaxed
            } else {
                validation
            };
            let text = decode_or_hex(
                record.platform_id,
                record.encoding_id,
                record.language_id,
                &bytes,
                validation,
            );
            log::trace!(
                "name {} ({}, {}, 0x{:04X}): {text}",
                record.name_id,
                record.platform_id,
                record.encoding_id,
                record.language_id
            );
            entries.push(NameEntry {
                record: *record,
                text,
            });
        }
        Ok(NameEntries {
            entries,
            error: None,
        })
    }
}

/// How well a decoded record matches the usual display preference.
fn preference(record: &NameRecord) -> u8 {
    match (record.platform_id, record.encoding_id, record.language_id) {
        (3, 1, 0x409) => 0,
        (3, 0 | 1 | 10, _) => 1,
        (0, _, _) => 2,
        (1, 0, 0) => 3,
        _ => 4,
    }
}

/// Pick the entry to display for `name_id`.
///
/// Prefers Windows US English, then any Windows Unicode record, then the
/// Unicode platform, then Macintosh Roman English, then anything else.
/// Only entries that decoded to text are considered.
pub fn best_name(entries: &[NameEntry], name_id: NameId) -> Option<&NameEntry> {
    entries
        .iter()
        .filter(|entry| entry.record.name_id == name_id && entry.text.is_text())
        .min_by_key(|entry| preference(&entry.record))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sfnt_test_data::{name_table, utf16_be, BeBuffer, FontBuilder, NAME};

    use super::*;
    use crate::{OffsetTable, SliceSource};

    fn read_name(font: &[u8]) -> Result<Name, ReadError> {
        let mut source = SliceSource::new(font);
        let directory = OffsetTable::read(&mut source, 0)?;
        let record = *directory.expect_table(NAME)?;
        Name::read(&mut source, &record, &CancelToken::new())
    }

    fn font_with_name(name: Vec<u8>) -> Vec<u8> {
        FontBuilder::new().table(NAME, name).build()
    }

    #[test]
    fn read_and_decode() {
        let family = utf16_be("Sample Sans");
        let font = font_with_name(name_table(&[
            (1, 0, 0, 1, b"Mac Family"),
            (3, 1, 0x409, 1, &family),
            (3, 1, 0x409, 2, &utf16_be("Bold")),
        ]));
        let name = read_name(&font).unwrap();
        assert_eq!(name.format, 0);
        assert_eq!(name.count, 3);
        assert_eq!(name.records[0].name_id, NameId::FAMILY_NAME);
        assert!(!name.records[0].is_unicode());
        assert!(name.records[1].is_unicode());

        let mut source = SliceSource::new(&font);
        let entries = name
            .entries(&mut source, Validation::Strict, &CancelToken::new())
            .unwrap()
            .entries;
        let texts: Vec<_> = entries.iter().map(|e| e.text.to_string()).collect();
        assert_eq!(texts, ["Mac Family", "Sample Sans", "Bold"]);

        let best = best_name(&entries, NameId::FAMILY_NAME).unwrap();
        assert_eq!(best.text.as_text(), Some("Sample Sans"));
        assert!(best_name(&entries, NameId::DESIGNER).is_none());
    }

    #[test]
    fn best_name_fallbacks() {
        let font = font_with_name(name_table(&[
            (3, 1, 0x407, 4, &utf16_be("Deutsch")),
            (1, 0, 0, 4, b"Mac"),
            (0, 3, 0, 6, &utf16_be("Unicode")),
            (1, 0, 0, 6, b"MacPS"),
            (3, 1, 0x409, 7, &[0xD8, 0x00]),
            (1, 0, 0, 7, b"Mark"),
        ]));
        let mut source = SliceSource::new(&font);
        let name = read_name(&font).unwrap();
        let entries = name
            .entries(&mut source, Validation::Strict, &CancelToken::new())
            .unwrap()
            .entries;
        let best = |id| best_name(&entries, id).and_then(|e| e.text.as_text());
        assert_eq!(best(NameId::FULL_NAME), Some("Deutsch"));
        assert_eq!(best(NameId::POSTSCRIPT_NAME), Some("Unicode"));
        // the preferred record is undecodable
        assert_eq!(best(NameId::TRADEMARK), Some("Mark"));
    }

    #[test]
    fn informational_names_are_relaxed() {
        let font = font_with_name(name_table(&[
            (1, 0, 0, 0, b"Line 1\r\nLine 2"),
            (1, 0, 0, 1, b"Line 1\r\nLine 2"),
        ]));
        let mut source = SliceSource::new(&font);
        let name = read_name(&font).unwrap();
        let entries = name
            .entries(&mut source, Validation::Strict, &CancelToken::new())
            .unwrap()
            .entries;
        assert!(entries[0].text.is_text());
        assert!(!entries[1].text.is_text());
    }

    #[test]
    fn table_too_short() {
        let name = BeBuffer::new().extend([0u16, 1, 6]).extend([0u16; 4]);
        assert!(matches!(
            read_name(&font_with_name(name.into_vec())),
            Err(ReadError::BoundsError { length: 16, .. })
        ));
    }

    #[test]
    fn record_count() {
        for count in [0u16, 10_000] {
            let name = BeBuffer::new().extend([0u16, count, 18]).extend([0u16; 6]);
            assert!(matches!(
                read_name(&font_with_name(name.into_vec())),
                Err(ReadError::InvalidNameCount(n)) if n == count
            ));
        }
    }

    #[test]
    fn string_offset_outside_table() {
        let name = BeBuffer::new()
            .extend([0u16, 1, 0x200])
            .extend([3u16, 1, 0x409, 1, 0, 0]);
        assert!(matches!(
            read_name(&font_with_name(name.into_vec())),
            Err(ReadError::BadStringOffset { offset: 0x200 })
        ));
    }

    #[test]
    fn too_many_records_for_table() {
        let name = BeBuffer::new()
            .extend([0u16, 3, 18])
            .extend([3u16, 1, 0x409, 1, 0, 0]);
        assert!(matches!(
            read_name(&font_with_name(name.into_vec())),
            Err(ReadError::BoundsError {
                what: "name records",
                ..
            })
        ));
    }

    #[test]
    fn record_overrunning_table() {
        let name = BeBuffer::new()
            .extend([0u16, 2, 30])
            .extend([1u16, 0, 0, 1, 2, 0])
            .extend([1u16, 0, 0, 2, 40, 0])
            .bytes(b"OK");
        // trailing bytes in the file past the table must not be read
        let font = FontBuilder::new()
            .table(NAME, name.into_vec())
            .table(types::Tag::new(b"zzzz"), vec![0x41; 64])
            .build();
        let name = read_name(&font).unwrap();
        let mut source = SliceSource::new(&font);
        let decoded = name
            .entries(&mut source, Validation::Strict, &CancelToken::new())
            .unwrap();
        assert!(!decoded.is_complete());
        assert!(matches!(
            decoded.error,
            Some(ReadError::BoundsError {
                what: "name record",
                offset: 30,
                length: 40,
                available: 32,
            })
        ));
        // the record before the bad one survives
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(
            decoded.best(NameId::FAMILY_NAME).and_then(|e| e.text.as_text()),
            Some("OK")
        );
        assert!(decoded.best(NameId::SUBFAMILY_NAME).is_none());
    }

    #[test]
    fn cancelled_while_decoding() {
        let font = font_with_name(name_table(&[(1, 0, 0, 1, b"A")]));
        let name = read_name(&font).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let mut source = SliceSource::new(&font);
        assert!(matches!(
            name.entries(&mut source, Validation::Strict, &token),
            Err(ReadError::Cancelled)
        ));
    }

    #[test]
    fn cancelled_between_records() {
        let font = font_with_name(name_table(&[(1, 0, 0, 1, b"A"), (1, 0, 0, 2, b"B")]));
        let token = CancelToken::new();
        token.cancel();
        let mut source = SliceSource::new(&font);
        let directory = OffsetTable::read(&mut source, 0).unwrap();
        let record = *directory.name().unwrap();
        assert!(matches!(
            Name::read(&mut source, &record, &token),
            Err(ReadError::Cancelled)
        ));
    }
}
