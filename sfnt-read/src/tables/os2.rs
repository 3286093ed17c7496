//! The [OS/2](https://docs.microsoft.com/en-us/typography/opentype/spec/os2) table

use types::Tag;

use crate::{
    encoding::{decode_ascii_z, hex_dump, NameText},
    ByteSource, ReadError, TableRecord,
};

const VENDOR_ID_OFFSET: u64 = 58;
const MIN_VENDOR_LEN: u32 = 62;

/// The version and vendor ID of an `OS/2` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Os2VendorInfo {
    pub version: u16,
    /// `achVendID`, as stored.
    pub vendor_id: Tag,
}

impl Os2VendorInfo {
    pub fn read<S: ByteSource>(source: &mut S, table: &TableRecord) -> Result<Self, ReadError> {
        table.check_bounds(source.len(), "OS/2 table")?;
        if table.length < MIN_VENDOR_LEN {
            return Err(ReadError::out_of_bounds(
                "OS/2 vendor ID",
                table.offset as u64,
                MIN_VENDOR_LEN as u64,
                table.length as u64,
            ));
        }
        let start = table.offset as u64;
        Ok(Os2VendorInfo {
            version: source.read_at(start)?,
            vendor_id: source.read_at(start + VENDOR_ID_OFFSET)?,
        })
    }

    /// The vendor ID as display text.
    ///
    /// Null bytes read as spaces and trailing spaces are dropped. IDs with
    /// other non-printable bytes are shown as hex.
    pub fn vendor_text(&self) -> NameText {
        let raw = self.vendor_id.to_be_bytes();
        match decode_ascii_z(&raw) {
            Ok(text) => NameText::Text(text.trim_end_matches(' ').to_owned()),
            Err(reason) => NameText::Hex {
                hex: hex_dump(&raw),
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use sfnt_test_data::{os2_table, FontBuilder, OS2};

    use super::*;
    use crate::{OffsetTable, SliceSource};

    fn vendor(raw: &[u8; 4]) -> NameText {
        Os2VendorInfo {
            version: 4,
            vendor_id: Tag::new(raw),
        }
        .vendor_text()
    }

    #[test]
    fn read_vendor() {
        let font = FontBuilder::new().table(OS2, os2_table(3, *b"GOOG")).build();
        let mut source = SliceSource::new(&font);
        let table = *OffsetTable::read(&mut source, 0).unwrap().os2().unwrap();
        let info = Os2VendorInfo::read(&mut source, &table).unwrap();
        assert_eq!(info.version, 3);
        assert_eq!(info.vendor_id, Tag::new(b"GOOG"));
        assert_eq!(info.vendor_text().as_text(), Some("GOOG"));
    }

    #[test]
    fn vendor_text_forms() {
        assert_eq!(vendor(b"B&H ").as_text(), Some("B&H"));
        assert_eq!(vendor(b"MS\0\0").as_text(), Some("MS"));
        assert_eq!(vendor(b"\0\0\0\0").as_text(), Some(""));
        assert_eq!(vendor(&[0x41, 0xA9, 0x00, 0x20]).to_string(), "<41 A9 00 20>");
    }

    #[test]
    fn short_table_has_no_vendor() {
        let font = FontBuilder::new().table(OS2, vec![0u8; 60]).build();
        let mut source = SliceSource::new(&font);
        let table = *OffsetTable::read(&mut source, 0).unwrap().os2().unwrap();
        assert!(matches!(
            Os2VendorInfo::read(&mut source, &table),
            Err(ReadError::BoundsError { length: 62, .. })
        ));
    }
}
