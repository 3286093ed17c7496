//! The [head (Font Header)](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use crate::{ByteSource, ReadError, TableRecord};

const CHECKSUM_ADJUSTMENT_OFFSET: u64 = 8;
const CREATED_OFFSET: u64 = 20;
const MODIFIED_OFFSET: u64 = 28;
const MIN_DATES_LEN: u32 = 36;

/// The checksum adjustment and the raw timestamps of a `head` table.
///
/// The timestamps are untrusted: many tools wrote them incorrectly. See
/// [`HeadDates::resolve`] for the repaired value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadDates {
    pub checksum_adjustment: u32,
    /// Seconds since 1904-01-01, as stored.
    pub created: i64,
    /// Seconds since 1904-01-01, as stored.
    pub modified: i64,
}

impl HeadDates {
    pub fn read<S: ByteSource>(source: &mut S, table: &TableRecord) -> Result<Self, ReadError> {
        table.check_bounds(source.len(), "head table")?;
        if table.length < MIN_DATES_LEN {
            return Err(ReadError::out_of_bounds(
                "head table dates",
                table.offset as u64,
                MIN_DATES_LEN as u64,
                table.length as u64,
            ));
        }
        let start = table.offset as u64;
        Ok(HeadDates {
            checksum_adjustment: source.read_at(start + CHECKSUM_ADJUSTMENT_OFFSET)?,
            created: source.read_at(start + CREATED_OFFSET)?,
            modified: source.read_at(start + MODIFIED_OFFSET)?,
        })
    }
}

/// Read `checkSumAdjustment`, if the table is long enough to hold it.
pub fn checksum_adjustment<S: ByteSource>(
    source: &mut S,
    table: &TableRecord,
) -> Result<Option<u32>, ReadError> {
    table.check_bounds(source.len(), "head table")?;
    if (table.length as u64) < CHECKSUM_ADJUSTMENT_OFFSET + 4 {
        return Ok(None);
    }
    source
        .read_at(table.offset as u64 + CHECKSUM_ADJUSTMENT_OFFSET)
        .map(Some)
}

#[cfg(test)]
mod tests {
    use sfnt_test_data::{head_table, FontBuilder, HEAD};
    use types::WHOLE_FILE_CHECKSUM_MAGIC;

    use super::*;
    use crate::{compute_checksum, OffsetTable, SliceSource};

    #[test]
    fn read_dates() {
        let font = FontBuilder::new()
            .table(HEAD, head_table(3_000_000_000, -1))
            .build();
        let mut source = SliceSource::new(&font);
        let directory = OffsetTable::read(&mut source, 0).unwrap();
        let head = *directory.head().unwrap();
        let dates = HeadDates::read(&mut source, &head).unwrap();
        assert_eq!(dates.created, 3_000_000_000);
        assert_eq!(dates.modified, -1);
        assert_ne!(dates.checksum_adjustment, 0);
        assert_eq!(compute_checksum(&font), WHOLE_FILE_CHECKSUM_MAGIC);
        assert_eq!(
            checksum_adjustment(&mut source, &head).unwrap(),
            Some(dates.checksum_adjustment)
        );
    }

    #[test]
    fn short_tables() {
        let font = FontBuilder::new().table(HEAD, vec![0u8; 30]).build();
        let mut source = SliceSource::new(&font);
        let head = *OffsetTable::read(&mut source, 0).unwrap().head().unwrap();
        assert!(matches!(
            HeadDates::read(&mut source, &head),
            Err(ReadError::BoundsError { length: 36, .. })
        ));
        assert!(checksum_adjustment(&mut source, &head).unwrap().is_some());

        let font = FontBuilder::new().table(HEAD, vec![0u8; 10]).build();
        let mut source = SliceSource::new(&font);
        let head = *OffsetTable::read(&mut source, 0).unwrap().head().unwrap();
        assert_eq!(checksum_adjustment(&mut source, &head).unwrap(), None);
    }
}
