//! Font creation and modification dates
//!
//! Two sources are supported: the binary timestamps of the `head` table,
//! which are repaired when they match a known tool bug, and the free-form
//! `%%CreationDate:` comment of PostScript fonts (see [`postscript`]).

pub mod postscript;

use chrono::NaiveDateTime;
use types::{LongDateTime, SECONDS_1904_TO_1970};

use crate::tables::head::HeadDates;

/// Values at or above this are out of range: nothing sane needs more than
/// 33 bits of seconds since 1904.
const MAX_VALID_SECONDS: i64 = 1 << 33;

/// Values in this range are seconds since 1970 (1988 through 2009) that
/// were written without converting to the 1904 epoch.
const UNIX_EPOCH_RANGE: std::ops::Range<i64> = 567_993_600..1_262_304_000;

/// Which `head` field a date was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateField {
    Modified,
    Created,
}

/// A correction applied to a damaged timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateRepair {
    /// The value was stored in the high half of the field.
    HighHalfShift,
    /// The high half held garbage; both fields share the same low half.
    VendorGarbageTruncated,
    /// The value counted seconds from 1970 rather than 1904.
    UnixEpoch,
}

/// A usable timestamp from the `head` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadDate {
    pub field: DateField,
    /// The value as stored.
    pub raw: i64,
    pub value: LongDateTime,
    pub repair: Option<DateRepair>,
}

impl HeadDate {
    /// The date and time, without a time zone.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        self.value.to_naive()
    }
}

/// The result of resolving the `head` dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateOutcome {
    Valid(HeadDate),
    /// Neither field holds a usable value; the caller decides what to do.
    Indeterminate { created: i64, modified: i64 },
}

impl DateOutcome {
    pub fn date(&self) -> Option<&HeadDate> {
        match self {
            DateOutcome::Valid(date) => Some(date),
            DateOutcome::Indeterminate { .. } => None,
        }
    }
}

fn in_range(secs: i64) -> bool {
    secs > 0 && secs < MAX_VALID_SECONDS
}

fn low_half(secs: i64) -> i64 {
    secs & 0xFFFF_FFFF
}

/// Validate one field, repairing it if it matches a known corruption.
fn repair(raw: i64, other: i64) -> Option<(i64, Option<DateRepair>)> {
    if in_range(raw) {
        if UNIX_EPOCH_RANGE.contains(&raw) {
            return Some((raw + SECONDS_1904_TO_1970, Some(DateRepair::UnixEpoch)));
        }
        return Some((raw, None));
    }
    let (value, repair) = if raw < 0 && low_half(raw) == 0 {
        ((raw as u64 >> 32) as i64, DateRepair::HighHalfShift)
    } else if low_half(raw) != 0 && low_half(raw) == low_half(other) {
        (low_half(raw), DateRepair::VendorGarbageTruncated)
    } else {
        return None;
    };
    in_range(value).then_some((value, Some(repair)))
}

impl HeadDates {
    /// Pick and repair the timestamp that best describes the font.
    ///
    /// `modified` is preferred; `created` is used only when `modified` is
    /// zero.
    pub fn resolve(&self) -> DateOutcome {
        let (field, raw, other) = if self.modified == 0 && self.created != 0 {
            (DateField::Created, self.created, self.modified)
        } else {
            (DateField::Modified, self.modified, self.created)
        };
        match repair(raw, other) {
            Some((value, repair)) => {
                if let Some(repair) = repair {
                    log::warn!("{field:?} date 0x{raw:016X} repaired ({repair:?}) to {value}");
                }
                DateOutcome::Valid(HeadDate {
                    field,
                    raw,
                    value: LongDateTime::new(value),
                    repair,
                })
            }
            None => {
                log::debug!(
                    "no usable head date (created {}, modified {})",
                    self.created,
                    self.modified
                );
                DateOutcome::Indeterminate {
                    created: self.created,
                    modified: self.modified,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn dates(created: i64, modified: i64) -> HeadDates {
        HeadDates {
            checksum_adjustment: 0,
            created,
            modified,
        }
    }

    // 2001-09-09 01:46:40 UTC, as seconds since 1904
    const SAMPLE: i64 = 1_000_000_000 + SECONDS_1904_TO_1970;

    #[test]
    fn prefers_modified() {
        let outcome = dates(SAMPLE - 100, SAMPLE).resolve();
        let date = outcome.date().unwrap();
        assert_eq!(date.field, DateField::Modified);
        assert_eq!(date.value.as_secs(), SAMPLE);
        assert_eq!(date.repair, None);
        assert_eq!(
            date.to_naive(),
            NaiveDate::from_ymd_opt(2001, 9, 9).and_then(|d| d.and_hms_opt(1, 46, 40))
        );
    }

    #[test]
    fn falls_back_to_created() {
        let date = *dates(SAMPLE, 0).resolve().date().unwrap();
        assert_eq!(date.field, DateField::Created);
        assert_eq!(date.value.as_secs(), SAMPLE);
    }

    #[test]
    fn invalid_modified_is_not_replaced() {
        assert_eq!(
            dates(SAMPLE, -5).resolve(),
            DateOutcome::Indeterminate {
                created: SAMPLE,
                modified: -5
            }
        );
        assert!(matches!(
            dates(0, 0).resolve(),
            DateOutcome::Indeterminate { .. }
        ));
    }

    #[test]
    fn high_half_shift() {
        let raw = ((SAMPLE as u64) << 32) as i64;
        assert!(raw < 0);
        let date = *dates(0, raw).resolve().date().unwrap();
        assert_eq!(date.value.as_secs(), SAMPLE);
        assert_eq!(date.repair, Some(DateRepair::HighHalfShift));
        assert_eq!(date.raw, raw);
    }

    #[test]
    fn vendor_garbage() {
        let garbage = 0x7A5B_0000_0000_0000;
        let created = garbage | SAMPLE;
        let modified = 0x1234_0000_0000_0000 | SAMPLE;
        let date = *dates(created, modified).resolve().date().unwrap();
        assert_eq!(date.value.as_secs(), SAMPLE);
        assert_eq!(date.repair, Some(DateRepair::VendorGarbageTruncated));

        // low halves differ
        let outcome = dates(garbage | 5, modified).resolve();
        assert!(outcome.date().is_none());
    }

    #[test]
    fn unix_epoch() {
        let date = *dates(0, 1_000_000_000).resolve().date().unwrap();
        assert_eq!(date.value.as_secs(), SAMPLE);
        assert_eq!(date.repair, Some(DateRepair::UnixEpoch));
        // just outside the legacy range is taken as is
        let date = *dates(0, 1_262_304_000).resolve().date().unwrap();
        assert_eq!(date.repair, None);
    }

    #[test]
    fn range_limits() {
        assert!(in_range(1));
        assert!(in_range(MAX_VALID_SECONDS - 1));
        assert!(!in_range(MAX_VALID_SECONDS));
        assert!(!in_range(0));
        assert!(!in_range(-1));
    }
}
