//! a datetime type

use chrono::{DateTime, NaiveDateTime};

/// Seconds between the sfnt epoch (1904-01-01) and the unix epoch (1970-01-01).
pub const SECONDS_1904_TO_1970: i64 = 2_082_844_800;

/// A simple datetime type.
///
/// This represented as a number of seconds since 12:00 midnight, January 1, 1904.
/// Values stored in fonts carry no time zone; neither does this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongDateTime(i64);

impl LongDateTime {
    /// Create with a number of seconds relative to 1904-01-01 00:00.
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// The number of seconds since 00:00 1904-01-01.
    ///
    /// This can be a negative number, which presumably represents a date prior
    /// to the reference date.
    pub const fn as_secs(&self) -> i64 {
        self.0
    }

    /// Create from a number of seconds since the unix epoch.
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs.saturating_add(SECONDS_1904_TO_1970))
    }

    /// Create from a calendar date and time.
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self::from_unix_secs(datetime.and_utc().timestamp())
    }

    /// Convert to a calendar date and time, if representable.
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        let unix = self.0.checked_sub(SECONDS_1904_TO_1970)?;
        DateTime::from_timestamp(unix, 0).map(|dt| dt.naive_utc())
    }
}

impl crate::raw::Scalar for LongDateTime {
    type Raw = [u8; 8];

    fn to_raw(self) -> Self::Raw {
        self.0.to_be_bytes()
    }

    fn from_raw(raw: Self::Raw) -> Self {
        Self(i64::from_be_bytes(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};

    #[test]
    fn epoch() {
        let epoch = LongDateTime::new(0).to_naive().unwrap();
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (1904, 1, 1));
        let unix = LongDateTime::new(SECONDS_1904_TO_1970).to_naive().unwrap();
        assert_eq!(unix.year(), 1970);
    }

    #[test]
    fn naive_round_trip() {
        let when = NaiveDate::from_ymd_opt(1997, 3, 28)
            .unwrap()
            .and_hms_opt(22, 3, 48)
            .unwrap();
        let date = LongDateTime::from_naive(when);
        let back = date.to_naive().unwrap();
        assert_eq!(back, when);
        assert_eq!(back.hour(), 22);
    }

    #[test]
    fn out_of_range_is_none() {
        assert!(LongDateTime::new(i64::MIN).to_naive().is_none());
        assert!(LongDateTime::new(i64::MAX).to_naive().is_none());
    }
}
