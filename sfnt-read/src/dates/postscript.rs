//! Creation dates from PostScript font headers
//!
//! Type 1 fonts carry a DSC comment such as
//! `%%CreationDate: Fri Mar 28 22:03:48 1997`. The text was typed by hand or
//! produced by whatever tool built the font, so two grammars are accepted:
//!
//! 1. `[Weekday] Month Day [H:M[:S]] [zone] Year`, with a named month (the
//!    time may also follow the year);
//! 2. three numbers separated by `/`, `-` or `.`, optionally followed by
//!    `H:M[:S]` and `AM` or `PM`.
//!
//! Dates without a time are taken to be at noon. When a numeric date can be
//! read in more than one field order (or a two-digit year in more than one
//! century) every reading is returned and the caller decides. A two-digit
//! year after a named month is never ambiguous: 69 to 99 are in the 1900s,
//! anything lower in the 2000s.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::{ByteSource, ReadError};

const MARKER: &[u8] = b"%%CreationDate:";

/// The default number of leading bytes searched for the marker.
pub const DEFAULT_HEADER_LIMIT: usize = 64 * 1024;

/// The order of the fields in a numeric date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldOrder {
    YearMonthDay,
    MonthDayYear,
    DayMonthYear,
}

/// One possible reading of an ambiguous date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateCandidate {
    pub order: FieldOrder,
    pub datetime: NaiveDateTime,
}

/// A date that could not be read unambiguously.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousDate {
    /// The captured date text.
    pub text: String,
    /// Every distinct reading, in the order they were tried.
    pub candidates: Vec<DateCandidate>,
}

/// A parsed creation date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreationDate {
    Parsed(NaiveDateTime),
    Ambiguous(AmbiguousDate),
}

#[derive(Debug, Error)]
pub enum DateParseError {
    #[error("no %%CreationDate: comment found")]
    MissingMarker,
    #[error("unrecognized date '{0}'")]
    Unrecognized(String),
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Find the `%%CreationDate:` comment and return the text that follows it.
///
/// Spaces and tabs between the characters of the marker are ignored. The
/// text runs to the next control character and is trimmed.
pub fn find_creation_date(bytes: &[u8]) -> Option<String> {
    (0..bytes.len())
        .filter(|&i| bytes[i] == MARKER[0])
        .find_map(|i| match_marker(&bytes[i..]))
        .map(|rest| {
            let start = rest
                .iter()
                .position(|b| !matches!(b, b' ' | b'\t'))
                .unwrap_or(rest.len());
            let rest = &rest[start..];
            let end = rest
                .iter()
                .position(|b| *b < 0x20 || *b == 0x7F)
                .unwrap_or(rest.len());
            // header text is Latin-1
            let text: String = rest[..end].iter().map(|b| *b as char).collect();
            text.trim().to_owned()
        })
}

/// If `bytes` starts with the marker, return what follows it.
fn match_marker(bytes: &[u8]) -> Option<&[u8]> {
    let mut pos = 0;
    for (i, expected) in MARKER.iter().enumerate() {
        if i > 0 {
            while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
                pos += 1;
            }
        }
        if bytes.get(pos) != Some(expected) {
            return None;
        }
        pos += 1;
    }
    Some(&bytes[pos..])
}

/// Search the first `limit` bytes of a source for a creation date.
pub fn creation_date_from_source<S: ByteSource>(
    source: &mut S,
    limit: usize,
) -> Result<CreationDate, DateParseError> {
    let len = (source.len().min(limit as u64)) as usize;
    let header = source.read_vec(0, len)?;
    let text = find_creation_date(&header).ok_or(DateParseError::MissingMarker)?;
    parse_creation_date(&text)
}

/// Parse the text of a `%%CreationDate:` comment.
pub fn parse_creation_date(text: &str) -> Result<CreationDate, DateParseError> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('(').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(')').unwrap_or(trimmed).trim();
    let tokens: Vec<&str> = trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    let candidates = parse_named_month(&tokens)
        .or_else(|| parse_numeric(&tokens))
        .unwrap_or_default();

    let mut distinct: Vec<DateCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !distinct.iter().any(|c| c.datetime == candidate.datetime) {
            distinct.push(candidate);
        }
    }
    match distinct.as_slice() {
        [] => Err(DateParseError::Unrecognized(trimmed.to_owned())),
        [only] => Ok(CreationDate::Parsed(only.datetime)),
        _ => {
            log::debug!("ambiguous creation date '{trimmed}'");
            Ok(CreationDate::Ambiguous(AmbiguousDate {
                text: trimmed.to_owned(),
                candidates: distinct,
            }))
        }
    }
}

static MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
static WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Match a name by (at least) its first three letters.
fn name_index(token: &str, names: &[&str]) -> Option<usize> {
    let lower = token.trim_end_matches('.').to_ascii_lowercase();
    if lower.len() < 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    names.iter().position(|name| lower.starts_with(name))
}

fn all_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Candidate years for a year field: a two-digit year could be in either
/// of two centuries.
fn years(field: &str) -> Vec<i32> {
    let Ok(value) = field.parse::<i32>() else {
        return Vec::new();
    };
    match field.len() {
        1 | 2 => vec![1900 + value, 2000 + value],
        4 => vec![value],
        _ => Vec::new(),
    }
}

/// The single year for a year field of the named-month grammar.
fn pivot_year(field: &str) -> Option<i32> {
    let value = field.parse::<i32>().ok()?;
    match field.len() {
        1 | 2 if value >= 69 => Some(1900 + value),
        1 | 2 => Some(2000 + value),
        4 => Some(value),
        _ => None,
    }
}

/// `H:M[:S]`, with an optional `AM`/`PM` suffix or following token.
fn parse_time(token: &str, meridiem: Option<&str>) -> Option<NaiveTime> {
    let upper = token.to_ascii_uppercase();
    let (clock, suffix) = match upper.strip_suffix("AM").or_else(|| upper.strip_suffix("PM")) {
        Some(clock) => (clock.to_owned(), Some(upper[clock.len()..].to_owned())),
        None => (upper.clone(), meridiem.map(|m| m.to_ascii_uppercase())),
    };
    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let second: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    let hour = match suffix.as_deref() {
        None => hour,
        Some("AM") if (1..=12).contains(&hour) => hour % 12,
        Some("PM") if (1..=12).contains(&hour) => hour % 12 + 12,
        Some(_) => return None,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn is_meridiem(token: &str) -> bool {
    token.eq_ignore_ascii_case("am") || token.eq_ignore_ascii_case("pm")
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// `[Weekday] Month Day [H:M[:S]] [zone...] Year [H:M[:S]]`
fn parse_named_month(tokens: &[&str]) -> Option<Vec<DateCandidate>> {
    let mut tokens = tokens.iter().copied().peekable();
    if tokens
        .peek()
        .is_some_and(|t| name_index(t, &WEEKDAYS).is_some())
    {
        tokens.next();
    }
    let month = name_index(tokens.next()?, &MONTHS)? as u32 + 1;
    let day_token = tokens.next()?;
    if !all_digits(day_token) || day_token.len() > 2 {
        return None;
    }
    let day: u32 = day_token.parse().ok()?;

    let mut time = None;
    if tokens.peek().is_some_and(|t| t.contains(':')) {
        let clock = tokens.next()?;
        let meridiem = tokens.next_if(|t| is_meridiem(t));
        time = Some(parse_time(clock, meridiem)?);
    }
    // time zone names and offsets sit between the time and the year
    let year_token = tokens.find(|t| all_digits(t))?;
    if time.is_none() && tokens.peek().is_some_and(|t| t.contains(':')) {
        let clock = tokens.next()?;
        let meridiem = tokens.next_if(|t| is_meridiem(t));
        time = Some(parse_time(clock, meridiem)?);
    }
    let time = time.unwrap_or_else(noon);
    let date = NaiveDate::from_ymd_opt(pivot_year(year_token)?, month, day)?;
    Some(vec![DateCandidate {
        order: FieldOrder::MonthDayYear,
        datetime: date.and_time(time),
    }])
}

/// `N sep N sep N [H:M[:S]] [AM|PM]`
fn parse_numeric(tokens: &[&str]) -> Option<Vec<DateCandidate>> {
    let (date_token, rest) = tokens.split_first()?;
    let fields: Vec<&str> = date_token.split(['/', '-', '.']).collect();
    let [a, b, c] = fields.as_slice() else {
        return None;
    };
    if ![a, b, c].iter().all(|f| all_digits(f)) {
        return None;
    }
    let time = match rest {
        [] => noon(),
        [clock] => parse_time(clock, None)?,
        [clock, meridiem] if is_meridiem(meridiem) => parse_time(clock, Some(*meridiem))?,
        _ => return None,
    };

    let orders = [
        (FieldOrder::YearMonthDay, *a, *b, *c),
        (FieldOrder::MonthDayYear, *c, *a, *b),
        (FieldOrder::DayMonthYear, *c, *b, *a),
    ];
    let mut candidates = Vec::new();
    for (order, year, month, day) in orders {
        if month.len() > 2 || day.len() > 2 {
            continue;
        }
        let (Ok(month), Ok(day)) = (month.parse::<u32>(), day.parse::<u32>()) else {
            continue;
        };
        for year in years(year) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                candidates.push(DateCandidate {
                    order,
                    datetime: date.and_time(time),
                });
            }
        }
    }
    (!candidates.is_empty()).then_some(candidates)
}
