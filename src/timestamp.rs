//! Creation-time resolution for an export document.
//!
//! First match wins:
//!
//! 1. A run of 13 digits in the file name, read as epoch milliseconds
//!    (`1610000000000-export.html`).
//! 2. A `M/D/YYYY, H:MM:SS AM|PM` date in the title heading, read as a wall
//!    clock time in the configured zone (local unless pinned by
//!    `timestamps.utc_offset_minutes`).
//!
//! A result that is not a positive number of milliseconds fails the document
//! with [`TimestampError`].

use chrono::{FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static FILENAME_MILLIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{13}").expect("static regex"));

static TITLE_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)/(\d+)/(\d+),\s+(\d+):(\d+):(\d+)\s+([AP])M").expect("static regex")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("no timestamp in filename {filename} or title")]
    NotFound { filename: String },
    #[error("title date '{text}' is not a valid time")]
    InvalidTitleDate { text: String },
}

/// Time zone used to interpret title dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleZone {
    /// The machine's local zone.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl TitleZone {
    /// Build from an optional offset in minutes east of UTC.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .map(TitleZone::Fixed)
            .unwrap_or_default()
    }

    fn to_millis(self, naive: &NaiveDateTime) -> Option<i64> {
        match self {
            TitleZone::Local => earliest(Local.from_local_datetime(naive)),
            TitleZone::Fixed(offset) => earliest(offset.from_local_datetime(naive)),
        }
    }
}

fn earliest<Tz: TimeZone>(result: LocalResult<chrono::DateTime<Tz>>) -> Option<i64> {
    result.earliest().map(|dt| dt.timestamp_millis())
}

/// Epoch milliseconds from a 13-digit run in the file name.
pub fn from_filename(filename: &str) -> Option<i64> {
    FILENAME_MILLIS
        .find(filename)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .filter(|ms| *ms > 0)
}

/// Epoch milliseconds from a `M/D/YYYY, H:MM:SS AM|PM` date in the title.
///
/// `Ok(None)` when the title contains no date at all.
pub fn from_title(title: &str, zone: TitleZone) -> Result<Option<i64>, TimestampError> {
    let Some(caps) = TITLE_DATETIME.captures(title) else {
        return Ok(None);
    };
    let invalid = || TimestampError::InvalidTitleDate {
        text: caps[0].to_string(),
    };
    let num = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());

    let (month, day, year) = (num(1)?, num(2)?, num(3)?);
    let (hour12, minute, second) = (num(4)?, num(5)?, num(6)?);
    if !(1..=12).contains(&hour12) {
        return Err(invalid());
    }
    let hour = match (&caps[7], hour12) {
        ("A", 12) => 0,
        ("A", h) => h,
        ("P", 12) => 12,
        (_, h) => h + 12,
    };

    let year = i32::try_from(year).map_err(|_| invalid())?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)?;
    let millis = zone.to_millis(&naive).ok_or_else(invalid)?;
    if millis > 0 { Ok(Some(millis)) } else { Err(invalid()) }
}

/// Resolve a document's timestamp from its file name, then its title.
pub fn resolve(filename: &str, title: &str, zone: TitleZone) -> Result<i64, TimestampError> {
    if let Some(ms) = from_filename(filename) {
        return Ok(ms);
    }
    from_title(title, zone)?.ok_or_else(|| TimestampError::NotFound {
        filename: filename.to_string(),
    })
}
