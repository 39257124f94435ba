//! Conversion between local wall-clock strings and stored UTC instants.
//!
//! Callers exchange civil dates (`YYYY-MM-DD`) and 24-hour times (`HH:MM`)
//! together with an IANA zone name; storage only ever sees UTC instants.
//! The zone's rules for the specific date are applied, so an instant always
//! renders according to the zone name rather than a cached offset.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;

use crate::types::Timestamp;

/// Civil date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 24-hour time format used on the wire.
pub const TIME_FORMAT: &str = "%H:%M";

/// Accepted on input only, for callers that send seconds.
const TIME_FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

/// Longest skipped stretch of local time searched when resolving a gap.
/// Zones that changed sides of the date line skipped a whole day.
const MAX_GAP_HOURS: i64 = 48;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),
}

/// A UTC instant projected into a zone's local calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalDateTime {
    pub date: String,
    pub time: String,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Resolve an IANA zone identifier such as `America/New_York`.
pub fn parse_time_zone(name: &str) -> Result<Tz, TimeError> {
    name.parse::<Tz>()
        .map_err(|_| TimeError::InvalidTimeZone(name.to_string()))
}

/// Parse a `YYYY-MM-DD` civil date.
pub fn parse_date(date: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| TimeError::InvalidDateTime(format!("'{date}' is not a YYYY-MM-DD date")))
}

/// Parse an `HH:MM` (or `HH:MM:SS`) 24-hour time.
pub fn parse_time(time: &str) -> Result<NaiveTime, TimeError> {
    NaiveTime::parse_from_str(time, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(time, TIME_FORMAT_WITH_SECONDS))
        .map_err(|_| TimeError::InvalidDateTime(format!("'{time}' is not an HH:MM time")))
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert a local date + time in the named zone to a UTC instant.
pub fn to_instant(date: &str, time: &str, time_zone: &str) -> Result<Timestamp, TimeError> {
    let tz = parse_time_zone(time_zone)?;
    let naive = NaiveDateTime::new(parse_date(date)?, parse_time(time)?);
    local_to_utc(naive, tz)
}

/// Project a UTC instant into the named zone's local date and time strings.
pub fn from_instant(instant: Timestamp, time_zone: &str) -> Result<LocalDateTime, TimeError> {
    let tz = parse_time_zone(time_zone)?;
    Ok(project(instant, tz))
}

/// Same as [`from_instant`] for callers that already resolved the zone.
pub fn project(instant: Timestamp, tz: Tz) -> LocalDateTime {
    let local = instant.with_timezone(&tz);
    LocalDateTime {
        date: local.format(DATE_FORMAT).to_string(),
        time: local.format(TIME_FORMAT).to_string(),
    }
}

/// Anchor a naive local date-time in `tz`.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to the
/// earlier instant. Times inside a spring-forward gap are read with the
/// offset in force just before the gap, which moves them forward by the
/// length of the gap.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> Result<Timestamp, TimeError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let offset = (1..=MAX_GAP_HOURS)
                .find_map(|hours| {
                    tz.offset_from_local_datetime(&(naive - Duration::hours(hours)))
                        .earliest()
                })
                .ok_or_else(|| TimeError::InvalidDateTime(naive.to_string()))?;
            let seconds = i64::from(offset.fix().local_minus_utc());
            let utc = naive - Duration::seconds(seconds);
            Ok(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
