use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// The backend's interval cell: `"dd.mm.yyyy HH:MM - dd.mm.yyyy HH:MM (TZ)"`.
const STAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalParseError {
    #[error("interval cell has no timezone suffix: {0:?}")]
    MissingZone(String),
    #[error("interval cell is not a start - end pair: {0:?}")]
    MissingSeparator(String),
    #[error("bad timestamp {stamp:?}: {message}")]
    BadStamp { stamp: String, message: String },
    #[error("unknown timezone {0:?}")]
    UnknownZone(String),
    #[error("timestamp {0:?} does not exist in its timezone")]
    NonexistentLocalTime(String),
}

/// Parses one interval cell into UTC start and end instants.
pub fn parse_interval(cell: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), IntervalParseError> {
    let (dates, zone) = cell
        .rsplit_once(" (")
        .ok_or_else(|| IntervalParseError::MissingZone(cell.to_string()))?;
    let zone = zone.trim_end_matches(')').trim();
    let tz: Tz = zone
        .parse()
        .map_err(|_| IntervalParseError::UnknownZone(zone.to_string()))?;

    let (start, end) = dates
        .split_once(" - ")
        .ok_or_else(|| IntervalParseError::MissingSeparator(cell.to_string()))?;

    Ok((parse_stamp(start, tz)?, parse_stamp(end, tz)?))
}

fn parse_stamp(stamp: &str, tz: Tz) -> Result<DateTime<Utc>, IntervalParseError> {
    let stamp = stamp.trim();
    let naive =
        NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).map_err(|err| {
            IntervalParseError::BadStamp {
                stamp: stamp.to_string(),
                message: err.to_string(),
            }
        })?;
    // DST gaps have no local representation; ambiguous stamps take the
    // earlier instant.
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| IntervalParseError::NonexistentLocalTime(stamp.to_string()))
}
