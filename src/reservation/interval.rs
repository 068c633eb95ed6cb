//! Date/time parsing and occupied-interval arithmetic for reservations.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Date format used in chat input, e.g. `15.06.2026`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";
/// Time format used in chat input and storage, e.g. `19:30`.
pub const TIME_FORMAT: &str = "%H:%M";
/// Date format used in storage, ordered lexically.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid date '{0}', expected DD.MM.YYYY")]
    InvalidDate(String),
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Parses `DD.MM.YYYY`. The year must be exactly four digits.
pub fn parse_date(date_text: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = date_text.trim();
    let year = trimmed.rsplit('.').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidDate(trimmed.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(trimmed.to_string()))
}

pub fn parse_time(time_text: &str) -> Result<NaiveTime, ParseError> {
    let trimmed = time_text.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map_err(|_| ParseError::InvalidTime(trimmed.to_string()))
}

/// Parses a `DD.MM.YYYY` date and an `HH:MM` time into a single instant.
pub fn parse_instant(date_text: &str, time_text: &str) -> Result<NaiveDateTime, ParseError> {
    let date = parse_date(date_text)?;
    let time = parse_time(time_text)?;
    Ok(date.and_time(time))
}

/// The half-open span `[start, start + duration)` a reservation holds a table.
/// `None` when the end is not representable.
pub fn occupied_interval(start: NaiveDateTime, duration: Duration) -> Option<(NaiveDateTime, NaiveDateTime)> {
    start.checked_add_signed(duration).map(|end| (start, end))
}

/// Half-open overlap test: intervals that merely touch do not overlap.
pub fn intervals_overlap(
    start_a: NaiveDateTime,
    end_a: NaiveDateTime,
    start_b: NaiveDateTime,
    end_b: NaiveDateTime,
) -> bool {
    start_a < end_b && start_b < end_a
}
