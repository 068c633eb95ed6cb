use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::reservation::interval::{DATE_FORMAT, TIME_FORMAT};

/// Formats a reservation slot for chat, e.g. "Monday, 15 June 2026 at 19:30".
pub fn format_slot(starts_at: &NaiveDateTime) -> String {
    starts_at.format("%A, %d %B %Y at %H:%M").to_string()
}

/// Date in the `DD.MM.YYYY` form customers type.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
