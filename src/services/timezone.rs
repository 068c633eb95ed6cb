use chrono::{FixedOffset, NaiveDateTime, Utc};

/// Source of "now" in the restaurant's local time.
///
/// Reservation dates and times are entered as local wall-clock values, so
/// past-date checks and expiry sweeps must compare against local time rather
/// than UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantClock {
    /// Live clock at a fixed UTC offset.
    Offset(FixedOffset),
    /// Frozen clock, used for tests and replays.
    Fixed(NaiveDateTime),
}

impl RestaurantClock {
    /// Builds a live clock from a whole-hour UTC offset, e.g. `4` for UTC+4.
    pub fn from_utc_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours * 3600).map(RestaurantClock::Offset)
    }

    pub fn now(&self) -> NaiveDateTime {
        match self {
            RestaurantClock::Offset(offset) => Utc::now().with_timezone(offset).naive_local(),
            RestaurantClock::Fixed(at) => *at,
        }
    }
}
