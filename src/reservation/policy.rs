//! Restaurant capacity rules.
//!
//! Two independent caps apply to every instant of the day: the number of
//! distinct tables in use and the total number of seated guests. Table count
//! is evaluated first.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

use super::interval::{intervals_overlap, occupied_interval};
use super::store::BookedSlot;
use super::verdict::{CapacityDetails, Verdict};

/// Largest party a single reservation may hold.
pub const MAX_GUESTS_PER_RESERVATION: i64 = 20;

/// Immutable restaurant configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantConfig {
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub slot_duration: Duration,
    pub max_tables: u32,
    pub total_seats: u32,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_duration: Duration::hours(2),
            max_tables: 10,
            total_seats: 40,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapacityPolicy {
    config: RestaurantConfig,
}

impl CapacityPolicy {
    pub fn new(config: RestaurantConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RestaurantConfig {
        &self.config
    }

    /// Opening hours, past-date and party-size checks.
    ///
    /// Opening hours are compared by hour only: with a 22:00 closing time a
    /// 21:59 booking is accepted.
    pub fn check_basic_conditions(
        &self,
        requested: NaiveDateTime,
        guests_count: i64,
        now: NaiveDateTime,
    ) -> Verdict {
        let hour = requested.hour();
        if hour < self.config.opening_time.hour() || hour >= self.config.closing_time.hour() {
            return Verdict::RestaurantClosed;
        }

        if requested < now {
            return Verdict::PastDate;
        }

        if guests_count <= 0 || guests_count > MAX_GUESTS_PER_RESERVATION {
            return Verdict::InvalidGuestsCount;
        }

        Verdict::Available { details: None }
    }

    /// Evaluates the candidate against active reservations on the same date.
    pub fn evaluate_overlap(
        &self,
        requested: NaiveDateTime,
        guests_count: i64,
        existing: &[BookedSlot],
    ) -> Verdict {
        let Some((start, end)) = occupied_interval(requested, self.config.slot_duration) else {
            return out_of_range(requested);
        };

        let mut overlapping_count: u32 = 0;
        let mut overlapping_guests: i64 = 0;

        for slot in existing.iter().filter(|s| s.status.is_active()) {
            let slot_start = requested.date().and_time(slot.time);
            let Some((slot_start, slot_end)) = occupied_interval(slot_start, self.config.slot_duration) else {
                return out_of_range(slot_start);
            };
            if intervals_overlap(start, end, slot_start, slot_end) {
                overlapping_count += 1;
                overlapping_guests += slot.guests_count;
            }
        }

        if overlapping_count >= self.config.max_tables {
            return Verdict::NoTables {
                overlapping_count,
                max_tables: self.config.max_tables,
            };
        }

        let requested_total = overlapping_guests + guests_count;
        if requested_total > i64::from(self.config.total_seats) {
            return Verdict::CapacityExceeded {
                requested_total,
                total_seats: self.config.total_seats,
            };
        }

        Verdict::Available {
            details: Some(CapacityDetails {
                overlapping_count,
                tables_remaining: self.config.max_tables - overlapping_count,
                current_guests: overlapping_guests,
                seats_remaining: i64::from(self.config.total_seats) - requested_total,
            }),
        }
    }
}

fn out_of_range(start: NaiveDateTime) -> Verdict {
    Verdict::Error {
        message: format!("Reservation starting {start} ends outside the supported date range"),
    }
}
