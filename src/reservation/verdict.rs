use serde::Serialize;
use std::fmt;

/// Closed set of reason codes attached to every availability verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Ok,
    RestaurantClosed,
    PastDate,
    InvalidGuestsCount,
    NoTables,
    CapacityExceeded,
    Error,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Ok => "ok",
            Reason::RestaurantClosed => "restaurant_closed",
            Reason::PastDate => "past_date",
            Reason::InvalidGuestsCount => "invalid_guests_count",
            Reason::NoTables => "no_tables",
            Reason::CapacityExceeded => "capacity_exceeded",
            Reason::Error => "error",
        }
    }

    /// Text shown to a customer in chat.
    pub fn user_message(&self) -> &'static str {
        match self {
            Reason::Ok => "A table is available at this time.",
            Reason::RestaurantClosed => "The restaurant is closed at this time.",
            Reason::PastDate => "You cannot book a table for a time in the past.",
            Reason::InvalidGuestsCount => "The number of guests must be between 1 and 20.",
            Reason::NoTables => "Unfortunately there are no free tables at this time.",
            Reason::CapacityExceeded => "The restaurant is fully booked at this time.",
            Reason::Error => "The reservation request could not be processed.",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load figures for the candidate's occupied interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityDetails {
    pub overlapping_count: u32,
    pub tables_remaining: u32,
    pub current_guests: i64,
    pub seats_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// `details` is `None` when only the basic conditions were evaluated.
    Available { details: Option<CapacityDetails> },
    RestaurantClosed,
    PastDate,
    InvalidGuestsCount,
    NoTables { overlapping_count: u32, max_tables: u32 },
    CapacityExceeded { requested_total: i64, total_seats: u32 },
    Error { message: String },
}

impl Verdict {
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available { .. })
    }

    pub fn reason(&self) -> Reason {
        match self {
            Verdict::Available { .. } => Reason::Ok,
            Verdict::RestaurantClosed => Reason::RestaurantClosed,
            Verdict::PastDate => Reason::PastDate,
            Verdict::InvalidGuestsCount => Reason::InvalidGuestsCount,
            Verdict::NoTables { .. } => Reason::NoTables,
            Verdict::CapacityExceeded { .. } => Reason::CapacityExceeded,
            Verdict::Error { .. } => Reason::Error,
        }
    }

    pub fn details(&self) -> Option<&CapacityDetails> {
        match self {
            Verdict::Available { details } => details.as_ref(),
            _ => None,
        }
    }

    /// Customer-facing explanation, including the parse message for errors.
    pub fn describe(&self) -> String {
        match self {
            Verdict::Available { details: Some(d) } => format!(
                "{} Tables left: {}, seats left: {}.",
                Reason::Ok.user_message(),
                d.tables_remaining,
                d.seats_remaining
            ),
            Verdict::NoTables { max_tables, .. } => format!(
                "{} All {} tables are taken.",
                Reason::NoTables.user_message(),
                max_tables
            ),
            Verdict::CapacityExceeded { requested_total, total_seats } => format!(
                "{} Requested {}/{} seats.",
                Reason::CapacityExceeded.user_message(),
                requested_total,
                total_seats
            ),
            Verdict::Error { message } => format!("{} {}", Reason::Error.user_message(), message),
            other => other.reason().user_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(Verdict::PastDate.reason().as_str(), "past_date");
        assert_eq!(Verdict::InvalidGuestsCount.reason().to_string(), "invalid_guests_count");
        assert_eq!(
            Verdict::NoTables { overlapping_count: 10, max_tables: 10 }.reason(),
            Reason::NoTables
        );
        assert_eq!(Verdict::Available { details: None }.reason(), Reason::Ok);
    }

    #[test]
    fn test_reason_serializes_as_snake_case() {
        let json = serde_json::to_string(&Reason::CapacityExceeded).unwrap();
        assert_eq!(json, "\"capacity_exceeded\"");
    }

    #[test]
    fn test_describe_error_includes_message() {
        let verdict = Verdict::Error { message: "Invalid date 'x', expected DD.MM.YYYY".to_string() };
        assert!(!verdict.is_available());
        assert!(verdict.describe().contains("Invalid date 'x'"));
    }
}
