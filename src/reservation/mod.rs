//! Table-reservation engine.
//!
//! Decides whether a booking fits the restaurant's table and seat capacity
//! and commits accepted bookings atomically, so that concurrent requests can
//! never oversell a time slot.

pub mod engine;
pub mod interval;
pub mod policy;
pub mod sqlite;
pub mod store;
pub mod verdict;

pub use engine::{Customer, ReservationEngine, RetryPolicy};
pub use policy::{CapacityPolicy, RestaurantConfig};
pub use sqlite::SqliteReservationStore;
pub use store::{BookedSlot, NewReservation, ReservationStore, ReservationTransaction, StoreError};
pub use verdict::{CapacityDetails, Reason, Verdict};
