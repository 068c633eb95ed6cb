//! Storage contract consumed by the reservation engine.
//!
//! Adapters must report lock contention and serialization failures as
//! [`StoreError::Conflict`]; only those are retried by the committer.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::database::models::ReservationStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Backend(#[source] sqlx::Error),
    #[error("malformed reservation row: {0}")]
    Malformed(String),
}

/// The part of an existing reservation the capacity check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedSlot {
    pub time: NaiveTime,
    pub guests_count: i64,
    pub status: ReservationStatus,
}

/// A validated reservation about to be inserted with status `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub user_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub guests_count: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Pending and confirmed reservations on `date`, read without locking.
    async fn fetch_active_for_date(&self, date: NaiveDate) -> Result<Vec<BookedSlot>, StoreError>;

    /// Opens a serializable transaction holding the exclusive booking lock.
    async fn begin_exclusive(&self) -> Result<Box<dyn ReservationTransaction>, StoreError>;
}

#[async_trait]
pub trait ReservationTransaction: Send {
    async fn fetch_active_for_date(&mut self, date: NaiveDate) -> Result<Vec<BookedSlot>, StoreError>;

    /// Inserts a `pending` reservation and returns its id.
    async fn insert(&mut self, reservation: &NewReservation) -> Result<i64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
