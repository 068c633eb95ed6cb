use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::reservation::interval::{STORAGE_DATE_FORMAT, TIME_FORMAT};

const RESERVATION_COLUMNS: &str = "id, user_id, reservation_date, reservation_time, guests_count, \
     customer_name, customer_phone, status, notes, created_at, updated_at";

/// Maximum rows returned by list queries shown in chat.
const LIST_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    /// Active reservations hold a table.
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Pending, Completed) | (Confirmed, Cancelled) | (Confirmed, Completed)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reservation status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ReservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum StatusChangeError {
    #[error("reservation #{0} not found")]
    NotFound(i64),
    #[error("reservation #{id} cannot move from {from} to {to}")]
    IllegalTransition {
        id: i64,
        from: ReservationStatus,
        to: ReservationStatus,
    },
    #[error("reservation #{id} has unreadable status: {source}")]
    Corrupt { id: i64, source: UnknownStatus },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub reservation_date: String, // YYYY-MM-DD
    pub reservation_time: String, // HH:MM
    pub guests_count: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Reservation {
    pub fn status(&self) -> Result<ReservationStatus, UnknownStatus> {
        self.status.parse()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.reservation_date, STORAGE_DATE_FORMAT).ok()
    }

    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.reservation_time, TIME_FORMAT).ok()
    }

    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.date()?.and_time(self.time()?))
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Latest reservations of a user, newest first.
    pub async fn find_by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await
    }

    /// All reservations on a date regardless of status, in seating order.
    pub async fn find_by_date(
        pool: &sqlx::SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_date = ? \
             ORDER BY reservation_time, created_at"
        ))
        .bind(date.format(STORAGE_DATE_FORMAT).to_string())
        .fetch_all(pool)
        .await
    }

    /// Reservations with `status` that start at or after `now`.
    pub async fn find_upcoming_by_status(
        pool: &sqlx::SqlitePool,
        status: ReservationStatus,
        now: NaiveDateTime,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let (today, time_now) = split_local(now);
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE status = ? \
             AND (reservation_date > ? OR (reservation_date = ? AND reservation_time >= ?)) \
             ORDER BY reservation_date, reservation_time LIMIT ?"
        ))
        .bind(status.as_str())
        .bind(&today)
        .bind(&today)
        .bind(&time_now)
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await
    }

    /// Active reservations later today, in seating order.
    pub async fn find_remaining_today(
        pool: &sqlx::SqlitePool,
        now: NaiveDateTime,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let (today, time_now) = split_local(now);
        sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_date = ? \
             AND reservation_time >= ? AND status IN ('pending', 'confirmed') \
             ORDER BY reservation_time"
        ))
        .bind(&today)
        .bind(&time_now)
        .fetch_all(pool)
        .await
    }

    /// Moves a reservation to `next`, rejecting transitions out of terminal
    /// states. The update is conditional on the status read, so a concurrent
    /// change surfaces as an illegal transition instead of being overwritten.
    pub async fn update_status(
        pool: &sqlx::SqlitePool,
        id: i64,
        next: ReservationStatus,
    ) -> Result<Self, StatusChangeError> {
        let current = Self::find_by_id(pool, id)
            .await?
            .ok_or(StatusChangeError::NotFound(id))?;
        let from = current
            .status()
            .map_err(|source| StatusChangeError::Corrupt { id, source })?;

        if !from.can_transition_to(next) {
            return Err(StatusChangeError::IllegalTransition { id, from, to: next });
        }

        let result = sqlx::query(
            "UPDATE reservations SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(next.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(from.as_str())
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            let latest = Self::find_by_id(pool, id)
                .await?
                .ok_or(StatusChangeError::NotFound(id))?;
            let from = latest
                .status()
                .map_err(|source| StatusChangeError::Corrupt { id, source })?;
            return Err(StatusChangeError::IllegalTransition { id, from, to: next });
        }

        Self::find_by_id(pool, id)
            .await?
            .ok_or(StatusChangeError::NotFound(id))
    }

    /// Marks pending and confirmed reservations whose start time has passed
    /// as completed. Returns the number of rows changed.
    pub async fn complete_expired(
        pool: &sqlx::SqlitePool,
        now: NaiveDateTime,
    ) -> Result<u64, sqlx::Error> {
        let (today, time_now) = split_local(now);
        let result = sqlx::query(
            "UPDATE reservations SET status = 'completed', updated_at = ? \
             WHERE status IN ('pending', 'confirmed') \
             AND (reservation_date < ? OR (reservation_date = ? AND reservation_time < ?))",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(&today)
        .bind(&today)
        .bind(&time_now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes completed and cancelled reservations dated before `cutoff`.
    pub async fn archive_before(
        pool: &sqlx::SqlitePool,
        cutoff: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM reservations WHERE reservation_date < ? \
             AND status IN ('completed', 'cancelled')",
        )
        .bind(cutoff.format(STORAGE_DATE_FORMAT).to_string())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn split_local(now: NaiveDateTime) -> (String, String) {
    (
        now.date().format(STORAGE_DATE_FORMAT).to_string(),
        now.time().format(TIME_FORMAT).to_string(),
    )
}
