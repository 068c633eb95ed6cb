//! SQLite implementation of [`ReservationStore`].
//!
//! SQLite transactions are serializable. The exclusive booking lock is taken
//! by writing the `reservations` row of `reservation_locks` as the first
//! statement of the transaction, which acquires the database write lock
//! before any reservation is read. Competing writers wait on the pool's busy
//! timeout and surface `SQLITE_BUSY`/`SQLITE_LOCKED` as conflicts.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use super::interval::{STORAGE_DATE_FORMAT, TIME_FORMAT};
use super::store::{BookedSlot, NewReservation, ReservationStore, ReservationTransaction, StoreError};
use crate::database::models::ReservationStatus;
use crate::utils::logging::log_database_operation;

const RESERVATIONS_LOCK: &str = "reservations";

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if is_serialization_conflict(&err) {
            StoreError::Conflict(err.to_string())
        } else {
            StoreError::Backend(err)
        }
    }
}

/// Primary result codes for lock contention; extended codes keep the
/// primary code in their low byte.
fn is_serialization_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        _ => false,
    }
}

#[derive(Debug, FromRow)]
struct SlotRow {
    reservation_time: String,
    guests_count: i64,
    status: String,
}

impl TryFrom<SlotRow> for BookedSlot {
    type Error = StoreError;

    fn try_from(row: SlotRow) -> Result<Self, Self::Error> {
        let time = NaiveTime::parse_from_str(&row.reservation_time, TIME_FORMAT)
            .map_err(|e| StoreError::Malformed(format!("time '{}': {}", row.reservation_time, e)))?;
        let status = row
            .status
            .parse::<ReservationStatus>()
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(BookedSlot {
            time,
            guests_count: row.guests_count,
            status,
        })
    }
}

async fn fetch_slots<'e, E>(executor: E, date: NaiveDate) -> Result<Vec<BookedSlot>, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let date_str = date.format(STORAGE_DATE_FORMAT).to_string();
    log_database_operation("SELECT", "reservations", Some(&format!("active on {date_str}")));

    let rows = sqlx::query_as::<_, SlotRow>(
        "SELECT reservation_time, guests_count, status FROM reservations \
         WHERE reservation_date = ? AND status IN ('pending', 'confirmed')",
    )
    .bind(&date_str)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(BookedSlot::try_from).collect()
}

#[derive(Clone)]
pub struct SqliteReservationStore {
    pool: SqlitePool,
}

impl SqliteReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for SqliteReservationStore {
    async fn fetch_active_for_date(&self, date: NaiveDate) -> Result<Vec<BookedSlot>, StoreError> {
        fetch_slots(&self.pool, date).await
    }

    async fn begin_exclusive(&self) -> Result<Box<dyn ReservationTransaction>, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE reservation_locks SET acquired_at = ? WHERE name = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(RESERVATIONS_LOCK)
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(SqliteReservationTransaction { tx }))
    }
}

/// Rolled back automatically if dropped without commit.
pub struct SqliteReservationTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl ReservationTransaction for SqliteReservationTransaction {
    async fn fetch_active_for_date(&mut self, date: NaiveDate) -> Result<Vec<BookedSlot>, StoreError> {
        fetch_slots(&mut *self.tx, date).await
    }

    async fn insert(&mut self, reservation: &NewReservation) -> Result<i64, StoreError> {
        log_database_operation("INSERT", "reservations", Some(&format!("user {}", reservation.user_id)));

        let result = sqlx::query(
            r#"
            INSERT INTO reservations
                (user_id, reservation_date, reservation_time, guests_count,
                 customer_name, customer_phone, status, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reservation.user_id)
        .bind(reservation.date.format(STORAGE_DATE_FORMAT).to_string())
        .bind(reservation.time.format(TIME_FORMAT).to_string())
        .bind(reservation.guests_count)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_phone)
        .bind(ReservationStatus::Pending.as_str())
        .bind(&reservation.notes)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
