use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Record of a reminder already delivered for a reservation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReservationReminder {
    pub id: String,
    pub reservation_id: i64,
    pub hours_before: i64,
    pub sent_at: String,
}

impl ReservationReminder {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        reservation_id: i64,
        hours_before: i64,
    ) -> Result<Self, sqlx::Error> {
        let reminder = ReservationReminder {
            id: Uuid::new_v4().to_string(),
            reservation_id,
            hours_before,
            sent_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            "INSERT INTO reservation_reminders (id, reservation_id, hours_before, sent_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&reminder.id)
        .bind(reminder.reservation_id)
        .bind(reminder.hours_before)
        .bind(&reminder.sent_at)
        .execute(pool)
        .await?;

        Ok(reminder)
    }

    pub async fn exists(
        pool: &sqlx::SqlitePool,
        reservation_id: i64,
        hours_before: i64,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservation_reminders WHERE reservation_id = ? AND hours_before = ?",
        )
        .bind(reservation_id)
        .bind(hours_before)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn find_by_reservation(
        pool: &sqlx::SqlitePool,
        reservation_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ReservationReminder>(
            "SELECT id, reservation_id, hours_before, sent_at FROM reservation_reminders \
             WHERE reservation_id = ? ORDER BY hours_before DESC",
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }
}
