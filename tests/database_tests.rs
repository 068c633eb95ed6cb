use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use restaurant_bot::database::{connection::DatabaseManager, models::*};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

async fn insert_reservation(
    db: &DatabaseManager,
    user_id: i64,
    date: &str,
    time: &str,
    status: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO reservations (user_id, reservation_date, reservation_time, guests_count, \
         customer_name, customer_phone, status) VALUES (?, ?, ?, 2, 'Anna', '12345', ?)",
    )
    .bind(user_id)
    .bind(date)
    .bind(time)
    .bind(status)
    .execute(&db.pool)
    .await?;

    Ok(result.last_insert_rowid())
}

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
}

#[tokio::test]
async fn test_reservation_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let id = insert_reservation(&db, 7, "2026-06-15", "19:30", "pending").await?;

    let found = Reservation::find_by_id(&db.pool, id).await?;
    assert!(found.is_some());
    let found = found.unwrap();
    assert_eq!(found.user_id, 7);
    assert_eq!(found.status()?, ReservationStatus::Pending);
    assert_eq!(found.starts_at(), Some(at("2026-06-15", "19:30")));

    assert!(Reservation::find_by_id(&db.pool, id + 100).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_schema_rejects_invalid_rows() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    assert!(insert_reservation(&db, 1, "2026-06-15", "19:00", "archived").await.is_err());

    let too_many_guests = sqlx::query(
        "INSERT INTO reservations (user_id, reservation_date, reservation_time, guests_count, \
         customer_name, customer_phone) VALUES (1, '2026-06-15', '19:00', 21, 'Anna', '12345')",
    )
    .execute(&db.pool)
    .await;
    assert!(too_many_guests.is_err());

    Ok(())
}

#[tokio::test]
async fn test_find_by_user_is_newest_first_and_limited() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let mut ids = Vec::new();
    for day in 1..=12 {
        ids.push(insert_reservation(&db, 5, &format!("2026-07-{day:02}"), "19:00", "pending").await?);
    }
    insert_reservation(&db, 6, "2026-07-01", "19:00", "pending").await?;

    let mine = Reservation::find_by_user(&db.pool, 5).await?;
    assert_eq!(mine.len(), 10);
    assert_eq!(mine[0].id, *ids.last().unwrap());
    assert!(mine.iter().all(|r| r.user_id == 5));

    Ok(())
}

#[tokio::test]
async fn test_find_by_date_orders_by_time() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    insert_reservation(&db, 1, "2026-06-15", "20:00", "pending").await?;
    insert_reservation(&db, 2, "2026-06-15", "12:30", "cancelled").await?;
    insert_reservation(&db, 3, "2026-06-16", "12:00", "pending").await?;

    let day = Reservation::find_by_date(&db.pool, NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()).await?;
    let times: Vec<&str> = day.iter().map(|r| r.reservation_time.as_str()).collect();
    assert_eq!(times, vec!["12:30", "20:00"]);

    Ok(())
}

#[tokio::test]
async fn test_upcoming_and_remaining_today() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    insert_reservation(&db, 1, "2026-06-15", "11:00", "confirmed").await?;
    let later = insert_reservation(&db, 2, "2026-06-15", "19:00", "confirmed").await?;
    let pending = insert_reservation(&db, 3, "2026-06-15", "20:00", "pending").await?;
    insert_reservation(&db, 4, "2026-06-15", "21:00", "cancelled").await?;
    let tomorrow = insert_reservation(&db, 5, "2026-06-16", "10:00", "confirmed").await?;

    let now = at("2026-06-15", "14:00");

    let upcoming = Reservation::find_upcoming_by_status(&db.pool, ReservationStatus::Confirmed, now).await?;
    let ids: Vec<i64> = upcoming.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![later, tomorrow]);

    let today = Reservation::find_remaining_today(&db.pool, now).await?;
    let ids: Vec<i64> = today.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![later, pending]);

    Ok(())
}

#[tokio::test]
async fn test_status_transitions() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let id = insert_reservation(&db, 1, "2026-06-15", "19:00", "pending").await?;

    let confirmed = Reservation::update_status(&db.pool, id, ReservationStatus::Confirmed).await?;
    assert_eq!(confirmed.status()?, ReservationStatus::Confirmed);
    assert!(confirmed.updated_at.is_some());

    let cancelled = Reservation::update_status(&db.pool, id, ReservationStatus::Cancelled).await?;
    assert_eq!(cancelled.status, "cancelled");

    // Terminal states stay terminal
    let err = Reservation::update_status(&db.pool, id, ReservationStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StatusChangeError::IllegalTransition {
            from: ReservationStatus::Cancelled,
            to: ReservationStatus::Confirmed,
            ..
        }
    ));

    let err = Reservation::update_status(&db.pool, 9999, ReservationStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, StatusChangeError::NotFound(9999)));

    Ok(())
}

#[tokio::test]
async fn test_complete_expired() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let yesterday = insert_reservation(&db, 1, "2026-06-14", "20:00", "confirmed").await?;
    let earlier_today = insert_reservation(&db, 2, "2026-06-15", "12:00", "pending").await?;
    let later_today = insert_reservation(&db, 3, "2026-06-15", "19:00", "pending").await?;
    let cancelled = insert_reservation(&db, 4, "2026-06-14", "19:00", "cancelled").await?;

    let completed = Reservation::complete_expired(&db.pool, at("2026-06-15", "14:00")).await?;
    assert_eq!(completed, 2);

    let status_of = |id| {
        let pool = db.pool.clone();
        async move { Reservation::find_by_id(&pool, id).await.unwrap().unwrap().status }
    };
    assert_eq!(status_of(yesterday).await, "completed");
    assert_eq!(status_of(earlier_today).await, "completed");
    assert_eq!(status_of(later_today).await, "pending");
    assert_eq!(status_of(cancelled).await, "cancelled");

    // Idempotent
    assert_eq!(Reservation::complete_expired(&db.pool, at("2026-06-15", "14:00")).await?, 0);
    assert_eq!(db.active_reservation_count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_archive_before_keeps_active_and_recent_rows() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let old_completed = insert_reservation(&db, 1, "2026-04-01", "19:00", "completed").await?;
    let old_cancelled = insert_reservation(&db, 2, "2026-04-02", "19:00", "cancelled").await?;
    let old_pending = insert_reservation(&db, 3, "2026-04-03", "19:00", "pending").await?;
    let recent = insert_reservation(&db, 4, "2026-06-01", "19:00", "completed").await?;

    let archived = Reservation::archive_before(&db.pool, NaiveDate::from_ymd_opt(2026, 5, 16).unwrap()).await?;
    assert_eq!(archived, 2);

    assert!(Reservation::find_by_id(&db.pool, old_completed).await?.is_none());
    assert!(Reservation::find_by_id(&db.pool, old_cancelled).await?.is_none());
    assert!(Reservation::find_by_id(&db.pool, old_pending).await?.is_some());
    assert!(Reservation::find_by_id(&db.pool, recent).await?.is_some());

    Ok(())
}

#[tokio::test]
async fn test_reminder_records() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let id = insert_reservation(&db, 1, "2026-06-15", "19:00", "confirmed").await?;

    assert!(!ReservationReminder::exists(&db.pool, id, 24).await?);

    let reminder = ReservationReminder::create(&db.pool, id, 24).await?;
    assert_eq!(reminder.reservation_id, id);
    assert!(!reminder.id.is_empty());
    assert!(ReservationReminder::exists(&db.pool, id, 24).await?);
    assert!(!ReservationReminder::exists(&db.pool, id, 3).await?);

    // One reminder per lead time
    assert!(ReservationReminder::create(&db.pool, id, 24).await.is_err());

    ReservationReminder::create(&db.pool, id, 3).await?;
    let sent = ReservationReminder::find_by_reservation(&db.pool, id).await?;
    let hours: Vec<i64> = sent.iter().map(|r| r.hours_before).collect();
    assert_eq!(hours, vec![24, 3]);

    Ok(())
}

#[tokio::test]
async fn test_reminders_are_deleted_with_reservation() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let id = insert_reservation(&db, 1, "2026-04-01", "19:00", "completed").await?;
    ReservationReminder::create(&db.pool, id, 3).await?;

    Reservation::archive_before(&db.pool, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()).await?;

    assert!(ReservationReminder::find_by_reservation(&db.pool, id).await?.is_empty());

    Ok(())
}
