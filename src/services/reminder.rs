use chrono::{Duration, NaiveDateTime};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio_cron_scheduler::{Job, JobScheduler};
use std::sync::Arc;

use crate::database::{connection::DatabaseManager, models::*};
use crate::services::timezone::RestaurantClock;
use crate::utils::{datetime::format_slot, logging::log_system_event, markdown::escape_markdown};

/// Completed and cancelled reservations older than this are deleted.
pub const ARCHIVE_AFTER_DAYS: i64 = 30;

type ServiceResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    DayBefore,
    ThreeHoursBefore,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::DayBefore, ReminderKind::ThreeHoursBefore];

    pub fn hours_before(&self) -> i64 {
        match self {
            ReminderKind::DayBefore => 24,
            ReminderKind::ThreeHoursBefore => 3,
        }
    }

    /// Reminders go out when the time left is within 30 minutes of the
    /// nominal lead time.
    fn window(&self) -> (Duration, Duration) {
        let lead = Duration::hours(self.hours_before());
        (lead - Duration::minutes(30), lead + Duration::minutes(30))
    }

    fn headline(&self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "📅 Your table is booked for tomorrow",
            ReminderKind::ThreeHoursBefore => "⏰ See you in about 3 hours",
        }
    }
}

/// The reminder due for a reservation starting at `starts_at`, if any.
pub fn due_reminder(now: NaiveDateTime, starts_at: NaiveDateTime) -> Option<ReminderKind> {
    let time_left = starts_at - now;
    ReminderKind::ALL.into_iter().find(|kind| {
        let (from, to) = kind.window();
        from <= time_left && time_left <= to
    })
}

/// Background jobs for reservation housekeeping: expiry, reminders and
/// archival.
pub struct ReminderService {
    bot: Bot,
    db: Arc<DatabaseManager>,
    clock: RestaurantClock,
    scheduler: JobScheduler,
}

impl ReminderService {
    pub async fn new(bot: Bot, db: Arc<DatabaseManager>, clock: RestaurantClock) -> ServiceResult<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            db,
            clock,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> ServiceResult<()> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let clock = self.clock;

        // Every five minutes: expire past reservations, then send reminders.
        let reminder_job = Job::new_async("0 */5 * * * *", move |_uuid, _l| {
            let bot = bot.clone();
            let db = db.clone();
            Box::pin(async move {
                if let Err(e) = complete_expired_reservations(&db, clock).await {
                    tracing::error!("Failed to complete expired reservations: {}", e);
                }
                if let Err(e) = check_and_send_reminders(&bot, &db, clock).await {
                    tracing::error!("Failed to send reminders: {}", e);
                }
            })
        })?;

        let db = self.db.clone();
        let archive_job = Job::new_async("0 30 3 * * *", move |_uuid, _l| {
            let db = db.clone();
            Box::pin(async move {
                if let Err(e) = archive_old_reservations(&db, clock, ARCHIVE_AFTER_DAYS).await {
                    tracing::error!("Failed to archive reservations: {}", e);
                }
            })
        })?;

        self.scheduler.add(reminder_job).await?;
        self.scheduler.add(archive_job).await?;
        self.scheduler.start().await?;

        tracing::info!("Reminder service started - sweeping every 5 minutes, archiving daily at 03:30 UTC");
        Ok(())
    }

    pub async fn stop(&mut self) -> ServiceResult<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// Marks reservations whose start time has passed as completed.
pub async fn complete_expired_reservations(db: &DatabaseManager, clock: RestaurantClock) -> ServiceResult<u64> {
    let completed = Reservation::complete_expired(&db.pool, clock.now()).await?;
    if completed > 0 {
        log_system_event("Expired reservations completed", Some(&completed.to_string()));
    }
    Ok(completed)
}

pub async fn archive_old_reservations(
    db: &DatabaseManager,
    clock: RestaurantClock,
    days_old: i64,
) -> ServiceResult<u64> {
    let cutoff = Duration::try_days(days_old)
        .and_then(|age| clock.now().date().checked_sub_signed(age))
        .ok_or_else(|| format!("Archive age of {days_old} days is out of range"))?;
    let archived = Reservation::archive_before(&db.pool, cutoff).await?;
    log_system_event(
        "Old reservations archived",
        Some(&format!("{archived} rows dated before {cutoff}")),
    );
    Ok(archived)
}

/// Confirmed reservations today and tomorrow whose reminder is due and not
/// yet sent.
pub async fn pending_reminders(
    db: &DatabaseManager,
    now: NaiveDateTime,
) -> ServiceResult<Vec<(Reservation, ReminderKind)>> {
    let mut due = Vec::new();

    for date in [now.date(), now.date() + Duration::days(1)] {
        for reservation in Reservation::find_by_date(&db.pool, date).await? {
            if reservation.status() != Ok(ReservationStatus::Confirmed) {
                continue;
            }
            let Some(starts_at) = reservation.starts_at() else {
                tracing::warn!("Reservation #{} has an unreadable date/time", reservation.id);
                continue;
            };
            if let Some(kind) = due_reminder(now, starts_at) {
                if !ReservationReminder::exists(&db.pool, reservation.id, kind.hours_before()).await? {
                    due.push((reservation, kind));
                }
            }
        }
    }

    Ok(due)
}

async fn check_and_send_reminders(bot: &Bot, db: &DatabaseManager, clock: RestaurantClock) -> ServiceResult<()> {
    for (reservation, kind) in pending_reminders(db, clock.now()).await? {
        if send_reservation_reminder(bot, &reservation, kind).await {
            ReservationReminder::create(&db.pool, reservation.id, kind.hours_before()).await?;
            tracing::info!(
                "Sent {}h reminder for reservation #{} to user {}",
                kind.hours_before(),
                reservation.id,
                reservation.user_id
            );
        }
    }

    Ok(())
}

async fn send_reservation_reminder(bot: &Bot, reservation: &Reservation, kind: ReminderKind) -> bool {
    let when = reservation
        .starts_at()
        .map(|at| format_slot(&at))
        .unwrap_or_else(|| format!("{} {}", reservation.reservation_date, reservation.reservation_time));

    let text = format!(
        "{}\n\n📅 When: {}\n👥 Guests: {}\n🔖 Reservation: \\#{}",
        escape_markdown(kind.headline()),
        escape_markdown(&when),
        reservation.guests_count,
        reservation.id
    );

    match bot
        .send_message(ChatId(reservation.user_id), text)
        .parse_mode(ParseMode::MarkdownV2)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Failed to send reminder to user {}: {}", reservation.user_id, e);
            false
        }
    }
}
