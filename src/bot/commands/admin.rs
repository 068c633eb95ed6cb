use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::commands::booking::format_reservation_line;
use crate::bot::handlers::BotHandler;
use crate::database::models::*;
use crate::utils::datetime::{format_date, format_slot};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_command_error, log_command_start, log_command_success, log_database_error,
    log_validation_error,
};
use crate::utils::markdown::escape_markdown;
use crate::utils::validation::parse_reservation_id;

/// Replies with an error and returns `false` when the sender is not staff.
async fn ensure_admin(
    command: &str,
    user_id: i64,
    feedback: &CommandFeedback,
    handler: &BotHandler,
) -> ResponseResult<bool> {
    if handler.config.is_admin(user_id) {
        return Ok(true);
    }

    tracing::warn!("Unauthorized /{} attempt by user {}", command, user_id);
    feedback.error("This command is only available to restaurant staff").await?;
    Ok(false)
}

pub async fn handle_confirm(
    bot: Bot,
    msg: Message,
    user_id: i64,
    reservation_id: String,
    handler: &BotHandler,
) -> ResponseResult<()> {
    change_status(bot, msg, user_id, reservation_id, ReservationStatus::Confirmed, handler).await
}

pub async fn handle_cancel(
    bot: Bot,
    msg: Message,
    user_id: i64,
    reservation_id: String,
    handler: &BotHandler,
) -> ResponseResult<()> {
    change_status(bot, msg, user_id, reservation_id, ReservationStatus::Cancelled, handler).await
}

async fn change_status(
    bot: Bot,
    msg: Message,
    user_id: i64,
    reservation_id: String,
    next: ReservationStatus,
    handler: &BotHandler,
) -> ResponseResult<()> {
    let command = match next {
        ReservationStatus::Confirmed => "confirm",
        _ => "cancel",
    };
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    log_command_start(command, user_id, chat_id, Some(&reservation_id));

    if !ensure_admin(command, user_id, &feedback, handler).await? {
        return Ok(());
    }

    let id = match parse_reservation_id(&reservation_id) {
        Ok(id) => id,
        Err(e) => {
            log_validation_error(command, "reservation_id", &reservation_id, &e.to_string(), user_id);
            feedback
                .validation_error(&e.to_string(), &format!("Example: /{command} 42"))
                .await?;
            return Ok(());
        }
    };

    let reservation = match Reservation::update_status(&handler.db.pool, id, next).await {
        Ok(reservation) => reservation,
        Err(StatusChangeError::NotFound(_)) => {
            feedback.error(&format!("Reservation #{id} not found")).await?;
            return Ok(());
        }
        Err(StatusChangeError::IllegalTransition { from, .. }) => {
            feedback.warning(&format!("Reservation #{id} is already {from}")).await?;
            return Ok(());
        }
        Err(e) => {
            log_database_error("UPDATE", "reservations", &e.to_string(), Some(&format!("id {id} -> {next}")));
            log_command_error(command, user_id, chat_id, &e.to_string());
            feedback.error("Failed to update the reservation").await?;
            return Ok(());
        }
    };

    feedback
        .success(&format!(
            "Reservation #{id} is now {next}\n\n👤 {} ({})",
            reservation.customer_name, reservation.customer_phone
        ))
        .await?;
    log_command_success(command, user_id, chat_id, Some(&format!("reservation #{id} {next}")));

    notify_customer(&bot, &reservation, next).await;
    Ok(())
}

/// Tells the customer about a status change. Delivery failures are logged
/// and otherwise ignored.
async fn notify_customer(bot: &Bot, reservation: &Reservation, status: ReservationStatus) {
    let headline = match status {
        ReservationStatus::Confirmed => "✅ Your reservation is confirmed!",
        _ => "❌ Your reservation has been cancelled.",
    };
    let when = reservation
        .starts_at()
        .map(|at| format_slot(&at))
        .unwrap_or_else(|| format!("{} {}", reservation.reservation_date, reservation.reservation_time));

    let text = format!(
        "{}\n\n🔖 Reservation: \\#{}\n📅 {}\n👥 Guests: {}",
        escape_markdown(headline),
        reservation.id,
        escape_markdown(&when),
        reservation.guests_count
    );

    if let Err(e) = bot
        .send_message(ChatId(reservation.user_id), text)
        .parse_mode(ParseMode::MarkdownV2)
        .await
    {
        tracing::warn!(
            "Failed to notify user {} about reservation #{}: {}",
            reservation.user_id,
            reservation.id,
            e
        );
    }
}

pub async fn handle_today(bot: Bot, msg: Message, user_id: i64, handler: &BotHandler) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    log_command_start("today", user_id, chat_id, None);

    if !ensure_admin("today", user_id, &feedback, handler).await? {
        return Ok(());
    }

    let now = handler.engine.clock().now();
    let reservations = match Reservation::find_remaining_today(&handler.db.pool, now).await {
        Ok(reservations) => reservations,
        Err(e) => {
            log_database_error("SELECT", "reservations", &e.to_string(), Some("remaining today"));
            feedback.error("Failed to load today's reservations").await?;
            return Ok(());
        }
    };

    let today = format_date(&now.date());
    if reservations.is_empty() {
        feedback.info(&format!("No more reservations for today ({today})")).await?;
        return Ok(());
    }

    let guests: i64 = reservations.iter().map(|r| r.guests_count).sum();
    let mut text = format!(
        "📋 *Reservations for {}*\n{} bookings, {} guests\n\n",
        escape_markdown(&today),
        reservations.len(),
        guests
    );
    for reservation in &reservations {
        text.push_str(&format_reservation_line(reservation));
        text.push_str(&format!(
            "\n    👤 {} {}\n",
            escape_markdown(&reservation.customer_name),
            escape_markdown(&reservation.customer_phone)
        ));
    }

    feedback.send_raw(text).await?;
    log_command_success("today", user_id, chat_id, Some(&format!("{} reservations", reservations.len())));
    Ok(())
}
