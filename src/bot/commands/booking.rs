use teloxide::prelude::*;

use crate::bot::handlers::BotHandler;
use crate::database::models::*;
use crate::reservation::{Customer, RestaurantConfig, Verdict};
use crate::utils::datetime::{format_slot, format_time};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{
    log_booking_outcome, log_command_error, log_command_start, log_command_success,
    log_database_error, log_validation_error,
};
use crate::utils::markdown::escape_markdown;
use crate::utils::validation::{parse_guests_count, validate_customer_name, validate_customer_phone};

/// Extra guidance shown after a rejection, when there is any.
pub fn verdict_hint(verdict: &Verdict, config: &RestaurantConfig) -> Option<String> {
    match verdict {
        Verdict::RestaurantClosed => Some(format!(
            "We take bookings from {} until {}.",
            format_time(&config.opening_time),
            format_time(&config.closing_time)
        )),
        Verdict::Error { .. } => {
            Some("Use the format DD.MM.YYYY HH:MM, e.g. 24.12.2026 19:00".to_string())
        }
        Verdict::NoTables { .. } | Verdict::CapacityExceeded { .. } => {
            Some("Try a time at least two hours earlier or later.".to_string())
        }
        _ => None,
    }
}

async fn send_verdict(feedback: &CommandFeedback, verdict: &Verdict, handler: &BotHandler) -> ResponseResult<()> {
    feedback.verdict(verdict).await?;
    if let Some(hint) = verdict_hint(verdict, handler.engine.policy().config()) {
        feedback.info(&hint).await?;
    }
    Ok(())
}

pub async fn handle_check(
    bot: Bot,
    msg: Message,
    user_id: i64,
    date: String,
    time: String,
    guests: String,
    handler: &BotHandler,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    log_command_start("check", user_id, chat_id, Some(&format!("{date} {time} x{guests}")));

    let guests_count = match parse_guests_count(&guests) {
        Ok(count) => count,
        Err(e) => {
            log_validation_error("check", "guests", &guests, &e.to_string(), user_id);
            feedback
                .validation_error(&e.to_string(), "Example: /check 24.12.2026 19:00 4")
                .await?;
            return Ok(());
        }
    };

    let verdict = handler.engine.check_availability(&date, &time, guests_count).await;
    send_verdict(&feedback, &verdict, handler).await?;

    log_command_success("check", user_id, chat_id, Some(verdict.reason().as_str()));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_book(
    bot: Bot,
    msg: Message,
    user_id: i64,
    date: String,
    time: String,
    guests: String,
    name: String,
    phone: String,
    handler: &BotHandler,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let slot = format!("{date} {time}");

    log_command_start("book", user_id, chat_id, Some(&format!("{slot} x{guests}")));

    let guests_count = match parse_guests_count(&guests) {
        Ok(count) => count,
        Err(e) => {
            log_validation_error("book", "guests", &guests, &e.to_string(), user_id);
            feedback
                .validation_error(&e.to_string(), "Example: /book 24.12.2026 19:00 4 Anna Smith +79991234567")
                .await?;
            return Ok(());
        }
    };

    let name = match validate_customer_name(&name) {
        Ok(name) => name,
        Err(e) => {
            log_validation_error("book", "name", &name, &e.to_string(), user_id);
            feedback.validation_error(&e.to_string(), "Use the name the table should be held under").await?;
            return Ok(());
        }
    };

    let phone = match validate_customer_phone(&phone) {
        Ok(phone) => phone,
        Err(e) => {
            log_validation_error("book", "phone", &phone, &e.to_string(), user_id);
            feedback.validation_error(&e.to_string(), "Example: +7 999 123-45-67").await?;
            return Ok(());
        }
    };

    // Pre-flight check so the customer learns why a slot is unavailable.
    let verdict = handler.engine.check_availability(&date, &time, guests_count).await;
    if !verdict.is_available() {
        log_booking_outcome(user_id, &slot, guests_count, verdict.reason().as_str());
        send_verdict(&feedback, &verdict, handler).await?;
        return Ok(());
    }

    let customer = Customer { user_id, name, phone };
    match handler.engine.create_reservation(&customer, &date, &time, guests_count).await {
        Some(id) => {
            log_booking_outcome(user_id, &slot, guests_count, &format!("created #{id}"));

            let when = match Reservation::find_by_id(&handler.db.pool, id).await {
                Ok(Some(reservation)) => reservation.starts_at().map(|at| format_slot(&at)),
                Ok(None) => None,
                Err(e) => {
                    log_database_error("SELECT", "reservations", &e.to_string(), Some(&format!("id {id}")));
                    None
                }
            }
            .unwrap_or(slot);

            feedback
                .success(&format!(
                    "Reservation #{id} received!\n\n📅 {when}\n👥 Guests: {guests_count}\n👤 {}\n\nStatus: pending. We will notify you once the restaurant confirms it.",
                    customer.name
                ))
                .await?;
            log_command_success("book", user_id, chat_id, Some(&format!("reservation #{id}")));
        }
        None => {
            log_booking_outcome(user_id, &slot, guests_count, "not created");
            log_command_error("book", user_id, chat_id, "reservation was not created");
            feedback
                .error("Sorry, this time could not be booked. The table may have just been taken, please try another time.")
                .await?;
        }
    }

    Ok(())
}

pub async fn handle_my(bot: Bot, msg: Message, user_id: i64, handler: &BotHandler) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    log_command_start("my", user_id, chat_id, None);

    let reservations = match Reservation::find_by_user(&handler.db.pool, user_id).await {
        Ok(reservations) => reservations,
        Err(e) => {
            log_database_error("SELECT", "reservations", &e.to_string(), Some(&format!("user {user_id}")));
            feedback.error("Failed to load your reservations").await?;
            return Ok(());
        }
    };

    if reservations.is_empty() {
        feedback
            .info("You have no reservations yet.\n\nBook a table with /book DD.MM.YYYY HH:MM GUESTS NAME PHONE")
            .await?;
        return Ok(());
    }

    let mut text = String::from("📋 *Your reservations*\n\n");
    for reservation in &reservations {
        text.push_str(&format_reservation_line(reservation));
        text.push('\n');
    }

    feedback.send_raw(text).await?;
    log_command_success("my", user_id, chat_id, Some(&format!("{} reservations", reservations.len())));
    Ok(())
}

fn status_emoji(status: &str) -> &'static str {
    match status.parse::<ReservationStatus>() {
        Ok(ReservationStatus::Pending) => "⏳",
        Ok(ReservationStatus::Confirmed) => "✅",
        Ok(ReservationStatus::Cancelled) => "❌",
        Ok(ReservationStatus::Completed) => "🏁",
        Err(_) => "❔",
    }
}

/// One MarkdownV2 line describing a reservation.
pub fn format_reservation_line(reservation: &Reservation) -> String {
    let when = reservation
        .starts_at()
        .map(|at| format_slot(&at))
        .unwrap_or_else(|| format!("{} {}", reservation.reservation_date, reservation.reservation_time));

    format!(
        "{} \\#{} · {} · {} guests · {}",
        status_emoji(&reservation.status),
        reservation.id,
        escape_markdown(&when),
        reservation.guests_count,
        escape_markdown(&reservation.status)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(status: &str) -> Reservation {
        Reservation {
            id: 7,
            user_id: 1,
            reservation_date: "2026-06-15".to_string(),
            reservation_time: "19:30".to_string(),
            guests_count: 4,
            customer_name: "Anna".to_string(),
            customer_phone: "12345".to_string(),
            status: status.to_string(),
            notes: None,
            created_at: "2026-06-01T10:00:00Z".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn test_reservation_line() {
        let line = format_reservation_line(&reservation("confirmed"));
        assert_eq!(line, "✅ \\#7 · Monday, 15 June 2026 at 19:30 · 4 guests · confirmed");
    }

    #[test]
    fn test_closed_hint_names_opening_hours() {
        let hint = verdict_hint(&Verdict::RestaurantClosed, &RestaurantConfig::default()).unwrap();
        assert_eq!(hint, "We take bookings from 10:00 until 22:00.");
        assert!(verdict_hint(&Verdict::Available { details: None }, &RestaurantConfig::default()).is_none());
    }

    #[test]
    fn test_unknown_status_marker() {
        assert!(format_reservation_line(&reservation("archived")).starts_with("❔"));
    }
}
