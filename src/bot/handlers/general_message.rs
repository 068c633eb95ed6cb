use teloxide::prelude::*;
use crate::utils::feedback::CommandFeedback;

/// Usage hint for a command whose arguments did not parse, if it takes any.
pub fn usage_hint(command: &str) -> Option<&'static str> {
    let name = command.trim_start_matches('/');
    let name = name.split('@').next().unwrap_or(name).to_lowercase();
    match name.as_str() {
        "check" => Some("Usage: /check DD.MM.YYYY HH:MM GUESTS\nExample: /check 24.12.2026 19:00 4"),
        "book" => Some(
            "Usage: /book DD.MM.YYYY HH:MM GUESTS NAME PHONE\nExample: /book 24.12.2026 19:00 4 Anna Smith +79991234567",
        ),
        "confirm" => Some("Usage: /confirm RESERVATION_ID"),
        "cancel" => Some("Usage: /cancel RESERVATION_ID"),
        _ => None,
    }
}

pub async fn handle_general_message(
    bot: Bot,
    msg: Message,
) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            let command = text.split_whitespace().next().unwrap_or(text);
            match usage_hint(command) {
                Some(hint) => {
                    feedback.validation_error(&format!("Invalid arguments for {command}"), hint).await?;
                }
                None => {
                    let suggestion = "Use /help to see all available commands.";
                    feedback.validation_error(&format!("Unknown command: {command}"), suggestion).await?;
                }
            }
        } else {
            let lower = text.to_lowercase();
            if lower.contains("book") || lower.contains("table") || lower.contains("reserv") {
                feedback
                    .info("Looking for a table? Check a time with /check 24.12.2026 19:00 4, then book it with /book")
                    .await?;
            }
            // Other chatter gets no reply.
        }
    }

    Ok(())
}
