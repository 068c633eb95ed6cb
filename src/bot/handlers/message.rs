use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use crate::bot::commands::{admin, booking, Command};
use crate::bot::handlers::{sender_id, BotHandler, HandlerResult};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    handler: BotHandler,
) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "🍽 Welcome to the restaurant booking bot!\n\n\
                 Check a time with /check DD.MM.YYYY HH:MM GUESTS\n\
                 Book a table with /book DD.MM.YYYY HH:MM GUESTS NAME PHONE\n\
                 See your bookings with /my\n\
                 Use /help to see all commands.",
            ).await?;
        }
        cmd => {
            let Some(user_id) = sender_id(&msg) else {
                tracing::warn!("Ignoring {:?} in chat {}: no personal sender", cmd, msg.chat.id.0);
                bot.send_message(
                    msg.chat.id,
                    "❌ Please send this command from your own account, not on behalf of a chat or channel.",
                ).await?;
                return Ok(());
            };
            user_command(bot, msg, cmd, user_id, &handler).await?;
        }
    }
    Ok(())
}

/// Commands that act on behalf of a specific Telegram user.
async fn user_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    user_id: i64,
    handler: &BotHandler,
) -> HandlerResult {
    match cmd {
        Command::Help | Command::Start => {}
        Command::Check { date, time, guests } => {
            booking::handle_check(bot, msg, user_id, date, time, guests, handler).await?;
        }
        Command::Book { date, time, guests, name, phone } => {
            booking::handle_book(bot, msg, user_id, date, time, guests, name, phone, handler).await?;
        }
        Command::My => {
            booking::handle_my(bot, msg, user_id, handler).await?;
        }
        Command::Confirm { reservation_id } => {
            admin::handle_confirm(bot, msg, user_id, reservation_id, handler).await?;
        }
        Command::Cancel { reservation_id } => {
            admin::handle_cancel(bot, msg, user_id, reservation_id, handler).await?;
        }
        Command::Today => {
            admin::handle_today(bot, msg, user_id, handler).await?;
        }
    }
    Ok(())
}
