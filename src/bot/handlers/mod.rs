pub mod general_message;
pub mod message;

use std::sync::Arc;
use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::reservation::{ReservationEngine, SqliteReservationStore};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// The engine as wired in production.
pub type SharedEngine = Arc<ReservationEngine<SqliteReservationStore>>;

/// The Telegram user a message was sent by.
///
/// `None` for channel posts and for messages sent on behalf of a chat, where
/// there is no personal account to attach a reservation or permission to.
pub fn sender_id(msg: &Message) -> Option<i64> {
    if msg.sender_chat().is_some() {
        return None;
    }
    msg.from().map(|user| user.id.0 as i64)
}

/// Everything a command handler needs, cloned into each update.
#[derive(Clone)]
pub struct BotHandler {
    pub db: DatabaseManager,
    pub engine: SharedEngine,
    pub config: Arc<Config>,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, engine: SharedEngine, config: Arc<Config>) -> Self {
        Self { db, engine, config }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let commands = self.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(move |bot, msg, cmd| {
                        let handler = commands.clone();
                        async move { message::command_handler(bot, msg, cmd, handler).await }
                    }),
            )
            .branch(Update::filter_message().endpoint(|bot: Bot, msg: Message| async move {
                general_message::handle_general_message(bot, msg).await?;
                Ok::<(), HandlerError>(())
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_sender_id_from_private_message() {
        let msg = message(serde_json::json!({
            "message_id": 1,
            "date": 1_781_000_000,
            "from": {"id": 250_918_540, "is_bot": false, "first_name": "Anna"},
            "chat": {"id": 250_918_540, "first_name": "Anna", "type": "private"},
            "text": "/my"
        }));
        assert_eq!(sender_id(&msg), Some(250_918_540));
    }

    #[test]
    fn test_channel_post_has_no_sender() {
        let msg = message(serde_json::json!({
            "message_id": 2,
            "date": 1_781_000_000,
            "sender_chat": {"id": -1_001_234_567_890_i64, "title": "News", "type": "channel"},
            "chat": {"id": -1_001_234_567_890_i64, "title": "News", "type": "channel"},
            "text": "/book 24.12.2026 19:00 2 Anna 12345"
        }));
        assert_eq!(sender_id(&msg), None);
    }

    #[test]
    fn test_message_on_behalf_of_group_has_no_sender() {
        let msg = message(serde_json::json!({
            "message_id": 3,
            "date": 1_781_000_000,
            "from": {"id": 1_087_968_824, "is_bot": true, "first_name": "Group", "username": "GroupAnonymousBot"},
            "sender_chat": {"id": -1_009_876_543_210_i64, "title": "Staff", "type": "supergroup"},
            "chat": {"id": -1_009_876_543_210_i64, "title": "Staff", "type": "supergroup"},
            "text": "/today"
        }));
        assert_eq!(sender_id(&msg), None);
    }
}
