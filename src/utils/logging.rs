use tracing::{debug, error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_START: /{} by user {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_START: /{} by user {} in chat {}", command, user_id, chat_id),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_SUCCESS: /{} by user {} in chat {} - {}", command, user_id, chat_id, d),
        None => info!("CMD_SUCCESS: /{} by user {} in chat {}", command, user_id, chat_id),
    }
}

pub fn log_command_error(command: &str, user_id: i64, chat_id: i64, error: &str) {
    error!("CMD_ERROR: /{} by user {} in chat {} - {}", command, user_id, chat_id, error);
}

pub fn log_validation_error(command: &str, field: &str, value: &str, error: &str, user_id: i64) {
    warn!(
        "VALIDATION_ERROR: /{} field '{}' value '{}' invalid: {} - user {}",
        command, field, value, error, user_id
    );
}

pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs the outcome of a booking request as seen by the chat layer.
pub fn log_booking_outcome(user_id: i64, slot: &str, guests: i64, outcome: &str) {
    info!("BOOKING: user {} requested {} for {} guests - {}", user_id, slot, guests, outcome);
}

pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
