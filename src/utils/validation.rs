use anyhow::{anyhow, Result};

use crate::reservation::policy::MAX_GUESTS_PER_RESERVATION;

/// Validates a customer display name and returns it trimmed.
pub fn validate_customer_name(name: &str) -> Result<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Name cannot be empty"));
    }

    if name.chars().count() < 2 {
        return Err(anyhow!("Name must be at least 2 characters long"));
    }

    if name.chars().count() > 100 {
        return Err(anyhow!("Name cannot be longer than 100 characters"));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Name cannot contain line breaks"));
    }

    Ok(name.to_string())
}

/// Validates a phone number and returns it trimmed.
///
/// Accepts an optional leading `+` followed by digits, spaces, dashes and
/// parentheses, with at least 5 digits in total.
pub fn validate_customer_phone(phone: &str) -> Result<String> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(anyhow!("Phone number cannot be empty"));
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return Err(anyhow!("Phone number can only contain digits, spaces, dashes and parentheses"));
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 5 {
        return Err(anyhow!("Phone number must contain at least 5 digits"));
    }

    if digits > 15 {
        return Err(anyhow!("Phone number cannot contain more than 15 digits"));
    }

    Ok(phone.to_string())
}

/// Parses the guest count typed by a customer.
///
/// Only the format is checked here; the range is enforced by the
/// availability check so that it reports `invalid_guests_count`.
pub fn parse_guests_count(input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| anyhow!("Guests must be a whole number from 1 to {}", MAX_GUESTS_PER_RESERVATION))
}

pub fn parse_reservation_id(input: &str) -> Result<i64> {
    let input = input.trim().trim_start_matches('#');

    if input.is_empty() {
        return Err(anyhow!("Reservation ID cannot be empty"));
    }

    match input.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(anyhow!("Reservation ID must be a positive number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(validate_customer_name("  Anna  ").unwrap(), "Anna");
    }

    #[test]
    fn test_phone_digit_bounds() {
        assert!(validate_customer_phone("1234").is_err());
        assert!(validate_customer_phone("12345").is_ok());
        assert!(validate_customer_phone("+1234567890123456").is_err());
    }

    #[test]
    fn test_reservation_id_accepts_hash_prefix() {
        assert_eq!(parse_reservation_id("#42").unwrap(), 42);
    }
}
