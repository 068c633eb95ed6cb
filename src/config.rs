use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveTime};
use std::env;
use std::str::FromStr;

use crate::reservation::RestaurantConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/restaurant.db";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 4;
const MAX_SLOT_DURATION_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    pub admin_ids: Vec<i64>,
    pub utc_offset_hours: i32,
    pub restaurant: RestaurantConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let http_port = parse_var("HTTP_PORT", 3000u16)?;
        let admin_ids = parse_admin_ids(&env::var("ADMIN_IDS").unwrap_or_default())?;
        let utc_offset_hours = utc_offset_hours_from_env()?;

        Ok(Config {
            telegram_bot_token: token,
            database_url: database_url_from_env(),
            http_port,
            admin_ids,
            utc_offset_hours,
            restaurant: restaurant_from_env()?,
        })
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// `DATABASE_URL`, falling back to the default when unset or blank.
pub fn database_url_from_env() -> String {
    match env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_DATABASE_URL.to_string(),
    }
}

/// `RESTAURANT_UTC_OFFSET_HOURS`, whole hours in `-12..=14`.
pub fn utc_offset_hours_from_env() -> Result<i32> {
    let hours = parse_var("RESTAURANT_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS)?;
    if !(-12..=14).contains(&hours) {
        return Err(anyhow!("Invalid RESTAURANT_UTC_OFFSET_HOURS"));
    }
    Ok(hours)
}

fn restaurant_from_env() -> Result<RestaurantConfig> {
    let defaults = RestaurantConfig::default();

    let opening_hour = parse_var("OPENING_HOUR", 10u32)?;
    let closing_hour = parse_var("CLOSING_HOUR", 22u32)?;
    let opening_time = NaiveTime::from_hms_opt(opening_hour, 0, 0)
        .ok_or_else(|| anyhow!("Invalid OPENING_HOUR"))?;
    let closing_time = NaiveTime::from_hms_opt(closing_hour, 0, 0)
        .ok_or_else(|| anyhow!("Invalid CLOSING_HOUR"))?;
    if opening_time >= closing_time {
        return Err(anyhow!("OPENING_HOUR must be earlier than CLOSING_HOUR"));
    }

    let slot_minutes = parse_var("SLOT_DURATION_MINUTES", defaults.slot_duration.num_minutes())?;
    if !(1..=MAX_SLOT_DURATION_MINUTES).contains(&slot_minutes) {
        return Err(anyhow!("Invalid SLOT_DURATION_MINUTES"));
    }
    let slot_duration =
        Duration::try_minutes(slot_minutes).ok_or_else(|| anyhow!("Invalid SLOT_DURATION_MINUTES"))?;

    let max_tables = parse_var("MAX_TABLES", defaults.max_tables)?;
    let total_seats = parse_var("TOTAL_SEATS", defaults.total_seats)?;
    if max_tables == 0 || total_seats == 0 {
        return Err(anyhow!("MAX_TABLES and TOTAL_SEATS must be positive"));
    }

    Ok(RestaurantConfig {
        opening_time,
        closing_time,
        slot_duration,
        max_tables,
        total_seats,
    })
}

/// Reads an optional variable, trimming whitespace before parsing.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {}", name)),
        _ => Ok(default),
    }
}

fn parse_admin_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse().map_err(|_| anyhow!("Invalid ADMIN_IDS entry '{}'", id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids() {
        assert_eq!(parse_admin_ids("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_admin_ids("1, 2 ,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_admin_ids("42,").unwrap(), vec![42]);
        assert!(parse_admin_ids("1,abc").is_err());
    }
}
