use chrono::NaiveTime;
use restaurant_bot::config::{database_url_from_env, utc_offset_hours_from_env, Config};
use std::env;
use std::sync::Mutex;

// Config tests share process environment, so they run one at a time
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "TELEGRAM_BOT_TOKEN",
    "DATABASE_URL",
    "HTTP_PORT",
    "ADMIN_IDS",
    "RESTAURANT_UTC_OFFSET_HOURS",
    "OPENING_HOUR",
    "CLOSING_HOUR",
    "SLOT_DURATION_MINUTES",
    "MAX_TABLES",
    "TOTAL_SEATS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("ADMIN_IDS", "111, 222");
    env::set_var("RESTAURANT_UTC_OFFSET_HOURS", "3");
    env::set_var("OPENING_HOUR", "12");
    env::set_var("CLOSING_HOUR", "23");
    env::set_var("SLOT_DURATION_MINUTES", "90");
    env::set_var("MAX_TABLES", "6");
    env::set_var("TOTAL_SEATS", "24");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.admin_ids, vec![111, 222]);
    assert_eq!(config.utc_offset_hours, 3);
    assert_eq!(config.restaurant.opening_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    assert_eq!(config.restaurant.closing_time, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
    assert_eq!(config.restaurant.slot_duration.num_minutes(), 90);
    assert_eq!(config.restaurant.max_tables, 6);
    assert_eq!(config.restaurant.total_seats, 24);
    assert!(config.is_admin(222));
    assert!(!config.is_admin(333));

    clear_env();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.database_url, "sqlite:./data/restaurant.db");
    assert_eq!(config.http_port, 3000);
    assert!(config.admin_ids.is_empty());
    assert_eq!(config.utc_offset_hours, 4);
    assert_eq!(config.restaurant.opening_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert_eq!(config.restaurant.closing_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
    assert_eq!(config.restaurant.slot_duration.num_minutes(), 120);
    assert_eq!(config.restaurant.max_tables, 10);
    assert_eq!(config.restaurant.total_seats, 40);

    clear_env();
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
}

#[test]
fn test_config_blank_token_rejected() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    env::set_var("TELEGRAM_BOT_TOKEN", "   ");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_invalid_numbers_name_the_variable() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "token");

    for (var, value) in [
        ("HTTP_PORT", "not_a_number"),
        ("HTTP_PORT", "70000"),
        ("MAX_TABLES", "-1"),
        ("OPENING_HOUR", "25"),
        ("RESTAURANT_UTC_OFFSET_HOURS", "20"),
        ("SLOT_DURATION_MINUTES", "1000000000000000"),
        ("SLOT_DURATION_MINUTES", "1441"),
        ("SLOT_DURATION_MINUTES", "-30"),
    ] {
        env::set_var(var, value);
        let error_msg = Config::from_env().unwrap_err().to_string();
        assert!(error_msg.contains(var), "{var}={value} gave '{error_msg}'");
        env::remove_var(var);
    }

    clear_env();
}

#[test]
fn test_config_rejects_inverted_hours_and_zero_capacity() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "token");

    env::set_var("OPENING_HOUR", "22");
    env::set_var("CLOSING_HOUR", "10");
    assert!(Config::from_env().is_err());
    env::remove_var("OPENING_HOUR");
    env::remove_var("CLOSING_HOUR");

    env::set_var("TOTAL_SEATS", "0");
    assert!(Config::from_env().is_err());
    env::remove_var("TOTAL_SEATS");

    env::set_var("SLOT_DURATION_MINUTES", "0");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_config_accepts_full_day_slot() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "token");
    env::set_var("SLOT_DURATION_MINUTES", "1440");

    let config = Config::from_env().unwrap();
    assert_eq!(config.restaurant.slot_duration.num_hours(), 24);

    clear_env();
}

#[test]
fn test_config_invalid_admin_ids() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "token");
    env::set_var("ADMIN_IDS", "123,admin");

    let error_msg = Config::from_env().unwrap_err().to_string();
    assert!(error_msg.contains("ADMIN_IDS"));

    clear_env();
}

#[test]
fn test_config_whitespace_is_trimmed() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();
    env::set_var("TELEGRAM_BOT_TOKEN", "token");
    env::set_var("HTTP_PORT", " 9090 ");
    env::set_var("DATABASE_URL", "");

    let config = Config::from_env().unwrap();
    assert_eq!(config.http_port, 9090);
    assert_eq!(config.database_url, "sqlite:./data/restaurant.db");
    assert_eq!(database_url_from_env(), "sqlite:./data/restaurant.db");

    clear_env();
}

#[test]
fn test_utc_offset_without_bot_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_env();

    // The migrate tool reads the offset without a full bot config
    assert_eq!(utc_offset_hours_from_env().unwrap(), 4);

    env::set_var("RESTAURANT_UTC_OFFSET_HOURS", "-5");
    assert_eq!(utc_offset_hours_from_env().unwrap(), -5);

    env::set_var("RESTAURANT_UTC_OFFSET_HOURS", "15");
    let error_msg = utc_offset_hours_from_env().unwrap_err().to_string();
    assert!(error_msg.contains("RESTAURANT_UTC_OFFSET_HOURS"));

    clear_env();
}
