//! # Restaurant Bot
//!
//! A Telegram bot for booking restaurant tables.
//!
//! ## Features
//! - Availability checks against table count and seat capacity
//! - Atomic booking that cannot oversell a time slot under concurrency
//! - Staff confirmation and cancellation with customer notifications
//! - Reminders 24 hours and 3 hours before a confirmed reservation
//! - Persistent storage with SQLite

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Availability rules and the transactional booking engine
pub mod reservation;
/// Background services, health checks and the restaurant clock
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
