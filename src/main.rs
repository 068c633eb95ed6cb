//! # Restaurant Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database and the
//! reservation engine, starts background services, and runs the Telegram bot.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use restaurant_bot::bot::handlers::BotHandler;
use restaurant_bot::config::Config;
use restaurant_bot::database::connection::DatabaseManager;
use restaurant_bot::reservation::{ReservationEngine, SqliteReservationStore};
use restaurant_bot::services::health::HealthService;
use restaurant_bot::services::reminder::ReminderService;
use restaurant_bot::services::timezone::RestaurantClock;
use restaurant_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restaurant_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    info!("Starting Restaurant Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, UTC offset: {:+}h, {} tables / {} seats",
        config.database_url,
        config.http_port,
        config.utc_offset_hours,
        config.restaurant.max_tables,
        config.restaurant.total_seats
    );

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let clock = RestaurantClock::from_utc_offset_hours(config.utc_offset_hours)
        .ok_or_else(|| anyhow!("Invalid UTC offset {}", config.utc_offset_hours))?;
    let store = SqliteReservationStore::new(db_arc.pool.clone());
    let engine = Arc::new(ReservationEngine::new(store, config.restaurant.clone(), clock));

    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(db_arc.as_ref().clone(), engine, config.clone());
    info!("Telegram bot initialized successfully");

    let mut reminder_service = ReminderService::new(bot.clone(), db_arc.clone(), clock)
        .await
        .map_err(|e| anyhow!("Failed to create reminder service: {}", e))?;

    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    }

    let health_service = HealthService::new(db_arc.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);
    log_system_event("Bot started", Some(env!("CARGO_PKG_VERSION")));

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Either task finishing means shutdown
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }

    log_system_event("Bot stopped", None);
    Ok(())
}
