use anyhow::{Result, anyhow};
use restaurant_bot::config::{database_url_from_env, utc_offset_hours_from_env};
use restaurant_bot::database::connection::DatabaseManager;
use restaurant_bot::services::reminder::{archive_old_reservations, ARCHIVE_AFTER_DAYS};
use restaurant_bot::services::timezone::RestaurantClock;
use std::env;
use std::io;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");
    
    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "archive" => {
            let days = match args.get(2) {
                Some(raw) => raw
                    .parse::<i64>()
                    .map_err(|_| anyhow!("Invalid number of days: {raw}"))?,
                None => ARCHIVE_AFTER_DAYS,
            };
            archive_reservations(days).await
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Restaurant Bot - Database Migration Tool");
    println!("==========================================");
    
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();
    
    println!("📊 Database URL: {}", mask_url(&database_url));
    
    // Ensure data directory exists for SQLite
    if database_url.starts_with("sqlite:") {
        let db_path = database_url.strip_prefix("sqlite:").unwrap_or(&database_url);
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.exists() {
                println!("📁 Creating directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    
    println!("🚀 Running database migrations...");
    
    let db_manager = DatabaseManager::new(&database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;
    
    match db_manager.run_migrations().await {
        Ok(_) => {
            println!("✅ Migrations completed successfully!");
            println!("\n🍽  Reservations and reminders tables are ready!");
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }
    
    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");
    
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();
    
    println!("📊 Database URL: {}", mask_url(&database_url));
    
    let db_manager = DatabaseManager::new(&database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;
    
    match check_tables(&db_manager).await {
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Found tables:");
            for table in &tables {
                println!("  • {table}");
            }
            if tables.iter().any(|t| t == "reservations") {
                match db_manager.active_reservation_count().await {
                    Ok(count) => println!("🍽  Active reservations: {count}"),
                    Err(e) => println!("⚠️  Could not count reservations: {e}"),
                }
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }
    
    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL data in the database!");
    println!("🤔 Are you sure you want to continue? (yes/no)");
    
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    
    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }
    
    dotenvy::dotenv().ok();
    let database_url = database_url_from_env();
    
    if database_url.starts_with("sqlite:") {
        let db_path = database_url.strip_prefix("sqlite:").unwrap_or(&database_url);
        if Path::new(db_path).exists() {
            std::fs::remove_file(db_path)?;
            println!("🗑️  Deleted database file: {db_path}");
        }
    } else {
        return Err(anyhow!("Reset is only supported for SQLite databases"));
    }
    
    println!("🔄 Recreating database schema...");
    run_migrations().await?;
    
    println!("✅ Database reset completed!");
    
    Ok(())
}

async fn archive_reservations(days: i64) -> Result<()> {
    if days < 0 {
        return Err(anyhow!("Number of days cannot be negative"));
    }

    dotenvy::dotenv().ok();
    let offset_hours = utc_offset_hours_from_env()?;
    let clock = RestaurantClock::from_utc_offset_hours(offset_hours)
        .ok_or_else(|| anyhow!("Invalid RESTAURANT_UTC_OFFSET_HOURS"))?;

    let database_url = database_url_from_env();
    let db_manager = DatabaseManager::new(&database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    let archived = archive_old_reservations(&db_manager, clock, days)
        .await
        .map_err(|e| anyhow!("Failed to archive reservations: {}", e))?;
    println!(
        "🗄  Deleted {archived} completed/cancelled reservations older than {days} days (restaurant date {})",
        clock.now().date()
    );

    Ok(())
}

async fn check_tables(db_manager: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&db_manager.pool)
    .await?;

    Ok(tables)
}

fn mask_url(url: &str) -> String {
    // Only the file name is shown
    if url.starts_with("sqlite:") {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        if let Some(filename) = Path::new(path).file_name() {
            format!("sqlite:.../{}", filename.to_string_lossy())
        } else {
            url.to_string()
        }
    } else {
        url.to_string()
    }
}

fn print_help() {
    println!("🍽  Restaurant Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection and schema");
    println!("    reset          Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    archive [DAYS] Delete finished reservations older than DAYS (default 30)");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: sqlite:./data/restaurant.db)");
    println!("    RESTAURANT_UTC_OFFSET_HOURS  Local offset used for archive cutoffs (default: 4)");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                    # Run migrations");
    println!("    migrate check              # Check database status");
    println!("    migrate reset              # Reset database (careful!)");
    println!("    migrate archive 90         # Drop finished bookings older than 90 days");
    println!();
}
