pub mod health;
pub mod reminder;
pub mod timezone;
