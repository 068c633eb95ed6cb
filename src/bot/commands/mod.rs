pub mod admin;
pub mod booking;

use teloxide::utils::command::{BotCommands, ParseError};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Restaurant reservation commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Check availability: /check DD.MM.YYYY HH:MM GUESTS", parse_with = "split")]
    Check { date: String, time: String, guests: String },
    #[command(
        description = "Book a table: /book DD.MM.YYYY HH:MM GUESTS NAME PHONE",
        parse_with = parse_book_args
    )]
    Book {
        date: String,
        time: String,
        guests: String,
        name: String,
        phone: String,
    },
    #[command(description = "Show your reservations")]
    My,
    #[command(description = "Confirm a reservation (staff only)")]
    Confirm { reservation_id: String },
    #[command(description = "Cancel a reservation (staff only)")]
    Cancel { reservation_id: String },
    #[command(description = "Show today's remaining reservations (staff only)")]
    Today,
}

/// Splits `/book` arguments. The name may contain spaces, so it takes every
/// token between the guest count and the trailing phone number.
pub fn parse_book_args(input: String) -> Result<(String, String, String, String, String), ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    if tokens.len() < 5 {
        return Err(ParseError::TooFewArguments {
            expected: 5,
            found: tokens.len(),
            message: "Usage: /book DD.MM.YYYY HH:MM GUESTS NAME PHONE".to_string(),
        });
    }

    let last = tokens.len() - 1;
    Ok((
        tokens[0].to_string(),
        tokens[1].to_string(),
        tokens[2].to_string(),
        tokens[3..last].join(" "),
        tokens[last].to_string(),
    ))
}
