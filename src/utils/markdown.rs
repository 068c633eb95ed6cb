//! Escaping for Telegram MarkdownV2 messages.

/// Characters with special meaning in MarkdownV2.
const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escapes every MarkdownV2 reserved character with a backslash so the text
/// renders literally.
///
/// ```
/// use restaurant_bot::utils::markdown::escape_markdown;
///
/// assert_eq!(escape_markdown("Table #4 (window)"), "Table \\#4 \\(window\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reservation_text() {
        assert_eq!(escape_markdown("Reservation #12"), "Reservation \\#12");
        assert_eq!(escape_markdown("15.06.2026"), "15\\.06\\.2026");
        assert_eq!(escape_markdown("+7 (999) 123-45-67"), "\\+7 \\(999\\) 123\\-45\\-67");
    }

    #[test]
    fn test_escape_all_reserved() {
        let input = "_*[]()~`>#+-=|{}.!";
        let expected = "\\_\\*\\[\\]\\(\\)\\~\\`\\>\\#\\+\\-\\=\\|\\{\\}\\.\\!";
        assert_eq!(escape_markdown(input), expected);
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escape_markdown(""), "");
        assert_eq!(escape_markdown("Table for 4 at 19:30"), "Table for 4 at 19:30");
        assert_eq!(escape_markdown("Café & Bar"), "Café & Bar");
    }
}
