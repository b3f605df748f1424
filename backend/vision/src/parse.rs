//! Parsing of free-text vision model replies into meter readings.
//!
//! Model output is unreliable text, not a typed API: the parser tolerates
//! locale decimal separators and distinguishes the agreed "could not read"
//! marker from a genuine parse failure.

/// Classification of one model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyParse {
    /// A usable numeric reading.
    Numeric(f64),
    /// The model explicitly reported an unreadable meter.
    Unreadable,
    /// Text that is neither the marker nor a number.
    Invalid,
}

/// Parse a trimmed model reply. Accepts `.` or `,` as the decimal separator
/// ("87.18" and "87,18" both yield 87.18). `marker` is the literal string
/// the prompt instructs the model to answer with when it cannot read.
pub fn parse_reply(text: &str, marker: &str) -> ReplyParse {
    let text = text.trim();
    if text == marker {
        return ReplyParse::Unreadable;
    }
    match text.replace(',', ".").parse::<f64>() {
        Ok(value) => ReplyParse::Numeric(value),
        Err(_) => ReplyParse::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dot_separator() {
        assert_eq!(parse_reply("87.18", "FEHLER"), ReplyParse::Numeric(87.18));
    }

    #[test]
    fn accepts_comma_separator() {
        assert_eq!(parse_reply("87,18", "FEHLER"), ReplyParse::Numeric(87.18));
    }

    #[test]
    fn accepts_plain_integer() {
        assert_eq!(parse_reply("87", "FEHLER"), ReplyParse::Numeric(87.0));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(parse_reply("  87.18\n", "FEHLER"), ReplyParse::Numeric(87.18));
    }

    #[test]
    fn marker_is_unreadable_not_invalid() {
        assert_eq!(parse_reply("FEHLER", "FEHLER"), ReplyParse::Unreadable);
        assert_eq!(parse_reply(" FEHLER ", "FEHLER"), ReplyParse::Unreadable);
    }

    #[test]
    fn prose_reply_is_invalid() {
        assert_eq!(
            parse_reply("Der Zählerstand ist 87.18", "FEHLER"),
            ReplyParse::Invalid
        );
    }

    #[test]
    fn empty_reply_is_invalid() {
        assert_eq!(parse_reply("", "FEHLER"), ReplyParse::Invalid);
    }
}
