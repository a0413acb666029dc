//! Header card parsing and building.
//!
//! # Card Layout
//!
//! | Columns | Field           | Description                          |
//! |---------|-----------------|--------------------------------------|
//! | 1-8     | keyword         | Left-justified, blank padded         |
//! | 9-10    | value indicator | `"= "` when the card carries a value |
//! | 11-80   | value / comment | Value, then optional `/ comment`     |

use std::fmt;

/// Card length in bytes.
pub const CARD_LEN: usize = 80;

/// Keyword field width.
pub const KEYWORD_LEN: usize = 8;

const VALUE_INDICATOR: &[u8] = b"= ";

/// A parsed header value.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// `T` or `F`.
    Logical(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal (`E` or `D` exponent).
    Real(f64),
    /// Quoted string with trailing blanks removed.
    Text(String),
    /// Anything else (complex numbers, malformed literals).
    Other(String),
}

impl HeaderValue {
    /// Integer view of the value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Real view of the value; integers widen.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// String view of the value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical(true) => write!(f, "T"),
            Self::Logical(false) => write!(f, "F"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value:E}"),
            Self::Text(value) => write!(f, "'{value}'"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// A single 80-byte header card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// Keyword, upper case with padding removed.
    pub keyword: String,
    /// Value when the card has a value indicator and a non-empty value field.
    pub value: Option<HeaderValue>,
    /// Comment text following `/`, if any.
    pub comment: Option<String>,
}

impl Card {
    /// Whether this is the `END` card.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.keyword == "END"
    }
}

/// Parse one 80-byte card.
///
/// Cards that are not exactly [`CARD_LEN`] bytes are parsed as far as they go.
#[must_use]
pub fn parse_card(record: &[u8]) -> Card {
    let keyword_end = record.len().min(KEYWORD_LEN);
    let keyword = String::from_utf8_lossy(&record[..keyword_end])
        .trim()
        .to_ascii_uppercase();

    let has_value = record.len() > KEYWORD_LEN + 1
        && &record[KEYWORD_LEN..KEYWORD_LEN + 2] == VALUE_INDICATOR
        && keyword != "COMMENT"
        && keyword != "HISTORY";
    if !has_value {
        return Card {
            keyword,
            value: None,
            comment: None,
        };
    }

    let field = String::from_utf8_lossy(&record[KEYWORD_LEN + 2..]);
    let (value, comment) = parse_value_field(&field);
    Card {
        keyword,
        value,
        comment,
    }
}

/// Split a value field into the value and its trailing comment.
fn parse_value_field(field: &str) -> (Option<HeaderValue>, Option<String>) {
    let trimmed = field.trim_start();
    if let Some(rest) = trimmed.strip_prefix('\'') {
        let (text, remainder) = parse_quoted(rest);
        return (Some(HeaderValue::Text(text)), parse_comment(remainder));
    }

    let (raw, comment) = match trimmed.split_once('/') {
        Some((raw, comment)) => (raw.trim(), Some(comment.trim().to_string())),
        None => (trimmed.trim(), None),
    };
    if raw.is_empty() {
        return (None, comment);
    }
    (Some(parse_literal(raw)), comment)
}

/// Read a quoted string body; `''` is an escaped quote.
fn parse_quoted(body: &str) -> (String, &str) {
    let mut text = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\'' {
            if matches!(chars.peek(), Some((_, '\''))) {
                text.push('\'');
                chars.next();
                continue;
            }
            let trimmed_len = text.trim_end().len();
            text.truncate(trimmed_len);
            return (text, &body[idx + 1..]);
        }
        text.push(ch);
    }
    // Unterminated string: keep what we have.
    let trimmed_len = text.trim_end().len();
    text.truncate(trimmed_len);
    (text, "")
}

fn parse_comment(remainder: &str) -> Option<String> {
    remainder
        .split_once('/')
        .map(|(_, comment)| comment.trim().to_string())
}

fn parse_literal(raw: &str) -> HeaderValue {
    match raw {
        "T" => return HeaderValue::Logical(true),
        "F" => return HeaderValue::Logical(false),
        _ => {}
    }
    if let Ok(value) = raw.parse::<i64>() {
        return HeaderValue::Integer(value);
    }
    let normalized = raw.replace(['D', 'd'], "E");
    if let Ok(value) = normalized.parse::<f64>() {
        return HeaderValue::Real(value);
    }
    HeaderValue::Other(raw.to_string())
}

/// Build a card with a value in fixed format.
///
/// Logical and numeric values are right-justified to column 30; strings start
/// at column 11 and are padded to at least eight characters inside the quotes.
#[must_use]
pub fn build_card(keyword: &str, value: &HeaderValue, comment: Option<&str>) -> [u8; CARD_LEN] {
    let rendered = match value {
        HeaderValue::Logical(_) | HeaderValue::Integer(_) | HeaderValue::Other(_) => {
            format!("{:>20}", value.to_string())
        }
        HeaderValue::Real(number) => format!("{number:>20.12E}"),
        HeaderValue::Text(text) => format!("'{:<8}'", text.replace('\'', "''")),
    };
    let mut line = format!("{:<8}= {rendered}", truncate_keyword(keyword));
    if let Some(comment) = comment {
        line.push_str(" / ");
        line.push_str(comment);
    }
    pad_card(&line)
}

/// Build a card without a value (`END`, `COMMENT`, blank).
#[must_use]
pub fn build_keyword_card(keyword: &str, text: &str) -> [u8; CARD_LEN] {
    let line = format!("{:<8}{text}", truncate_keyword(keyword));
    pad_card(&line)
}

fn truncate_keyword(keyword: &str) -> String {
    keyword
        .chars()
        .take(KEYWORD_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}

fn pad_card(line: &str) -> [u8; CARD_LEN] {
    let mut card = [b' '; CARD_LEN];
    let bytes = line.as_bytes();
    let len = bytes.len().min(CARD_LEN);
    card[..len].copy_from_slice(&bytes[..len]);
    card
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(text: &str) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(CARD_LEN, b' ');
        bytes
    }

    #[test]
    fn test_parse_integer_card() {
        let parsed = parse_card(&card("NAXIS1  =                 4096 / length of axis"));
        assert_eq!(parsed.keyword, "NAXIS1");
        assert_eq!(parsed.value, Some(HeaderValue::Integer(4096)));
        assert_eq!(parsed.comment.as_deref(), Some("length of axis"));
    }

    #[test]
    fn test_parse_string_with_escaped_quote() {
        let parsed = parse_card(&card("EXTNAME = 'O''HARA  '           / odd name"));
        assert_eq!(parsed.value, Some(HeaderValue::Text("O'HARA".to_string())));
        assert_eq!(parsed.comment.as_deref(), Some("odd name"));
    }

    #[test]
    fn test_parse_slash_inside_string() {
        let parsed = parse_card(&card("OBJECT  = 'a/b'"));
        assert_eq!(parsed.value, Some(HeaderValue::Text("a/b".to_string())));
        assert_eq!(parsed.comment, None);
    }

    #[test]
    fn test_parse_real_with_d_exponent() {
        let parsed = parse_card(&card("BSCALE  =               1.5D+2"));
        assert_eq!(parsed.value, Some(HeaderValue::Real(150.0)));
    }

    #[test]
    fn test_parse_logical_and_end() {
        assert_eq!(
            parse_card(&card("SIMPLE  =                    T")).value,
            Some(HeaderValue::Logical(true))
        );
        assert!(parse_card(&card("END")).is_end());
    }

    #[test]
    fn test_comment_cards_have_no_value() {
        let parsed = parse_card(&card("COMMENT = not a value"));
        assert_eq!(parsed.keyword, "COMMENT");
        assert_eq!(parsed.value, None);
    }

    #[test]
    fn test_build_card_layout() {
        let built = build_card("BITPIX", &HeaderValue::Integer(-64), None);
        assert_eq!(&built[..10], b"BITPIX  = ");
        assert_eq!(&built[28..30], b"64");
        assert_eq!(parse_card(&built).value, Some(HeaderValue::Integer(-64)));

        let text = build_card("EXTNAME", &HeaderValue::Text("ERR".to_string()), None);
        assert_eq!(&text[10..20], b"'ERR     '");
    }

    #[test]
    fn test_build_real_card_parses_back() {
        let built = build_card("BZERO", &HeaderValue::Real(32768.0), None);
        assert_eq!(parse_card(&built).value, Some(HeaderValue::Real(32768.0)));
    }
}
