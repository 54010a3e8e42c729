use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

static AMOUNT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d[\d.,\x{00A0}\x{202F} ]*\d|\d")
        .expect("Invalid amount regex")
});

static CURRENCY_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(EUR|USD|GBP|CHF|JPY|CAD|AUD|SEK|NOK|DKK|PLN|CZK)\b")
        .expect("Invalid currency regex")
});

const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("US$", "USD"),
    ("$", "USD"),
    ("CHF", "CHF"),
    ("zł", "PLN"),
    ("Kč", "CZK"),
];

/// Parse the first amount in a price text, tolerating both "1.234,56" and
/// "1,234.56" conventions.
pub fn parse_price_amount(price_text: &str) -> Option<Decimal> {
    let raw = AMOUNT_REGEX.find(price_text)?.as_str();
    let compact: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    let decimal_separator = match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(index), None) | (None, Some(index)) => {
            let separator = compact[index..].chars().next()?;
            let occurrences = compact.matches(separator).count();
            let fraction_digits = compact.len() - index - 1;
            // A lone separator followed by exactly three digits is a
            // thousands separator ("1.299" is 1299).
            if occurrences == 1 && fraction_digits != 3 {
                Some(separator)
            } else {
                None
            }
        }
        (None, None) => None,
    };

    let normalized: String = compact
        .chars()
        .filter_map(|c| {
            if c.is_ascii_digit() {
                Some(c)
            } else if Some(c) == decimal_separator {
                Some('.')
            } else {
                None
            }
        })
        .collect();

    Decimal::from_str(&normalized).ok()
}

/// Detect an ISO currency code from a code or symbol in the text.
pub fn detect_currency(price_text: &str) -> Option<String> {
    if let Some(code) = CURRENCY_CODE_REGEX.find(price_text) {
        return Some(code.as_str().to_string());
    }

    CURRENCY_SYMBOLS
        .iter()
        .find(|(symbol, _)| price_text.contains(symbol))
        .map(|(_, code)| code.to_string())
}

/// Normalize a currency value found in structured data ("eur", "€").
pub fn normalize_currency(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(trimmed.to_ascii_uppercase());
    }
    detect_currency(trimmed)
}
