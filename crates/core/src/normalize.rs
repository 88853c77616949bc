//! Canonical value forms applied when a form is flattened for the wire.
//!
//! The detail endpoint returns the same canonical forms, so a submitted
//! record reloads byte-identical (uppercased passport, lowercased email,
//! E.164 mobile, ISO dates).

use crate::validation::field::parse_date_loose;

/// Default country calling code when a mobile number is entered locally.
const DEFAULT_COUNTRY_CODE: &str = "84";

/// Uppercase and strip everything outside `[A-Z0-9]`.
pub fn passport(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Trim and lowercase.
pub fn email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize to E.164.
///
/// Punctuation and spacing are stripped. A leading `+` or `00` keeps the
/// embedded country code; a leading `0` is replaced with the default
/// country code; a bare national number gets the default code prefixed.
pub fn mobile(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    if raw.trim_start().starts_with('+') {
        return format!("+{digits}");
    }
    if let Some(rest) = digits.strip_prefix("00") {
        return format!("+{rest}");
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return format!("+{DEFAULT_COUNTRY_CODE}{rest}");
    }
    if digits.starts_with(DEFAULT_COUNTRY_CODE) {
        return format!("+{digits}");
    }
    format!("+{DEFAULT_COUNTRY_CODE}{digits}")
}

/// Pad loose date input (`yyyy-mm`, `yyyy`) to ISO `yyyy-mm-dd`.
/// Unparsable input is passed through trimmed; validation flags it.
pub fn date(raw: &str) -> String {
    match parse_date_loose(raw) {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passport_uppercases_and_strips() {
        assert_eq!(passport(" c-123 4567 "), "C1234567");
        assert_eq!(passport("ab123456"), "AB123456");
    }

    #[test]
    fn email_lowercases() {
        assert_eq!(email(" Candidate@Example.EDU.VN "), "candidate@example.edu.vn");
    }

    #[test]
    fn mobile_local_number_gets_country_code() {
        assert_eq!(mobile("0912 345 678"), "+84912345678");
        assert_eq!(mobile("(0912) 345-678"), "+84912345678");
    }

    #[test]
    fn mobile_existing_prefix_is_kept() {
        assert_eq!(mobile("+84 912 345 678"), "+84912345678");
        assert_eq!(mobile("0084912345678"), "+84912345678");
        assert_eq!(mobile("84912345678"), "+84912345678");
    }

    #[test]
    fn mobile_blank_stays_blank() {
        assert_eq!(mobile("  "), "");
    }

    #[test]
    fn date_pads_loose_input() {
        assert_eq!(date("2024-06"), "2024-06-01");
        assert_eq!(date("2024-06-15"), "2024-06-15");
        assert_eq!(date("not a date"), "not a date");
    }
}
