//! Field-level validators -- pure functions over raw string values.
//!
//! Each returns `None` when the value passes and a tagged [`Failure`]
//! otherwise. Blank input passes everything except [`required`]; pair a
//! validator with `required` when the field is mandatory. Reference dates
//! are injected so the calendar-sensitive validators stay deterministic
//! under test.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::rules::{Failure, Rule};

/// Cleaned passport/ID length bounds.
pub const PASSPORT_MIN_LEN: usize = 6;
pub const PASSPORT_MAX_LEN: usize = 12;

/// Minimum length of the domain part of an email address.
pub const EMAIL_MIN_DOMAIN_LEN: usize = 5;

/// True when the value is empty after trimming.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Parse a form date. Accepts `yyyy-mm-dd`, `yyyy-mm`, and bare `yyyy`.
pub fn parse_date_loose(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(v, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{v}-01"), "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{v}-01-01"), "%Y-%m-%d") {
        return Some(d);
    }
    None
}

/// Blank (after trim) fails.
pub fn required(value: &str) -> Option<Failure> {
    if is_blank(value) {
        Some(Failure::new(Rule::Required, "This field is required"))
    } else {
        None
    }
}

/// Whole-year age at `today`; the birthday must have passed for the year
/// to count.
pub fn min_age(value: &str, min_years: i32, today: NaiveDate) -> Option<Failure> {
    if is_blank(value) {
        return None;
    }
    let Some(dob) = parse_date_loose(value) else {
        return Some(Failure::new(Rule::InvalidDate, "Not a valid date"));
    };
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    if age < min_years {
        Some(Failure::new(
            Rule::MinAge,
            format!("Must be at least {min_years} years old"),
        ))
    } else {
        None
    }
}

/// Strictly after `reference` fails; compared at day granularity.
pub fn max_date(value: &str, reference: NaiveDate) -> Option<Failure> {
    if is_blank(value) {
        return None;
    }
    let Some(date) = parse_date_loose(value) else {
        return Some(Failure::new(Rule::InvalidDate, "Not a valid date"));
    };
    if date > reference {
        Some(Failure::new(
            Rule::MaxDate,
            format!("Date must not be after {reference}"),
        ))
    } else {
        None
    }
}

/// Calendar year embedded in the date below `min` fails; unparsable
/// non-blank input fails with the distinct `InvalidDate` tag.
pub fn min_year(value: &str, min: i32) -> Option<Failure> {
    if is_blank(value) {
        return None;
    }
    let Some(date) = parse_date_loose(value) else {
        return Some(Failure::new(Rule::InvalidDate, "Not a valid date"));
    };
    if date.year() < min {
        Some(Failure::new(
            Rule::MinYear,
            format!("Year must be {min} or later"),
        ))
    } else {
        None
    }
}

/// Float parse plus closed-range check. Non-numeric input gets the
/// distinct `InvalidScore` tag.
pub fn score_range(value: &str, min: f64, max: f64) -> Option<Failure> {
    if is_blank(value) {
        return None;
    }
    let Ok(score) = value.trim().parse::<f64>() else {
        return Some(Failure::new(Rule::InvalidScore, "Not a valid number"));
    };
    if score < min || score > max {
        Some(Failure::new(
            Rule::ScoreRange,
            format!("Score must be between {min} and {max}"),
        ))
    } else {
        None
    }
}

/// Strip everything outside `[A-Z0-9]` (after uppercasing), then require
/// a cleaned length of 6..=12. Length problems and disallowed characters
/// carry distinct tags so the UI can show distinct messages.
pub fn passport_format(value: &str) -> Option<Failure> {
    if is_blank(value) {
        return None;
    }
    let upper = value.trim().to_uppercase();
    let cleaned: String = upper.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if cleaned.len() < PASSPORT_MIN_LEN || cleaned.len() > PASSPORT_MAX_LEN {
        return Some(Failure::new(
            Rule::InvalidLength,
            format!("Must be {PASSPORT_MIN_LEN} to {PASSPORT_MAX_LEN} characters"),
        ));
    }
    // Separators are tolerated and stripped; anything else is rejected.
    if upper
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && !matches!(c, ' ' | '-' | '.'))
    {
        return Some(Failure::new(
            Rule::InvalidCharacters,
            "Contains characters that are not allowed",
        ));
    }
    None
}

/// RFC-ish email pattern, stricter than a bare `x@y` check, plus a minimum
/// domain-length rule with its own tag.
pub fn email_format(value: &str) -> Option<Failure> {
    if is_blank(value) {
        return None;
    }
    let email = value.trim();
    if !email_regex().is_match(email) {
        return Some(Failure::new(Rule::InvalidEmail, "Not a valid email address"));
    }
    let domain = email.split_once('@').map(|(_, d)| d).unwrap_or("");
    if domain.len() < EMAIL_MIN_DOMAIN_LEN {
        return Some(Failure::new(
            Rule::EmailDomain,
            format!("Email domain must be at least {EMAIL_MIN_DOMAIN_LEN} characters"),
        ));
    }
    None
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._%+\-]*@[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}
