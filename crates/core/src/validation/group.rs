//! Group-level rules evaluated over a snapshot of related field values.
//!
//! These replace imperative attach/detach-validator mutation: every pass
//! looks at the whole snapshot, so the outcome cannot depend on which
//! field changed last.

use super::field::{is_blank, parse_date_loose, score_range};
use super::rules::{Failure, Rule};

/// Which side of a score/date pair a pairing failure attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSlot {
    Score,
    Date,
}

/// End preceding start fails; either side blank or unparsable passes
/// (partial input is tolerated, the field validators flag bad dates).
pub fn date_order(from: &str, to: &str) -> Option<Failure> {
    if is_blank(from) || is_blank(to) {
        return None;
    }
    let (Some(from), Some(to)) = (parse_date_loose(from), parse_date_loose(to)) else {
        return None;
    };
    if to < from {
        Some(Failure::new(
            Rule::DateRange,
            "End date precedes start date",
        ))
    } else {
        None
    }
}

/// Some-but-not-all non-blank fails. Used to keep optional repeated
/// sections either fully filled or fully empty.
pub fn all_or_nothing(values: &[&str]) -> Option<Failure> {
    let filled = values.iter().filter(|v| !is_blank(v)).count();
    if filled == 0 || filled == values.len() {
        None
    } else {
        Some(Failure::new(
            Rule::IncompleteRecord,
            "Complete this section or leave it entirely empty",
        ))
    }
}

/// Fails unless at least one of the primary values is non-blank.
pub fn at_least_one(values: &[&str]) -> Option<Failure> {
    if values.iter().any(|v| !is_blank(v)) {
        None
    } else {
        Some(Failure::new(
            Rule::NoQualification,
            "At least one English qualification is required",
        ))
    }
}

/// The bidirectional score/date contract for one test slot: a score
/// requires a date, a date requires a score, and a present score must pass
/// the slot's numeric range when one is configured.
pub fn paired_score_date(
    score: &str,
    date: &str,
    range: Option<(f64, f64)>,
) -> Vec<(PairSlot, Failure)> {
    let mut failures = Vec::new();
    let score_blank = is_blank(score);
    let date_blank = is_blank(date);

    if !score_blank && date_blank {
        failures.push((
            PairSlot::Date,
            Failure::new(Rule::Required, "A test date is required with a score"),
        ));
    }
    if !date_blank && score_blank {
        failures.push((
            PairSlot::Score,
            Failure::new(Rule::Required, "A score is required with a test date"),
        ));
    }
    if !score_blank {
        if let Some((min, max)) = range {
            if let Some(failure) = score_range(score, min, max) {
                failures.push((PairSlot::Score, failure));
            }
        }
    }
    failures
}
