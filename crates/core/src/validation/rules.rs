//! Violation and report types for the validator library.

use serde::Serialize;

/// Machine-readable tag identifying which rule a violation came from.
///
/// Distinct tags exist where the UI shows distinct messages (passport
/// length vs characters, malformed email vs short domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    Required,
    MinAge,
    MaxDate,
    MinYear,
    InvalidDate,
    DateRange,
    InvalidScore,
    ScoreRange,
    InvalidLength,
    InvalidCharacters,
    InvalidEmail,
    EmailDomain,
    IncompleteRecord,
    NoQualification,
    ConsentRequired,
}

/// A rule failure before it is attached to a concrete field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub rule: Rule,
    pub message: String,
}

impl Failure {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// A single violation with its full dotted form path.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, failure: Failure) -> Self {
        Self {
            field: field.into(),
            rule: failure.rule,
            message: failure.message,
        }
    }
}

/// Aggregated result of validating a whole form.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            violations,
        }
    }

    /// Violations attached to one field path.
    pub fn for_field(&self, field: &str) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.field == field)
            .collect()
    }

    /// True if `field` carries a violation with the given rule tag.
    pub fn has(&self, field: &str, rule: Rule) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }
}
