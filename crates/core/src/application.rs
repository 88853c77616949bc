//! Admission application entity records.
//!
//! Plain serde records mirroring the detail endpoint's JSON shape
//! (`camelCase` keys). Scalar values stay strings: the form tree edits them
//! as text and the submission wire carries them as text.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EntityId;

/// Gender wire codes used by the submission endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Gender {
    Male = 1,
    Female = 2,
    Other = 3,
}

impl Gender {
    /// Wire code sent in multipart fields.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse from the wire code.
    pub fn from_code(code: u8) -> Result<Self, CoreError> {
        match code {
            1 => Ok(Self::Male),
            2 => Ok(Self::Female),
            3 => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Unknown gender code {other}"
            ))),
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        gender.code()
    }
}

impl TryFrom<u8> for Gender {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

/// Root aggregate: everything one candidate submits.
///
/// Created on submit; mutated only through the edit form. There is no
/// deletion path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Application {
    /// Server-assigned id, absent on a draft that was never submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub personal: PersonalDetails,
    pub program: ProgramDetails,
    pub education: EducationDetails,
    pub english: EnglishDetails,
    /// Zero to two positions, most recent first.
    pub employment: Vec<EmploymentRecord>,
    pub declaration: Declaration,
}

/// Identity, contact, and address fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalDetails {
    pub full_name: String,
    /// ISO `yyyy-mm-dd`.
    pub date_of_birth: String,
    pub gender: Option<Gender>,
    pub nationality: String,
    pub passport_number: String,
    pub email: String,
    pub mobile: String,
    pub correspondence: Address,
    pub permanent: Address,
}

/// Address resolved through the two-level administrative hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub province_code: String,
    pub ward_id: String,
    /// Display names, filled when the record is loaded back.
    pub province_name: String,
    pub ward_name: String,
}

/// Program (course of study) the candidate is applying to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgramDetails {
    pub program: String,
    pub intake: String,
}

/// Undergraduate and postgraduate history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationDetails {
    /// First record is mandatory; a second is all-or-nothing.
    pub undergraduates: Vec<EducationRecord>,
    /// Zero or more, each all-or-nothing.
    pub postgraduates: Vec<EducationRecord>,
}

/// One degree record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationRecord {
    pub university: String,
    pub country: String,
    pub major: String,
    pub graduation_year: String,
    pub language: String,
    pub gpa: String,
    pub rank: String,
    pub thesis_title: String,
}

/// The three English qualification slots; at least one must be filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnglishDetails {
    pub ielts: TestScore,
    pub toefl: TestScore,
    pub other: TestScore,
}

/// Name/score/date triple for one English test.
///
/// The name is only editable for the "other" slot; a score implies a
/// required date and vice versa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestScore {
    pub name: String,
    pub score: String,
    pub date: String,
}

/// One employment position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmploymentRecord {
    pub organization: String,
    pub title: String,
    /// Start date; required once any field of the position is filled.
    pub from: String,
    /// End date; blank for a current position.
    pub to: String,
    pub address: String,
}

/// Consent checkbox; must be true to submit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Declaration {
    pub consent: bool,
}
