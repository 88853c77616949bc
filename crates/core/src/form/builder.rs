//! Assembly of the admission form tree.
//!
//! One place owns the whole shape: section names, field kinds, and the
//! validator wiring. Node names are exactly the backend's wire names.

use crate::application::{Application, EducationRecord, EmploymentRecord, TestScore};
use crate::error::CoreError;

use super::{AdmissionForm, Field, FieldKind, FieldRule, Group, GroupRule, List};

/// Minimum applicant age in whole years.
pub const MIN_APPLICANT_AGE: i32 = 18;

/// Earliest graduation year the form accepts.
pub const MIN_GRADUATION_YEAR: i32 = 1950;

/// GPA is reported on the 10-point scale.
pub const GPA_RANGE: (f64, f64) = (0.0, 10.0);

/// IELTS band range.
pub const IELTS_RANGE: (f64, f64) = (0.0, 9.0);

/// TOEFL iBT total range.
pub const TOEFL_RANGE: (f64, f64) = (0.0, 120.0);

/// Maximum number of employment positions on the form.
pub const MAX_POSITIONS: usize = 2;

/// Core fields that make an education record "filled" for the
/// all-or-nothing check.
const EDUCATION_CORE_FIELDS: &[&str] = &[
    "University",
    "Country",
    "Major",
    "GraduationYear",
    "Language",
    "Gpa",
];

/// Core fields that make an employment position "filled".
const EMPLOYMENT_CORE_FIELDS: &[&str] = &["Organization", "Title", "From"];

/// Primary values counted for the at-least-one English check.
const ENGLISH_PRIMARY_FIELDS: &[&str] =
    &["Ielts.Score", "Toefl.Score", "Other.Name", "Other.Score"];

/// Build the empty admission form: two undergraduate slots (first
/// mandatory), one optional postgraduate slot, two optional employment
/// positions, the three English test slots, and the declaration.
pub fn admission_form() -> AdmissionForm {
    let root = Group::new("")
        .group(personal_details())
        .group(program_details())
        .group(education_details())
        .group(english_details())
        .group(employment_details())
        .group(declaration());
    AdmissionForm::from_root(root)
}

fn personal_details() -> Group {
    Group::new("PersonalDetails")
        .field(Field::new("FullName", FieldKind::Text).rules([FieldRule::Required]))
        .field(Field::new("DateOfBirth", FieldKind::Date).rules([
            FieldRule::Required,
            FieldRule::MinAge {
                years: MIN_APPLICANT_AGE,
            },
        ]))
        .field(Field::new("Gender", FieldKind::Number).rules([FieldRule::Required]))
        .field(Field::new("Nationality", FieldKind::Text).rules([FieldRule::Required]))
        .field(Field::new("PassportNumber", FieldKind::Passport).rules([
            FieldRule::Required,
            FieldRule::PassportFormat,
        ]))
        .field(Field::new("Email", FieldKind::Email).rules([
            FieldRule::Required,
            FieldRule::EmailFormat,
        ]))
        .field(Field::new("Mobile", FieldKind::Mobile).rules([FieldRule::Required]))
        .group(address("CorrespondenceAddress"))
        .group(address("PermanentAddress"))
}

fn address(name: &'static str) -> Group {
    Group::new(name)
        .field(Field::new("Street", FieldKind::Text).rules([FieldRule::Required]))
        .field(Field::new("ProvinceCode", FieldKind::Text).rules([FieldRule::Required]))
        .field(Field::new("WardId", FieldKind::Text).rules([FieldRule::Required]))
}

fn program_details() -> Group {
    Group::new("ProgramDetails")
        .field(Field::new("Program", FieldKind::Text).rules([FieldRule::Required]))
        .field(Field::new("Intake", FieldKind::Text))
}

fn education_details() -> Group {
    Group::new("EducationDetails")
        .list(
            List::new("Undergraduates")
                .item(education_record(true))
                .item(education_record(false)),
        )
        .list(List::new("Postgraduates").item(education_record(false)))
}

/// One degree record. The mandatory first undergraduate gets `Required`
/// on its core fields; optional records get the all-or-nothing rule
/// instead, with the range/year validators still active once values
/// appear.
fn education_record(mandatory: bool) -> Group {
    let require = |field: Field| {
        if mandatory {
            let mut rules = vec![FieldRule::Required];
            rules.extend(extra_rules(field.name()));
            field.rules(rules)
        } else {
            let rules = extra_rules(field.name());
            field.rules(rules)
        }
    };

    let group = Group::new("")
        .field(require(Field::new("University", FieldKind::Text)))
        .field(require(Field::new("Country", FieldKind::Text)))
        .field(require(Field::new("Major", FieldKind::Text)))
        .field(require(Field::new("GraduationYear", FieldKind::Number)))
        .field(require(Field::new("Language", FieldKind::Text)))
        .field(require(Field::new("Gpa", FieldKind::Number)))
        .field(Field::new("Rank", FieldKind::Text))
        .field(Field::new("ThesisTitle", FieldKind::Text));

    if mandatory {
        group
    } else {
        group.rules([GroupRule::AllOrNothing {
            fields: EDUCATION_CORE_FIELDS,
        }])
    }
}

/// Non-required validators that apply to education fields whenever a
/// value is present.
fn extra_rules(field_name: &str) -> Vec<FieldRule> {
    match field_name {
        "GraduationYear" => vec![FieldRule::MinYear {
            year: MIN_GRADUATION_YEAR,
        }],
        "Gpa" => vec![FieldRule::ScoreRange {
            min: GPA_RANGE.0,
            max: GPA_RANGE.1,
        }],
        _ => Vec::new(),
    }
}

fn english_details() -> Group {
    Group::new("EnglishDetails")
        .group(test_slot("Ielts", false))
        .group(test_slot("Toefl", false))
        .group(
            test_slot("Other", true).rules([GroupRule::AllOrNothing {
                fields: &["Name", "Score"],
            }]),
        )
        .rules([
            GroupRule::AtLeastOne {
                fields: ENGLISH_PRIMARY_FIELDS,
            },
            GroupRule::PairedScoreDate {
                score: "Ielts.Score",
                date: "Ielts.Date",
                range: Some(IELTS_RANGE),
            },
            GroupRule::PairedScoreDate {
                score: "Toefl.Score",
                date: "Toefl.Date",
                range: Some(TOEFL_RANGE),
            },
            GroupRule::PairedScoreDate {
                score: "Other.Score",
                date: "Other.Date",
                range: None,
            },
        ])
}

fn test_slot(name: &'static str, named: bool) -> Group {
    let mut slot = Group::new(name);
    if named {
        slot = slot.field(Field::new("Name", FieldKind::Text));
    }
    slot.field(Field::new("Score", FieldKind::Number))
        .field(Field::new("Date", FieldKind::Date).rules([FieldRule::MaxDateToday]))
}

fn employment_details() -> Group {
    let mut positions = List::new("Positions");
    for _ in 0..MAX_POSITIONS {
        positions.push(employment_position());
    }
    Group::new("EmploymentDetails").list(positions)
}

fn employment_position() -> Group {
    Group::new("")
        .field(Field::new("Organization", FieldKind::Text))
        .field(Field::new("Title", FieldKind::Text))
        .field(Field::new("From", FieldKind::Date).rules([FieldRule::MaxDateToday]))
        .field(Field::new("To", FieldKind::Date))
        .field(Field::new("Address", FieldKind::Text))
        .rules([
            GroupRule::AllOrNothing {
                fields: EMPLOYMENT_CORE_FIELDS,
            },
            GroupRule::DateOrder {
                from: "From",
                to: "To",
            },
        ])
}

fn declaration() -> Group {
    Group::new("Declaration")
        .field(Field::new("Consent", FieldKind::Flag).rules([FieldRule::RequiredTrue]))
}

impl AdmissionForm {
    /// Append another optional postgraduate record slot and return its
    /// index.
    pub fn add_postgraduate(&mut self) -> usize {
        let list = self
            .root_mut()
            .find_list_mut("EducationDetails.Postgraduates")
            .expect("postgraduate list exists in the built form");
        list.push(education_record(false));
        list.len() - 1
    }

    /// Load a fetched record into the tree as the new baseline values.
    ///
    /// Grows the postgraduate list to fit; extra undergraduate or
    /// employment records beyond the form's fixed slots are ignored.
    pub fn populate(&mut self, app: &Application) -> Result<(), CoreError> {
        let p = &app.personal;
        self.set_initial("PersonalDetails.FullName", &p.full_name)?;
        self.set_initial("PersonalDetails.DateOfBirth", &p.date_of_birth)?;
        let gender = p.gender.map(|g| g.code().to_string()).unwrap_or_default();
        self.set_initial("PersonalDetails.Gender", gender)?;
        self.set_initial("PersonalDetails.Nationality", &p.nationality)?;
        self.set_initial("PersonalDetails.PassportNumber", &p.passport_number)?;
        self.set_initial("PersonalDetails.Email", &p.email)?;
        self.set_initial("PersonalDetails.Mobile", &p.mobile)?;
        for (name, addr) in [
            ("CorrespondenceAddress", &p.correspondence),
            ("PermanentAddress", &p.permanent),
        ] {
            self.set_initial(&format!("PersonalDetails.{name}.Street"), &addr.street)?;
            self.set_initial(
                &format!("PersonalDetails.{name}.ProvinceCode"),
                &addr.province_code,
            )?;
            self.set_initial(&format!("PersonalDetails.{name}.WardId"), &addr.ward_id)?;
        }

        self.set_initial("ProgramDetails.Program", &app.program.program)?;
        self.set_initial("ProgramDetails.Intake", &app.program.intake)?;

        for (i, record) in app.education.undergraduates.iter().take(2).enumerate() {
            self.populate_education(&format!("EducationDetails.Undergraduates[{i}]"), record)?;
        }
        for (i, record) in app.education.postgraduates.iter().enumerate() {
            let prefix = format!("EducationDetails.Postgraduates[{i}]");
            if self.root().find_field(&format!("{prefix}.University")).is_none() {
                self.add_postgraduate();
            }
            self.populate_education(&prefix, record)?;
        }

        for (name, score) in [
            ("Ielts", &app.english.ielts),
            ("Toefl", &app.english.toefl),
            ("Other", &app.english.other),
        ] {
            self.populate_test_slot(name, score)?;
        }

        for (i, position) in app.employment.iter().take(MAX_POSITIONS).enumerate() {
            self.populate_position(i, position)?;
        }

        let consent = if app.declaration.consent { "true" } else { "" };
        self.set_initial("Declaration.Consent", consent)?;
        Ok(())
    }

    fn populate_education(&mut self, prefix: &str, record: &EducationRecord) -> Result<(), CoreError> {
        self.set_initial(&format!("{prefix}.University"), &record.university)?;
        self.set_initial(&format!("{prefix}.Country"), &record.country)?;
        self.set_initial(&format!("{prefix}.Major"), &record.major)?;
        self.set_initial(&format!("{prefix}.GraduationYear"), &record.graduation_year)?;
        self.set_initial(&format!("{prefix}.Language"), &record.language)?;
        self.set_initial(&format!("{prefix}.Gpa"), &record.gpa)?;
        self.set_initial(&format!("{prefix}.Rank"), &record.rank)?;
        self.set_initial(&format!("{prefix}.ThesisTitle"), &record.thesis_title)?;
        Ok(())
    }

    fn populate_test_slot(&mut self, name: &str, score: &TestScore) -> Result<(), CoreError> {
        if name == "Other" {
            self.set_initial(&format!("EnglishDetails.{name}.Name"), &score.name)?;
        }
        self.set_initial(&format!("EnglishDetails.{name}.Score"), &score.score)?;
        self.set_initial(&format!("EnglishDetails.{name}.Date"), &score.date)?;
        Ok(())
    }

    fn populate_position(&mut self, index: usize, position: &EmploymentRecord) -> Result<(), CoreError> {
        let prefix = format!("EmploymentDetails.Positions[{index}]");
        self.set_initial(&format!("{prefix}.Organization"), &position.organization)?;
        self.set_initial(&format!("{prefix}.Title"), &position.title)?;
        self.set_initial(&format!("{prefix}.From"), &position.from)?;
        self.set_initial(&format!("{prefix}.To"), &position.to)?;
        self.set_initial(&format!("{prefix}.Address"), &position.address)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::form::ValidationContext;
    use crate::validation::Rule;

    use super::*;

    fn ctx() -> ValidationContext {
        ValidationContext::on(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap())
    }

    /// Fill everything a minimal valid application needs.
    fn fill_minimal(form: &mut AdmissionForm) {
        let values = [
            ("PersonalDetails.FullName", "Nguyen Van A"),
            ("PersonalDetails.DateOfBirth", "2000-01-15"),
            ("PersonalDetails.Gender", "1"),
            ("PersonalDetails.Nationality", "Vietnamese"),
            ("PersonalDetails.PassportNumber", "C1234567"),
            ("PersonalDetails.Email", "a.nguyen@example.edu.vn"),
            ("PersonalDetails.Mobile", "0912345678"),
            ("PersonalDetails.CorrespondenceAddress.Street", "12 Tran Phu"),
            ("PersonalDetails.CorrespondenceAddress.ProvinceCode", "01"),
            ("PersonalDetails.CorrespondenceAddress.WardId", "00004"),
            ("PersonalDetails.PermanentAddress.Street", "34 Le Loi"),
            ("PersonalDetails.PermanentAddress.ProvinceCode", "48"),
            ("PersonalDetails.PermanentAddress.WardId", "20308"),
            ("ProgramDetails.Program", "MSE-CS"),
            ("EducationDetails.Undergraduates[0].University", "Hanoi University of Science"),
            ("EducationDetails.Undergraduates[0].Country", "Vietnam"),
            ("EducationDetails.Undergraduates[0].Major", "Computer Science"),
            ("EducationDetails.Undergraduates[0].GraduationYear", "2022"),
            ("EducationDetails.Undergraduates[0].Language", "Vietnamese"),
            ("EducationDetails.Undergraduates[0].Gpa", "8.2"),
            ("EnglishDetails.Ielts.Score", "7.0"),
            ("EnglishDetails.Ielts.Date", "2025-11-20"),
            ("Declaration.Consent", "true"),
        ];
        for (path, value) in values {
            form.set_value(path, value).unwrap();
        }
    }

    #[test]
    fn empty_form_reports_required_fields() {
        let form = admission_form();
        let report = form.validate(&ctx());
        assert!(!report.is_valid);
        assert!(report.has("PersonalDetails.FullName", Rule::Required));
        assert!(report.has("EducationDetails.Undergraduates[0].University", Rule::Required));
        assert!(report.has("EnglishDetails", Rule::NoQualification));
        assert!(report.has("Declaration.Consent", Rule::ConsentRequired));
    }

    #[test]
    fn minimal_valid_application_passes() {
        let mut form = admission_form();
        fill_minimal(&mut form);
        let report = form.validate(&ctx());
        assert!(report.is_valid, "unexpected violations: {:?}", report.violations);
    }

    #[test]
    fn underage_applicant_fails() {
        let mut form = admission_form();
        fill_minimal(&mut form);
        form.set_value("PersonalDetails.DateOfBirth", "2010-01-15").unwrap();
        let report = form.validate(&ctx());
        assert!(report.has("PersonalDetails.DateOfBirth", Rule::MinAge));
    }

    #[test]
    fn second_undergraduate_is_all_or_nothing() {
        let mut form = admission_form();
        fill_minimal(&mut form);
        form.set_value("EducationDetails.Undergraduates[1].University", "Danang University")
            .unwrap();
        let report = form.validate(&ctx());
        assert!(report.has("EducationDetails.Undergraduates[1]", Rule::IncompleteRecord));
    }

    #[test]
    fn score_date_pairing_toggles_idempotently() {
        let mut form = admission_form();
        fill_minimal(&mut form);

        // Clear the IELTS date: score alone now demands a date. TOEFL keeps
        // the form satisfying the at-least-one rule.
        form.set_value("EnglishDetails.Toefl.Score", "95").unwrap();
        form.set_value("EnglishDetails.Toefl.Date", "2025-10-01").unwrap();
        form.set_value("EnglishDetails.Ielts.Date", "").unwrap();
        form.touch("EnglishDetails.Ielts.Date").unwrap();
        let report = form.validate(&ctx());
        assert!(report.has("EnglishDetails.Ielts.Date", Rule::Required));

        // Clearing the score removes the requirement; nothing lingers.
        form.set_value("EnglishDetails.Ielts.Score", "").unwrap();
        let report = form.validate(&ctx());
        assert!(report.for_field("EnglishDetails.Ielts.Date").is_empty());
        assert!(report.is_valid, "unexpected violations: {:?}", report.violations);
    }

    #[test]
    fn ielts_score_out_of_band_fails() {
        let mut form = admission_form();
        fill_minimal(&mut form);
        form.set_value("EnglishDetails.Ielts.Score", "9.5").unwrap();
        let report = form.validate(&ctx());
        assert!(report.has("EnglishDetails.Ielts.Score", Rule::ScoreRange));
    }

    #[test]
    fn employment_dates_must_be_ordered() {
        let mut form = admission_form();
        fill_minimal(&mut form);
        for (path, value) in [
            ("EmploymentDetails.Positions[0].Organization", "FPT Software"),
            ("EmploymentDetails.Positions[0].Title", "Developer"),
            ("EmploymentDetails.Positions[0].From", "2024-06"),
            ("EmploymentDetails.Positions[0].To", "2024-01"),
        ] {
            form.set_value(path, value).unwrap();
        }
        let report = form.validate(&ctx());
        assert!(report.has("EmploymentDetails.Positions[0]", Rule::DateRange));
    }

    #[test]
    fn populate_sets_clean_baseline() {
        use crate::application::{Application, Gender};

        let mut app = Application::default();
        app.personal.full_name = "Tran Thi B".into();
        app.personal.gender = Some(Gender::Female);
        app.declaration.consent = true;

        let mut form = admission_form();
        form.populate(&app).unwrap();
        assert_eq!(form.value("PersonalDetails.FullName").unwrap(), "Tran Thi B");
        assert_eq!(form.value("PersonalDetails.Gender").unwrap(), "2");
        assert_eq!(form.value("Declaration.Consent").unwrap(), "true");
        assert!(!form.is_dirty());
    }

    #[test]
    fn populate_grows_postgraduate_list() {
        use crate::application::{Application, EducationRecord};

        let mut app = Application::default();
        for i in 0..3 {
            app.education.postgraduates.push(EducationRecord {
                university: format!("University {i}"),
                ..Default::default()
            });
        }

        let mut form = admission_form();
        form.populate(&app).unwrap();
        assert_eq!(
            form.value("EducationDetails.Postgraduates[2].University").unwrap(),
            "University 2"
        );
    }
}
