//! Declarative form tree.
//!
//! Fields, groups, and repeated lists mirror the submission endpoint's
//! nested structure; node names are the backend's PascalCase wire names.
//! Validation walks the tree and evaluates field rules, then group rules
//! against the current snapshot, producing violations with full dotted
//! paths (`EducationDetails.Undergraduates[0].Major`).

pub mod builder;
pub mod wire;

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::validation::field as validators;
use crate::validation::group;
use crate::validation::group::PairSlot;
use crate::validation::rules::{Failure, Rule, ValidationReport, Violation};

/// How a field's value is encoded on the multipart wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Number,
    Passport,
    Email,
    Mobile,
    Flag,
}

/// Per-field rules, evaluated with a [`ValidationContext`].
#[derive(Debug, Clone)]
pub enum FieldRule {
    Required,
    /// For consent flags: the value must be the literal `"true"`.
    RequiredTrue,
    MinAge { years: i32 },
    MaxDateToday,
    MinYear { year: i32 },
    ScoreRange { min: f64, max: f64 },
    PassportFormat,
    EmailFormat,
}

/// Rules over a snapshot of a group's children; paths are relative to the
/// group carrying the rule.
#[derive(Debug, Clone)]
pub enum GroupRule {
    DateOrder {
        from: &'static str,
        to: &'static str,
    },
    AllOrNothing {
        fields: &'static [&'static str],
    },
    AtLeastOne {
        fields: &'static [&'static str],
    },
    PairedScoreDate {
        score: &'static str,
        date: &'static str,
        range: Option<(f64, f64)>,
    },
}

/// Reference dates injected into a validation pass so calendar-sensitive
/// rules stay deterministic under test.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    /// Context anchored at the current UTC day.
    pub fn now() -> Self {
        Self {
            today: chrono::Utc::now().date_naive(),
        }
    }

    /// Context anchored at a fixed day.
    pub fn on(today: NaiveDate) -> Self {
        Self { today }
    }
}

/// A single editable field.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    kind: FieldKind,
    value: String,
    initial: String,
    touched: bool,
    rules: Vec<FieldRule>,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            value: String::new(),
            initial: String::new(),
            touched: false,
            rules: Vec::new(),
        }
    }

    /// Attach validation rules; replaces any existing set.
    pub fn rules(mut self, rules: impl IntoIterator<Item = FieldRule>) -> Self {
        self.rules = rules.into_iter().collect();
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }
}

/// A named collection of fields, subgroups, and lists.
#[derive(Debug, Clone)]
pub struct Group {
    name: &'static str,
    children: Vec<Node>,
    rules: Vec<GroupRule>,
}

/// A repeated section; items are addressed with bracketed indices.
#[derive(Debug, Clone)]
pub struct List {
    name: &'static str,
    items: Vec<Group>,
}

/// One node of the form tree.
#[derive(Debug, Clone)]
pub enum Node {
    Field(Field),
    Group(Group),
    List(List),
}

impl Node {
    fn name(&self) -> &'static str {
        match self {
            Node::Field(f) => f.name,
            Node::Group(g) => g.name,
            Node::List(l) => l.name,
        }
    }
}

impl Group {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            children: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.children.push(Node::Field(field));
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.children.push(Node::Group(group));
        self
    }

    pub fn list(mut self, list: List) -> Self {
        self.children.push(Node::List(list));
        self
    }

    /// Attach group rules; replaces any existing set.
    pub fn rules(mut self, rules: impl IntoIterator<Item = GroupRule>) -> Self {
        self.rules = rules.into_iter().collect();
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Resolve a dotted relative path to a field.
    pub fn find_field(&self, path: &str) -> Option<&Field> {
        let mut group = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let (name, index) = split_index(segment)?;
            let node = group.children.iter().find(|n| n.name() == name)?;
            match (node, index) {
                (Node::Field(field), None) => {
                    return if segments.peek().is_none() {
                        Some(field)
                    } else {
                        None
                    };
                }
                (Node::Group(child), None) => group = child,
                (Node::List(list), Some(i)) => group = list.items.get(i)?,
                _ => return None,
            }
        }
        None
    }

    /// Resolve a dotted relative path to a mutable field.
    pub fn find_field_mut(&mut self, path: &str) -> Option<&mut Field> {
        let mut group = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let (name, index) = split_index(segment)?;
            let node = group.children.iter_mut().find(|n| n.name() == name)?;
            match (node, index) {
                (Node::Field(field), None) => {
                    return if segments.peek().is_none() {
                        Some(field)
                    } else {
                        None
                    };
                }
                (Node::Group(child), None) => group = child,
                (Node::List(list), Some(i)) => group = list.items.get_mut(i)?,
                _ => return None,
            }
        }
        None
    }

    /// Resolve a dotted relative path to a mutable list.
    pub fn find_list_mut(&mut self, path: &str) -> Option<&mut List> {
        let (parent_path, list_name) = match path.rsplit_once('.') {
            Some((parent, name)) => (Some(parent), name),
            None => (None, path),
        };
        let group = match parent_path {
            Some(p) => self.find_group_mut(p)?,
            None => self,
        };
        group.children.iter_mut().find_map(|n| match n {
            Node::List(list) if list.name == list_name => Some(list),
            _ => None,
        })
    }

    fn find_group_mut(&mut self, path: &str) -> Option<&mut Group> {
        let mut group = self;
        for segment in path.split('.') {
            let (name, index) = split_index(segment)?;
            let node = group.children.iter_mut().find(|n| n.name() == name)?;
            match (node, index) {
                (Node::Group(child), None) => group = child,
                (Node::List(list), Some(i)) => group = list.items.get_mut(i)?,
                _ => return None,
            }
        }
        Some(group)
    }

    /// Value of a relative child field; blank when the path does not
    /// resolve (group rules treat missing as empty).
    fn value_at(&self, path: &str) -> &str {
        self.find_field(path).map(|f| f.value.as_str()).unwrap_or("")
    }
}

impl List {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    pub fn item(mut self, item: Group) -> Self {
        self.items.push(item);
        self
    }

    pub fn push(&mut self, item: Group) {
        self.items.push(item);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[Group] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The whole admission form: a root group plus form-level state.
#[derive(Debug, Clone)]
pub struct AdmissionForm {
    root: Group,
}

impl AdmissionForm {
    pub(crate) fn from_root(root: Group) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    /// Current value of the field at `path`.
    pub fn value(&self, path: &str) -> Result<&str, CoreError> {
        self.root
            .find_field(path)
            .map(|f| f.value.as_str())
            .ok_or_else(|| CoreError::UnknownField { path: path.into() })
    }

    /// Set a field's value and mark it touched.
    pub fn set_value(&mut self, path: &str, value: impl Into<String>) -> Result<(), CoreError> {
        let field = self
            .root
            .find_field_mut(path)
            .ok_or_else(|| CoreError::UnknownField { path: path.into() })?;
        field.value = value.into();
        field.touched = true;
        Ok(())
    }

    /// Set a field's value *and* baseline, leaving it untouched. Used when
    /// loading a fetched record into the tree.
    pub fn set_initial(&mut self, path: &str, value: impl Into<String>) -> Result<(), CoreError> {
        let field = self
            .root
            .find_field_mut(path)
            .ok_or_else(|| CoreError::UnknownField { path: path.into() })?;
        field.value = value.into();
        field.initial = field.value.clone();
        field.touched = false;
        Ok(())
    }

    /// Mark a field touched without changing its value.
    pub fn touch(&mut self, path: &str) -> Result<(), CoreError> {
        let field = self
            .root
            .find_field_mut(path)
            .ok_or_else(|| CoreError::UnknownField { path: path.into() })?;
        field.touched = true;
        Ok(())
    }

    /// True once any field's value differs from its baseline.
    pub fn is_dirty(&self) -> bool {
        fn dirty(group: &Group) -> bool {
            group.children.iter().any(|node| match node {
                Node::Field(f) => f.value != f.initial,
                Node::Group(g) => dirty(g),
                Node::List(l) => l.items.iter().any(dirty),
            })
        }
        dirty(&self.root)
    }

    /// Restore every field to its baseline and clear touched flags.
    pub fn reset(&mut self) {
        fn walk(group: &mut Group) {
            for node in &mut group.children {
                match node {
                    Node::Field(f) => {
                        f.value = f.initial.clone();
                        f.touched = false;
                    }
                    Node::Group(g) => walk(g),
                    Node::List(l) => l.items.iter_mut().for_each(walk),
                }
            }
        }
        walk(&mut self.root);
    }

    /// Adopt the current values as the new baseline (after a successful
    /// save) and clear touched flags.
    pub fn commit(&mut self) {
        fn walk(group: &mut Group) {
            for node in &mut group.children {
                match node {
                    Node::Field(f) => {
                        f.initial = f.value.clone();
                        f.touched = false;
                    }
                    Node::Group(g) => walk(g),
                    Node::List(l) => l.items.iter_mut().for_each(walk),
                }
            }
        }
        walk(&mut self.root);
    }

    /// Run every field rule and group rule against the current snapshot.
    ///
    /// Re-validation is idempotent: conditional requiredness is recomputed
    /// from scratch on each pass, so clearing a score removes the paired
    /// date's required violation with no leftover state.
    pub fn validate(&self, ctx: &ValidationContext) -> ValidationReport {
        let mut violations = Vec::new();
        validate_group(&self.root, "", ctx, &mut violations);
        ValidationReport::from_violations(violations)
    }
}

/// Join a path prefix with a child name; empty sides collapse.
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Split `Name[3]` into `("Name", Some(3))`; plain names get `None`.
fn split_index(segment: &str) -> Option<(&str, Option<usize>)> {
    match segment.split_once('[') {
        None => Some((segment, None)),
        Some((name, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            Some((name, Some(index)))
        }
    }
}

fn validate_group(group: &Group, prefix: &str, ctx: &ValidationContext, out: &mut Vec<Violation>) {
    for node in &group.children {
        match node {
            Node::Field(field) => {
                let path = join_path(prefix, field.name);
                for rule in &field.rules {
                    if let Some(failure) = eval_field_rule(rule, &field.value, ctx) {
                        out.push(Violation::new(&path, failure));
                    }
                }
            }
            Node::Group(child) => {
                validate_group(child, &join_path(prefix, child.name), ctx, out);
            }
            Node::List(list) => {
                let list_path = join_path(prefix, list.name);
                for (i, item) in list.items.iter().enumerate() {
                    validate_group(item, &format!("{list_path}[{i}]"), ctx, out);
                }
            }
        }
    }

    for rule in &group.rules {
        eval_group_rule(rule, group, prefix, out);
    }
}

fn eval_field_rule(rule: &FieldRule, value: &str, ctx: &ValidationContext) -> Option<Failure> {
    match rule {
        FieldRule::Required => validators::required(value),
        FieldRule::RequiredTrue => {
            if value.trim() == "true" {
                None
            } else {
                Some(Failure::new(
                    Rule::ConsentRequired,
                    "Consent is required before submission",
                ))
            }
        }
        FieldRule::MinAge { years } => validators::min_age(value, *years, ctx.today),
        FieldRule::MaxDateToday => validators::max_date(value, ctx.today),
        FieldRule::MinYear { year } => validators::min_year(value, *year),
        FieldRule::ScoreRange { min, max } => validators::score_range(value, *min, *max),
        FieldRule::PassportFormat => validators::passport_format(value),
        FieldRule::EmailFormat => validators::email_format(value),
    }
}

fn eval_group_rule(rule: &GroupRule, group: &Group, prefix: &str, out: &mut Vec<Violation>) {
    match rule {
        GroupRule::DateOrder { from, to } => {
            if let Some(failure) = group::date_order(group.value_at(from), group.value_at(to)) {
                out.push(Violation::new(prefix, failure));
            }
        }
        GroupRule::AllOrNothing { fields } => {
            let values: Vec<&str> = fields.iter().map(|f| group.value_at(f)).collect();
            if let Some(failure) = group::all_or_nothing(&values) {
                out.push(Violation::new(prefix, failure));
            }
        }
        GroupRule::AtLeastOne { fields } => {
            let values: Vec<&str> = fields.iter().map(|f| group.value_at(f)).collect();
            if let Some(failure) = group::at_least_one(&values) {
                out.push(Violation::new(prefix, failure));
            }
        }
        GroupRule::PairedScoreDate { score, date, range } => {
            for (slot, failure) in
                group::paired_score_date(group.value_at(score), group.value_at(date), *range)
            {
                let path = match slot {
                    PairSlot::Score => join_path(prefix, score),
                    PairSlot::Date => join_path(prefix, date),
                };
                out.push(Violation::new(path, failure));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample_form() -> AdmissionForm {
        let root = Group::new("")
            .group(
                Group::new("Contact")
                    .field(Field::new("Email", FieldKind::Email).rules([
                        FieldRule::Required,
                        FieldRule::EmailFormat,
                    ]))
                    .field(Field::new("Mobile", FieldKind::Mobile).rules([FieldRule::Required])),
            )
            .group(
                Group::new("Trip")
                    .field(Field::new("From", FieldKind::Date))
                    .field(Field::new("To", FieldKind::Date))
                    .rules([GroupRule::DateOrder {
                        from: "From",
                        to: "To",
                    }]),
            )
            .list({
                List::new("Stops").item(
                    Group::new("")
                        .field(Field::new("City", FieldKind::Text))
                        .field(Field::new("Country", FieldKind::Text))
                        .rules([GroupRule::AllOrNothing {
                            fields: &["City", "Country"],
                        }]),
                )
            });
        AdmissionForm::from_root(root)
    }

    fn ctx() -> ValidationContext {
        ValidationContext::on(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap())
    }

    #[test]
    fn set_and_get_by_path() {
        let mut form = sample_form();
        form.set_value("Contact.Email", "a@example.org").unwrap();
        assert_eq!(form.value("Contact.Email").unwrap(), "a@example.org");
        assert_eq!(form.value("Stops[0].City").unwrap(), "");
    }

    #[test]
    fn unknown_path_is_an_error() {
        let mut form = sample_form();
        assert!(form.set_value("Contact.Fax", "1").is_err());
        assert!(form.value("Stops[3].City").is_err());
        assert!(form.value("Contact").is_err());
    }

    #[test]
    fn violations_carry_full_paths() {
        let form = sample_form();
        let report = form.validate(&ctx());
        assert!(!report.is_valid);
        assert!(report.has("Contact.Email", Rule::Required));
        assert!(report.has("Contact.Mobile", Rule::Required));
    }

    #[test]
    fn group_rule_attaches_to_group_path() {
        let mut form = sample_form();
        form.set_value("Trip.From", "2024-06").unwrap();
        form.set_value("Trip.To", "2024-01").unwrap();
        let report = form.validate(&ctx());
        assert!(report.has("Trip", Rule::DateRange));
    }

    #[test]
    fn list_item_rule_attaches_to_indexed_path() {
        let mut form = sample_form();
        form.set_value("Stops[0].City", "Hue").unwrap();
        let report = form.validate(&ctx());
        assert!(report.has("Stops[0]", Rule::IncompleteRecord));
    }

    #[test]
    fn dirty_reset_commit_lifecycle() {
        let mut form = sample_form();
        assert!(!form.is_dirty());

        form.set_value("Contact.Email", "a@example.org").unwrap();
        assert!(form.is_dirty());
        assert!(form.root().find_field("Contact.Email").unwrap().is_touched());

        form.reset();
        assert!(!form.is_dirty());
        assert!(!form.root().find_field("Contact.Email").unwrap().is_touched());
        assert_eq!(form.value("Contact.Email").unwrap(), "");

        form.set_value("Contact.Email", "b@example.org").unwrap();
        form.commit();
        assert!(!form.is_dirty());
        assert_eq!(form.value("Contact.Email").unwrap(), "b@example.org");
    }

    #[test]
    fn set_initial_updates_baseline() {
        let mut form = sample_form();
        form.set_initial("Contact.Email", "loaded@example.org").unwrap();
        assert!(!form.is_dirty());
    }
}
