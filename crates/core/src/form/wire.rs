//! Multipart wire flattening.
//!
//! The submission endpoint expects flattened field names that mirror the
//! nested form structure: PascalCase dotted paths with bracketed indices
//! for repeated sections (`EducationDetails.Undergraduates[0].Major`).
//! Values are normalized here -- passports uppercased, emails lowercased,
//! mobiles in E.164, dates padded to ISO `yyyy-mm-dd`, flags as
//! `true`/`false`. Blank fields are omitted.

use crate::normalize;

use super::{join_path, AdmissionForm, Field, FieldKind, Group, Node};

/// Flatten a form into ordered `(name, value)` multipart text fields.
pub fn flatten(form: &AdmissionForm) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    flatten_group(form.root(), "", &mut fields);
    fields
}

fn flatten_group(group: &Group, prefix: &str, out: &mut Vec<(String, String)>) {
    for node in group.children() {
        match node {
            Node::Field(field) => {
                let encoded = encode(field);
                if !encoded.is_empty() {
                    out.push((join_path(prefix, field.name()), encoded));
                }
            }
            Node::Group(child) => {
                flatten_group(child, &join_path(prefix, child.name()), out);
            }
            Node::List(list) => {
                let list_path = join_path(prefix, list.name());
                for (i, item) in list.items().iter().enumerate() {
                    flatten_group(item, &format!("{list_path}[{i}]"), out);
                }
            }
        }
    }
}

fn encode(field: &Field) -> String {
    let raw = field.value();
    if raw.trim().is_empty() {
        return String::new();
    }
    match field.kind() {
        FieldKind::Text | FieldKind::Number => raw.trim().to_string(),
        FieldKind::Date => normalize::date(raw),
        FieldKind::Passport => normalize::passport(raw),
        FieldKind::Email => normalize::email(raw),
        FieldKind::Mobile => normalize::mobile(raw),
        FieldKind::Flag => (raw.trim() == "true").to_string(),
    }
}
