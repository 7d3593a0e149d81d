//! Required-field validation, run only when export is requested.
//!
//! Scans all fields across all pages against the persisted value set and
//! reports unmet `required` fields in document order. An incomplete form
//! is an expected, recoverable outcome — a report, never an error.

use crate::id::FieldId;
use crate::model::{DesignDocument, Field, FieldKind, ValueSet};

/// One unmet required field, named for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub id: FieldId,
    /// The field's label, falling back to its id.
    pub label: String,
}

/// All required fields whose effective value is empty, in document order.
///
/// Empty means falsy for checkboxes; absent or blank-after-trim for every
/// other kind. Fields without an id never participate.
pub fn check_required(doc: &DesignDocument, values: &ValueSet) -> Vec<MissingField> {
    doc.fields()
        .filter(|f| f.required)
        .filter_map(|f| {
            let id = f.id?;
            is_empty_for(f, values).then(|| MissingField {
                id,
                label: f.display_name(),
            })
        })
        .collect()
}

fn is_empty_for(field: &Field, values: &ValueSet) -> bool {
    let value = field.effective_value(values);
    match field.kind {
        FieldKind::Checkbox => !value.is_some_and(|v| v.truthy()),
        _ => value.is_none_or(|v| v.is_blank()),
    }
}

/// The single human-readable message surfaced when export is blocked.
pub fn missing_summary(missing: &[MissingField]) -> String {
    let names: Vec<&str> = missing.iter().map(|m| m.label.as_str()).collect();
    format!("필수 입력 누락: {}", names.join(", "))
}
