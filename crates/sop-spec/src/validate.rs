use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::spec::{FieldDescriptor, FieldKind, FormSchema};
use crate::state::{FieldValue, FormState};

/// One problem found in a form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Outcome of checking a state against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub unknown_fields: Vec<String>,
}

/// Checks value shapes, declared options and checkbox limits, and lists keys
/// the form does not know. Export works on invalid states too; this only
/// reports.
pub fn validate(schema: &FormSchema, state: &FormState) -> ValidationResult {
    let mut errors = Vec::new();

    for field in schema.fields() {
        if let Some(value) = state.get(&field.source_name)
            && let Some(error) = validate_value(field, value)
        {
            errors.push(error);
        }
        if let Some(slot) = &field.other_slot
            && let Some(FieldValue::Multi(_)) = state.get(slot)
        {
            errors.push(base_error(slot, "Other text must be a string", "type_mismatch"));
        }
    }

    let known: BTreeSet<&str> = schema
        .fields()
        .map(|field| field.source_name.as_str())
        .chain(schema.other_slots())
        .collect();
    let unknown_fields: Vec<String> = state
        .iter()
        .map(|(name, _)| name)
        .filter(|name| !known.contains(name))
        .map(str::to_string)
        .collect();

    ValidationResult {
        valid: errors.is_empty() && unknown_fields.is_empty(),
        errors,
        unknown_fields,
    }
}

fn validate_value(field: &FieldDescriptor, value: &FieldValue) -> Option<ValidationError> {
    match (field.kind, value) {
        (FieldKind::Text, FieldValue::Single(_)) => None,
        (FieldKind::SingleSelect, FieldValue::Single(selected)) => {
            if selected.is_empty() || field.options.is_empty() || field.declares_option(selected) {
                None
            } else {
                Some(base_error(
                    &field.source_name,
                    "invalid option",
                    "invalid_option",
                ))
            }
        }
        (FieldKind::MultiSelectCheckbox, FieldValue::Multi(checked)) => {
            if !field.options.is_empty()
                && checked.iter().any(|option| !field.declares_option(option))
            {
                return Some(base_error(
                    &field.source_name,
                    "invalid option",
                    "invalid_option",
                ));
            }
            match field.max_selected {
                Some(limit) if checked.len() > limit => Some(base_error(
                    &field.source_name,
                    &format!("select up to {limit} options"),
                    "selection_limit",
                )),
                _ => None,
            }
        }
        (FieldKind::MultiSelectCheckbox, FieldValue::Single(_)) => Some(base_error(
            &field.source_name,
            "expected a list of checked options",
            "type_mismatch",
        )),
        (FieldKind::Text | FieldKind::SingleSelect, FieldValue::Multi(_)) => Some(base_error(
            &field.source_name,
            "expected a single value",
            "type_mismatch",
        )),
    }
}

fn base_error(field: &str, message: &str, code: &str) -> ValidationError {
    ValidationError {
        field: field.into(),
        message: message.into(),
        code: code.into(),
    }
}
