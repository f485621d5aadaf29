use std::collections::BTreeSet;

use tracing::debug;

use crate::spec::{FieldDescriptor, FieldKind, OTHER_SENTINEL};
use crate::state::FormStateProvider;

/// Prefix carried by a substituted Other value.
pub const OTHER_PREFIX: &str = "Other:";

/// Separator between checked options of a checkbox group.
pub const MULTI_SEPARATOR: &str = ", ";

/// Resolves a field to its canonical string. Never fails: missing inputs
/// resolve to the empty string.
pub fn resolve<S>(descriptor: &FieldDescriptor, state: &S) -> String
where
    S: FormStateProvider + ?Sized,
{
    match descriptor.kind {
        FieldKind::Text => state
            .value(&descriptor.source_name)
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        FieldKind::SingleSelect => {
            let selected = state.value(&descriptor.source_name).unwrap_or_default();
            resolve_option(descriptor, selected, state)
        }
        FieldKind::MultiSelectCheckbox => {
            let checked = declared_order(descriptor, state.checked(&descriptor.source_name));
            checked
                .into_iter()
                .map(|option| resolve_option(descriptor, option, state))
                .collect::<Vec<_>>()
                .join(MULTI_SEPARATOR)
        }
    }
}

/// Applies the Other substitution to one picked option. Only the bare
/// sentinel is substituted, so a value that already reads `"Other: ..."`
/// (a pre-resolved currency, say) passes through unchanged.
pub fn resolve_option<S>(descriptor: &FieldDescriptor, option: &str, state: &S) -> String
where
    S: FormStateProvider + ?Sized,
{
    if option != OTHER_SENTINEL {
        return option.to_string();
    }

    let other_text = descriptor
        .other_slot
        .as_deref()
        .and_then(|slot| state.other(slot))
        .map(str::trim)
        .filter(|text| !text.is_empty());

    match other_text {
        Some(text) => {
            debug!(field = %descriptor.source_name, "substituting Other text");
            format!("{OTHER_PREFIX} {text}")
        }
        None => OTHER_SENTINEL.to_string(),
    }
}

/// Orders checked options the way they are declared on the form. Options the
/// schema does not declare keep their relative order after the declared ones.
/// Each option is listed once, at its first occurrence.
fn declared_order<'a>(descriptor: &FieldDescriptor, checked: Vec<&'a str>) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    let mut unique: Vec<&str> = checked
        .into_iter()
        .filter(|option| seen.insert(*option))
        .collect();
    unique.sort_by_key(|option| descriptor.option_index(option).unwrap_or(usize::MAX));
    unique
}
