//! Form interaction handlers. These mutate a [`FormState`] the way the form
//! widgets would and report any notice the user should see.

use tracing::debug;

use crate::notice::Notice;
use crate::spec::{FieldDescriptor, OTHER_SENTINEL};
use crate::state::{FieldValue, FormState, FormStateProvider};

/// Sets a text input.
pub fn set_text(state: &mut FormState, descriptor: &FieldDescriptor, text: &str) {
    state.set_value(descriptor.source_name.clone(), text);
}

/// Changes a select. Moving away from `"Other"` hides and clears its slot.
pub fn select_option(state: &mut FormState, descriptor: &FieldDescriptor, value: &str) {
    state.set_value(descriptor.source_name.clone(), value);
    if value != OTHER_SENTINEL {
        clear_other_slot(state, descriptor);
    }
}

/// Checks or unchecks one box of a checkbox group.
///
/// Checking past the group's `max_selected` leaves the box unchecked and
/// returns a [`Notice::SelectionLimit`]. Unchecking `"Other"` clears its slot.
pub fn toggle_checkbox(
    state: &mut FormState,
    descriptor: &FieldDescriptor,
    option: &str,
    checked: bool,
) -> Option<Notice> {
    let mut current: Vec<String> = state
        .checked(&descriptor.source_name)
        .into_iter()
        .map(str::to_string)
        .collect();
    let already = current.iter().any(|value| value == option);

    if checked {
        if already {
            return None;
        }
        if let Some(limit) = descriptor.max_selected
            && current.len() + 1 > limit
        {
            debug!(field = %descriptor.source_name, limit, "selection limit reached");
            return Some(Notice::SelectionLimit { limit });
        }
        current.push(option.to_string());
        current.sort_by_key(|value| descriptor.option_index(value).unwrap_or(usize::MAX));
    } else {
        current.retain(|value| value != option);
        if option == OTHER_SENTINEL {
            clear_other_slot(state, descriptor);
        }
    }

    state.set_checked(descriptor.source_name.clone(), current);
    None
}

/// Types into a field's Other slot. Ignored for fields without one.
pub fn set_other_text(state: &mut FormState, descriptor: &FieldDescriptor, text: &str) {
    if let Some(slot) = &descriptor.other_slot {
        state.set_value(slot.clone(), text);
    }
}

/// Clears every value, Other slots included.
pub fn reset(state: &mut FormState) -> Notice {
    state.clear();
    Notice::Cleared
}

fn clear_other_slot(state: &mut FormState, descriptor: &FieldDescriptor) {
    if let Some(slot) = &descriptor.other_slot
        && let Some(FieldValue::Single(text)) = state.entry_mut(slot)
    {
        text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::FieldKind;

    fn users() -> FieldDescriptor {
        FieldDescriptor::choice(
            "Primary users",
            FieldKind::MultiSelectCheckbox,
            "primaryUsers",
            ["A", "B", "C", "Other"],
        )
        .with_limit(2)
    }

    #[test]
    fn checking_past_limit_is_refused() {
        let descriptor = users();
        let mut state = FormState::new();
        assert_eq!(toggle_checkbox(&mut state, &descriptor, "B", true), None);
        assert_eq!(toggle_checkbox(&mut state, &descriptor, "A", true), None);
        assert_eq!(
            toggle_checkbox(&mut state, &descriptor, "C", true),
            Some(Notice::SelectionLimit { limit: 2 })
        );
        assert_eq!(state.checked("primaryUsers"), vec!["A", "B"]);
    }

    #[test]
    fn rechecking_a_checked_box_is_a_no_op() {
        let descriptor = users();
        let mut state = FormState::new();
        toggle_checkbox(&mut state, &descriptor, "A", true);
        toggle_checkbox(&mut state, &descriptor, "B", true);
        assert_eq!(toggle_checkbox(&mut state, &descriptor, "A", true), None);
        assert_eq!(state.checked("primaryUsers"), vec!["A", "B"]);
    }

    #[test]
    fn unchecking_other_clears_slot() {
        let descriptor = users();
        let mut state = FormState::new();
        toggle_checkbox(&mut state, &descriptor, "Other", true);
        set_other_text(&mut state, &descriptor, "Auditors");
        assert_eq!(state.value("primaryUsersOther"), Some("Auditors"));

        toggle_checkbox(&mut state, &descriptor, "Other", false);
        assert_eq!(state.value("primaryUsersOther"), Some(""));
        assert!(state.checked("primaryUsers").is_empty());
    }

    #[test]
    fn leaving_other_on_select_clears_slot() {
        let descriptor = FieldDescriptor::choice(
            "Buyer role",
            FieldKind::SingleSelect,
            "buyer",
            ["CEO", "Other"],
        );
        let mut state = FormState::new();
        select_option(&mut state, &descriptor, "Other");
        set_other_text(&mut state, &descriptor, "Board");
        select_option(&mut state, &descriptor, "Other");
        assert_eq!(state.value("buyerOther"), Some("Board"));

        select_option(&mut state, &descriptor, "CEO");
        assert_eq!(state.value("buyerOther"), Some(""));
    }

    #[test]
    fn reset_empties_everything() {
        let mut state = FormState::new();
        set_text(&mut state, &FieldDescriptor::text("CEO", "ceo"), "Ada");
        state.set_checked("trigger", ["Other"]);
        state.set_value("triggerOther", "Audit");
        assert_eq!(reset(&mut state), Notice::Cleared);
        assert!(state.is_empty());
    }
}
