use crate::spec::{FieldKind, FormSchema, OTHER_SENTINEL};
use crate::state::FormStateProvider;

/// Other slot identifier → whether its text input is shown.
pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// A slot is shown while its field has `"Other"` selected or checked.
pub fn resolve_other_visibility<S>(schema: &FormSchema, state: &S) -> VisibilityMap
where
    S: FormStateProvider + ?Sized,
{
    let mut map = VisibilityMap::new();

    for field in schema.fields() {
        let Some(slot) = &field.other_slot else {
            continue;
        };
        let visible = match field.kind {
            FieldKind::SingleSelect => state.value(&field.source_name) == Some(OTHER_SENTINEL),
            FieldKind::MultiSelectCheckbox => state
                .checked(&field.source_name)
                .contains(&OTHER_SENTINEL),
            FieldKind::Text => false,
        };
        map.insert(slot.clone(), visible);
    }

    map
}
