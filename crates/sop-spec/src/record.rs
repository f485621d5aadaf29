use serde::Serialize;

use crate::resolve::resolve;
use crate::spec::FormSchema;
use crate::state::FormStateProvider;

/// One exported `(label, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordEntry {
    pub label: String,
    pub value: String,
}

/// Ordered export record; order comes from the schema and labels are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    entries: Vec<RecordEntry>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every schema field against the state, in schema order.
    pub fn build<S>(schema: &FormSchema, state: &S) -> Self
    where
        S: FormStateProvider + ?Sized,
    {
        let mut record = Self::new();
        for field in schema.fields() {
            record.push(field.label.clone(), normalize(&resolve(field, state)));
        }
        record
    }

    /// Appends an entry; returns `false` and keeps the first value when the
    /// label is already present.
    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> bool {
        let label = label.into();
        if self.get(&label).is_some() {
            return false;
        }
        self.entries.push(RecordEntry {
            label,
            value: value.into(),
        });
        true
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.value.as_str())
    }

    /// Value for a label, empty when absent.
    pub fn value_or_blank(&self, label: &str) -> &str {
        self.get(label).unwrap_or_default()
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L, V> FromIterator<(L, V)> for Record
where
    L: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (label, value) in iter {
            record.push(label, value);
        }
        record
    }
}

/// Trimmed value, or empty when only whitespace remains.
pub fn normalize(value: &str) -> String {
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FormState;

    #[test]
    fn record_follows_schema_order_with_blanks() {
        let schema = FormSchema::builtin().expect("schema");
        let mut state = FormState::new();
        state.set_value("reusabilityScore", "4");
        state.set_value("companyProjectName", "Acme");

        let record = Record::build(&schema, &state);
        let labels: Vec<_> = record.entries().iter().map(|e| e.label.as_str()).collect();
        let expected: Vec<_> = schema.fields().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, expected);
        assert_eq!(record.get("Company/Project name"), Some("Acme"));
        assert_eq!(record.get("Reusability score"), Some("4"));
        assert_eq!(record.get("CEO"), Some(""));
    }

    #[test]
    fn duplicate_labels_keep_first_value() {
        let mut record = Record::new();
        assert!(record.push("CEO", "Ada"));
        assert!(!record.push("CEO", "Grace"));
        assert_eq!(record.len(), 1);
        assert_eq!(record.value_or_blank("CEO"), "Ada");
        assert_eq!(record.value_or_blank("CFO"), "");
    }
}
