use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::spec::{FieldKind, FormSchema};

/// Raw value of one form entry: a text/select value or a checkbox group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// Lenient conversion from JSON. `null` and objects read as absent,
    /// numbers and booleans as their literal text.
    pub fn from_json_value(value: Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(FieldValue::Single(text)),
            Value::Number(number) => Some(FieldValue::Single(number.to_string())),
            Value::Bool(flag) => Some(FieldValue::Single(flag.to_string())),
            Value::Array(items) => Some(FieldValue::Multi(
                items.into_iter().filter_map(scalar_text).collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Single(value) => value.trim().is_empty(),
            FieldValue::Multi(values) => values.is_empty(),
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Read access to the current form values.
///
/// Lookups are total: anything missing or of the wrong shape reads as absent.
pub trait FormStateProvider {
    /// Value of a text input or select.
    fn value(&self, name: &str) -> Option<&str>;
    /// Checked options of a checkbox group, in the order the provider holds them.
    fn checked(&self, name: &str) -> Vec<&str>;
    /// Contents of a free-text Other slot.
    fn other(&self, slot: &str) -> Option<&str> {
        self.value(slot)
    }
}

/// In-memory form state keyed by field name, Other slots included.
///
/// Serialized as a flat JSON object:
/// `{ "hqIn": "Berlin", "trigger": ["Other"], "triggerOther": "Audit" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct FormState {
    values: BTreeMap<String, FieldValue>,
}

impl<'de> Deserialize<'de> for FormState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let values = raw
            .into_iter()
            .filter_map(|(name, value)| FieldValue::from_json_value(value).map(|value| (name, value)))
            .collect();
        Ok(FormState { values })
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()))
    }

    /// Every field and Other slot of the form, present and empty.
    pub fn blank(schema: &FormSchema) -> Self {
        let mut state = Self::new();
        for field in schema.fields() {
            let empty = match field.kind {
                FieldKind::MultiSelectCheckbox => FieldValue::Multi(Vec::new()),
                FieldKind::Text | FieldKind::SingleSelect => FieldValue::Single(String::new()),
            };
            state.values.insert(field.source_name.clone(), empty);
            if let Some(slot) = &field.other_slot {
                state
                    .values
                    .insert(slot.clone(), FieldValue::Single(String::new()));
            }
        }
        state
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), FieldValue::Single(value.into()));
    }

    pub fn set_checked<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.insert(
            name.into(),
            FieldValue::Multi(values.into_iter().map(Into::into).collect()),
        );
    }

    /// Empties every entry while keeping its shape.
    pub fn clear(&mut self) {
        for value in self.values.values_mut() {
            match value {
                FieldValue::Single(text) => text.clear(),
                FieldValue::Multi(values) => values.clear(),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(FieldValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.values.get_mut(name)
    }
}

impl FormStateProvider for FormState {
    fn value(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Single(value) => Some(value.as_str()),
            FieldValue::Multi(_) => None,
        }
    }

    fn checked(&self, name: &str) -> Vec<&str> {
        match self.values.get(name) {
            Some(FieldValue::Multi(values)) => values.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}
