use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Option value signalling that the real answer lives in a companion text slot.
pub const OTHER_SENTINEL: &str = "Other";

/// How a field reads its raw value from the form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    SingleSelect,
    MultiSelectCheckbox,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::SingleSelect => "single_select",
            FieldKind::MultiSelectCheckbox => "multi_select_checkbox",
        }
    }

    /// Whether the field picks from a declared option set.
    pub fn is_choice(&self) -> bool {
        !matches!(self, FieldKind::Text)
    }
}

/// Static schema entry for one exported field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDescriptor {
    /// Record key and report label.
    pub label: String,
    pub kind: FieldKind,
    /// Form field or checkbox group name used to look up raw values.
    #[serde(rename = "source")]
    pub source_name: String,
    /// Declared options, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Free-text slot consulted when the `"Other"` option is picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_slot: Option<String>,
    /// Upper bound on checked boxes for checkbox groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selected: Option<usize>,
    /// Currency selects keep an already-substituted `"Other: …"` value as is.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub currency: bool,
}

impl FieldDescriptor {
    pub fn text(label: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: FieldKind::Text,
            source_name: source_name.into(),
            options: Vec::new(),
            other_slot: None,
            max_selected: None,
            currency: false,
        }
    }

    /// Builds a choice field. An Other slot named `<source>Other` is attached
    /// when the options include the sentinel.
    pub fn choice<I, S>(
        label: impl Into<String>,
        kind: FieldKind,
        source_name: impl Into<String>,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source_name = source_name.into();
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let other_slot = options
            .iter()
            .any(|option| option == OTHER_SENTINEL)
            .then(|| default_other_slot(&source_name));
        Self {
            label: label.into(),
            kind,
            source_name,
            options,
            other_slot,
            max_selected: None,
            currency: false,
        }
    }

    pub fn with_limit(mut self, max_selected: usize) -> Self {
        self.max_selected = Some(max_selected);
        self
    }

    pub fn as_currency(mut self) -> Self {
        self.currency = true;
        self
    }

    pub fn offers_other(&self) -> bool {
        self.options.iter().any(|option| option == OTHER_SENTINEL)
    }

    pub fn declares_option(&self, option: &str) -> bool {
        self.options.iter().any(|declared| declared == option)
    }

    /// Position of an option in declaration order.
    pub fn option_index(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|declared| declared == option)
    }
}

/// Conventional Other slot identifier for a field.
pub fn default_other_slot(source_name: &str) -> String {
    format!("{source_name}{OTHER_SENTINEL}")
}
