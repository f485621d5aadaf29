use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::field::{FieldDescriptor, FieldKind};
use crate::spec::report::{ReportLine, ReportSection, Sectioning};

const BUILTIN_SOP_FORM: &str = include_str!("../../forms/sop_form.json");

/// Problems detected while loading or checking a form schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse form schema: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("duplicate field label '{0}'")]
    DuplicateLabel(String),
    #[error("duplicate source name '{0}'")]
    DuplicateSource(String),
    #[error("field '{0}' declares an Other slot but offers no \"Other\" option")]
    UnexpectedOtherSlot(String),
    #[error("field '{0}' offers \"Other\" but declares no Other slot")]
    MissingOtherSlot(String),
    #[error("Other slot '{0}' collides with another field or slot")]
    SlotCollision(String),
    #[error("field '{0}' is marked as a currency but is not a single select")]
    CurrencyNotSelect(String),
    #[error("report line references unknown field label '{0}'")]
    UnknownReportLabel(String),
    #[error("section '{section}' has a report layout that leaves out field '{label}'")]
    UnreportedField { section: String, label: String },
    #[error("filename field '{0}' is not part of the form")]
    UnknownFilenameField(String),
}

/// A titled group of fields; drives both record order and report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SectionSpec {
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
    /// Explicit report layout. When empty, every field gets its own line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub report: Vec<ReportLine>,
}

/// Top-level export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSchema {
    pub id: String,
    pub title: String,
    pub version: String,
    /// Source name of the field the download filename is derived from.
    pub filename_field: String,
    pub sections: Vec<SectionSpec>,
}

impl FormSchema {
    /// The bundled SOP intake form.
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_json(BUILTIN_SOP_FORM)
    }

    /// Parses and checks a schema document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: FormSchema = serde_json::from_str(json).map_err(SchemaError::Parse)?;
        schema.check()?;
        Ok(schema)
    }

    /// All fields in record order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, source_name: &str) -> Option<&FieldDescriptor> {
        self.fields()
            .find(|field| field.source_name == source_name)
    }

    /// Every Other slot declared by the form, in field order.
    pub fn other_slots(&self) -> impl Iterator<Item = &str> {
        self.fields().filter_map(|field| field.other_slot.as_deref())
    }

    /// Enforces label/source uniqueness, the Other-slot invariant, currency
    /// kinds, full report coverage, and that the filename field exists.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut labels = BTreeSet::new();
        let mut sources = BTreeSet::new();

        for field in self.fields() {
            if !labels.insert(field.label.as_str()) {
                return Err(SchemaError::DuplicateLabel(field.label.clone()));
            }
            if !sources.insert(field.source_name.as_str()) {
                return Err(SchemaError::DuplicateSource(field.source_name.clone()));
            }

            let offers_other = field.kind.is_choice() && field.offers_other();
            match (&field.other_slot, offers_other) {
                (Some(_), false) => {
                    return Err(SchemaError::UnexpectedOtherSlot(field.label.clone()));
                }
                (None, true) => {
                    return Err(SchemaError::MissingOtherSlot(field.label.clone()));
                }
                _ => {}
            }

            if field.currency && field.kind != FieldKind::SingleSelect {
                return Err(SchemaError::CurrencyNotSelect(field.label.clone()));
            }
        }

        let mut slots = BTreeSet::new();
        for slot in self.other_slots() {
            if sources.contains(slot) || !slots.insert(slot) {
                return Err(SchemaError::SlotCollision(slot.to_string()));
            }
        }

        for section in &self.sections {
            let mut reported = BTreeSet::new();
            for label in section.report.iter().flat_map(ReportLine::referenced_labels) {
                if !labels.contains(label) {
                    return Err(SchemaError::UnknownReportLabel(label.to_string()));
                }
                reported.insert(label);
            }
            if section.report.is_empty() {
                continue;
            }
            if let Some(field) = section
                .fields
                .iter()
                .find(|field| !reported.contains(field.label.as_str()))
            {
                return Err(SchemaError::UnreportedField {
                    section: section.title.clone(),
                    label: field.label.clone(),
                });
            }
        }

        if !sources.contains(self.filename_field.as_str()) {
            return Err(SchemaError::UnknownFilenameField(
                self.filename_field.clone(),
            ));
        }

        Ok(())
    }

    /// Text report layout derived from the sections.
    pub fn sectioning(&self) -> Sectioning {
        let sections = self
            .sections
            .iter()
            .map(|section| ReportSection {
                title: section.title.clone(),
                lines: if section.report.is_empty() {
                    section
                        .fields
                        .iter()
                        .map(|field| ReportLine::field(field.label.clone()))
                        .collect()
                } else {
                    section.report.clone()
                },
            })
            .collect();

        Sectioning {
            title: self.title.clone(),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with(fields: Vec<FieldDescriptor>) -> FormSchema {
        FormSchema {
            id: "test".into(),
            title: "Test".into(),
            version: "1.0.0".into(),
            filename_field: "name".into(),
            sections: vec![SectionSpec {
                title: "Main".into(),
                fields,
                report: vec![],
            }],
        }
    }

    #[test]
    fn builtin_form_passes_checks() {
        let schema = FormSchema::builtin().expect("builtin schema");
        assert_eq!(schema.fields().count(), 42);
        assert_eq!(schema.other_slots().count(), 12);
        assert_eq!(schema.filename_field, "companyProjectName");
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let schema = schema_with(vec![
            FieldDescriptor::text("Name", "name"),
            FieldDescriptor::text("Name", "alias"),
        ]);
        assert!(matches!(schema.check(), Err(SchemaError::DuplicateLabel(label)) if label == "Name"));
    }

    #[test]
    fn other_slot_requires_other_option() {
        let mut field =
            FieldDescriptor::choice("Buyer", FieldKind::SingleSelect, "buyer", ["CEO", "CFO"]);
        field.other_slot = Some("buyerOther".into());
        let schema = schema_with(vec![FieldDescriptor::text("Name", "name"), field]);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::UnexpectedOtherSlot(_))
        ));

        let mut field =
            FieldDescriptor::choice("Buyer", FieldKind::SingleSelect, "buyer", ["CEO", "Other"]);
        field.other_slot = None;
        let schema = schema_with(vec![FieldDescriptor::text("Name", "name"), field]);
        assert!(matches!(schema.check(), Err(SchemaError::MissingOtherSlot(_))));
    }

    #[test]
    fn text_fields_cannot_carry_other_slots() {
        let mut field = FieldDescriptor::text("Name", "name");
        field.other_slot = Some("nameOther".into());
        let schema = schema_with(vec![field]);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::UnexpectedOtherSlot(_))
        ));
    }

    #[test]
    fn report_lines_must_reference_known_labels() {
        let mut schema = schema_with(vec![FieldDescriptor::text("Name", "name")]);
        schema.sections[0].report = vec![ReportLine::MetricPair {
            label: "Metric".into(),
            before: "Name".into(),
            after: "Missing".into(),
        }];
        assert!(matches!(
            schema.check(),
            Err(SchemaError::UnknownReportLabel(label)) if label == "Missing"
        ));
    }

    #[test]
    fn currency_flag_requires_single_select() {
        let field = FieldDescriptor::text("Revenue currency", "revenueCurrency").as_currency();
        let schema = schema_with(vec![FieldDescriptor::text("Name", "name"), field]);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::CurrencyNotSelect(label)) if label == "Revenue currency"
        ));
    }

    #[test]
    fn other_slots_cannot_shadow_fields() {
        let buyer =
            FieldDescriptor::choice("Buyer", FieldKind::SingleSelect, "buyer", ["CEO", "Other"]);
        let schema = schema_with(vec![
            FieldDescriptor::text("Name", "name"),
            FieldDescriptor::text("Buyer notes", "buyerOther"),
            buyer,
        ]);
        assert!(matches!(
            schema.check(),
            Err(SchemaError::SlotCollision(slot)) if slot == "buyerOther"
        ));
    }

    #[test]
    fn explicit_report_must_cover_every_field() {
        let mut schema = schema_with(vec![
            FieldDescriptor::text("Name", "name"),
            FieldDescriptor::text("CEO", "ceo"),
        ]);
        schema.sections[0].report = vec![ReportLine::field("Name")];
        assert!(matches!(
            schema.check(),
            Err(SchemaError::UnreportedField { label, .. }) if label == "CEO"
        ));
    }

    #[test]
    fn filename_field_must_exist() {
        let mut schema = schema_with(vec![FieldDescriptor::text("Name", "name")]);
        schema.filename_field = "company".into();
        assert!(matches!(
            schema.check(),
            Err(SchemaError::UnknownFilenameField(_))
        ));
    }

    #[test]
    fn sectioning_defaults_to_one_line_per_field() {
        let schema = schema_with(vec![
            FieldDescriptor::text("Name", "name"),
            FieldDescriptor::text("CEO", "ceo"),
        ]);
        let sectioning = schema.sectioning();
        assert_eq!(sectioning.title, "Test");
        assert_eq!(
            sectioning.sections[0].lines,
            vec![ReportLine::field("Name"), ReportLine::field("CEO")]
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            FormSchema::from_json("{ not json"),
            Err(SchemaError::Parse(_))
        ));
    }
}
