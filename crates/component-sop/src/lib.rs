use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use sop_spec::{
    ExportFormat, FieldDescriptor, FieldKind, FormSchema, FormState, Notice, NOTICE_DURATION,
    OutputDocument, SchemaError, export as sop_export, reset, resolve_other_visibility,
    select_option, set_other_text, set_text, state_schema, toggle_checkbox, validate,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("invalid form schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("failed to parse form state: {0}")]
    StateParse(#[source] serde_json::Error),
    #[error("field '{0}' is not part of the form")]
    UnknownField(String),
    #[error("field '{field}' is a {kind} field")]
    WrongKind { field: String, kind: &'static str },
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_schema_json: Option<String>,
}

fn load_form_schema(config_json: &str) -> Result<FormSchema, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    match config.form_schema_json.as_deref() {
        Some(schema_json) => Ok(FormSchema::from_json(schema_json)?),
        None => Ok(FormSchema::builtin()?),
    }
}

fn parse_state(state_json: &str) -> Result<FormState, ComponentError> {
    if state_json.trim().is_empty() {
        return Ok(FormState::new());
    }
    FormState::from_json(state_json).map_err(ComponentError::StateParse)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => {
            warn!(error = %err, "component call failed");
            json!({ "error": err.to_string() }).to_string()
        }
    }
}

fn find_field<'a>(schema: &'a FormSchema, field: &str) -> Result<&'a FieldDescriptor, ComponentError> {
    schema
        .field(field)
        .ok_or_else(|| ComponentError::UnknownField(field.to_string()))
}

fn expect_kind(descriptor: &FieldDescriptor, kind: FieldKind) -> Result<(), ComponentError> {
    if descriptor.kind == kind {
        Ok(())
    } else {
        Err(ComponentError::WrongKind {
            field: descriptor.source_name.clone(),
            kind: descriptor.kind.as_str(),
        })
    }
}

fn notice_value(notice: Option<&Notice>) -> Value {
    match notice {
        Some(notice) => json!({
            "message": notice.to_string(),
            "duration_ms": NOTICE_DURATION.as_millis() as u64,
            "detail": notice,
        }),
        None => Value::Null,
    }
}

fn event_response(
    schema: &FormSchema,
    state: &FormState,
    notice: Option<&Notice>,
) -> Value {
    json!({
        "state": state.to_value(),
        "other_visibility": resolve_other_visibility(schema, state),
        "notice": notice_value(notice),
    })
}

fn document_value(document: &OutputDocument) -> Result<Value, ComponentError> {
    serde_json::to_value(document).map_err(ComponentError::JsonEncode)
}

/// Returns the active form schema as JSON.
pub fn describe(config_json: &str) -> String {
    respond(
        load_form_schema(config_json)
            .and_then(|schema| serde_json::to_value(schema).map_err(ComponentError::JsonEncode)),
    )
}

/// JSON Schema of a state document for the active form.
pub fn get_state_schema(config_json: &str) -> String {
    respond(load_form_schema(config_json).map(|schema| state_schema(&schema)))
}

/// Blank state: every field and Other slot present and empty.
pub fn get_blank_state(config_json: &str) -> String {
    respond(load_form_schema(config_json).map(|schema| FormState::blank(&schema).to_value()))
}

pub fn validate_state(config_json: &str, state_json: &str) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let state = parse_state(state_json)?;
        serde_json::to_value(validate(&schema, &state)).map_err(ComponentError::JsonEncode)
    }))
}

/// Exports the state as `{ "content", "filename", "mime_type", "notice" }`.
pub fn export(config_json: &str, state_json: &str, format: ExportFormat) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let state = parse_state(state_json)?;
        let document = sop_export(&schema, &state, format);
        debug!(filename = document.filename(), "exported document");
        let notice = Notice::Downloaded {
            filename: document.filename().to_string(),
        };
        let mut value = document_value(&document)?;
        if let Value::Object(map) = &mut value {
            map.insert("notice".into(), notice_value(Some(&notice)));
        }
        Ok(value)
    }))
}

pub fn export_csv(config_json: &str, state_json: &str) -> String {
    export(config_json, state_json, ExportFormat::Csv)
}

pub fn export_text(config_json: &str, state_json: &str) -> String {
    export(config_json, state_json, ExportFormat::Text)
}

/// Visibility of every Other slot for the given state.
pub fn other_visibility(config_json: &str, state_json: &str) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let state = parse_state(state_json)?;
        serde_json::to_value(resolve_other_visibility(&schema, &state))
            .map_err(ComponentError::JsonEncode)
    }))
}

/// Types into a text input.
pub fn on_text_input(config_json: &str, state_json: &str, field: &str, text: &str) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let mut state = parse_state(state_json)?;
        let descriptor = find_field(&schema, field)?;
        expect_kind(descriptor, FieldKind::Text)?;
        set_text(&mut state, descriptor, text);
        Ok(event_response(&schema, &state, None))
    }))
}

/// Changes a select.
pub fn on_select(config_json: &str, state_json: &str, field: &str, value: &str) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let mut state = parse_state(state_json)?;
        let descriptor = find_field(&schema, field)?;
        expect_kind(descriptor, FieldKind::SingleSelect)?;
        select_option(&mut state, descriptor, value);
        Ok(event_response(&schema, &state, None))
    }))
}

/// Checks or unchecks a box; may answer with a selection-limit notice.
pub fn on_checkbox(
    config_json: &str,
    state_json: &str,
    field: &str,
    option: &str,
    checked: bool,
) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let mut state = parse_state(state_json)?;
        let descriptor = find_field(&schema, field)?;
        expect_kind(descriptor, FieldKind::MultiSelectCheckbox)?;
        let notice = toggle_checkbox(&mut state, descriptor, option, checked);
        Ok(event_response(&schema, &state, notice.as_ref()))
    }))
}

/// Types into the Other slot of a select or checkbox group.
pub fn on_other_text(config_json: &str, state_json: &str, field: &str, text: &str) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let mut state = parse_state(state_json)?;
        let descriptor = find_field(&schema, field)?;
        set_other_text(&mut state, descriptor, text);
        Ok(event_response(&schema, &state, None))
    }))
}

/// Clears the whole form.
pub fn on_reset(config_json: &str, state_json: &str) -> String {
    respond(load_form_schema(config_json).and_then(|schema| {
        let mut state = parse_state(state_json)?;
        if state.iter().next().is_none() {
            state = FormState::blank(&schema);
        }
        let notice = reset(&mut state);
        Ok(event_response(&schema, &state, Some(&notice)))
    }))
}

/// Wraps a schema document into a component config string.
pub fn config_for_schema(schema_json: &str) -> String {
    let mut map = Map::new();
    map.insert(
        "form_schema_json".into(),
        Value::String(schema_json.to_string()),
    );
    Value::Object(map).to_string()
}
