use serde_json::{Map, Value, json};

use crate::spec::{FieldKind, FormSchema};

/// JSON Schema describing a valid state document for `schema`.
pub fn generate(schema: &FormSchema) -> Value {
    let mut properties = Map::new();

    for field in schema.fields() {
        let mut property = Map::new();
        property.insert("title".into(), Value::String(field.label.clone()));
        match field.kind {
            FieldKind::Text => {
                property.insert("type".into(), Value::String("string".into()));
            }
            FieldKind::SingleSelect => {
                property.insert("type".into(), Value::String("string".into()));
                if !field.options.is_empty() {
                    let mut choices = vec![Value::String(String::new())];
                    choices.extend(field.options.iter().cloned().map(Value::String));
                    property.insert("enum".into(), Value::Array(choices));
                }
            }
            FieldKind::MultiSelectCheckbox => {
                property.insert("type".into(), Value::String("array".into()));
                property.insert("uniqueItems".into(), Value::Bool(true));
                let mut items = Map::new();
                items.insert("type".into(), Value::String("string".into()));
                if !field.options.is_empty() {
                    items.insert(
                        "enum".into(),
                        Value::Array(field.options.iter().cloned().map(Value::String).collect()),
                    );
                }
                property.insert("items".into(), Value::Object(items));
                if let Some(limit) = field.max_selected {
                    property.insert("maxItems".into(), json!(limit));
                }
            }
        }
        properties.insert(field.source_name.clone(), Value::Object(property));

        if let Some(slot) = &field.other_slot {
            properties.insert(
                slot.clone(),
                json!({
                    "title": format!("{} (Other)", field.label),
                    "type": "string",
                }),
            );
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": schema.title,
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_groups_carry_limits_and_options() {
        let schema = FormSchema::builtin().expect("schema");
        let generated = generate(&schema);
        let props = generated["properties"].as_object().expect("properties");
        assert_eq!(props.len(), 42 + 12);
        assert_eq!(props["blockers"]["type"], "array");
        assert_eq!(props["blockers"]["maxItems"], 3);
        assert!(props["trigger"].get("maxItems").is_none());
        assert_eq!(props["ceo"]["type"], "string");
        assert_eq!(props["buyerOther"]["type"], "string");
        assert_eq!(props["buyer"]["enum"][0], "");
    }
}
