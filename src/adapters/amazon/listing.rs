//! Listing attribute envelopes.
//!
//! The inverse of the field mapper: submitted form values keyed by field name
//! are folded back into Amazon's `[{ value, marketplace_id }]` attribute
//! envelopes. Flattened fields regroup under their parent attribute using the
//! descriptor's `source_path`.

use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::domain::{render_scalar, FieldDescriptor, PrimitiveType};

/// Build the `attributes` object of a listing submission.
///
/// Fields without a submitted value (or with a blank one) are left out.
pub fn build_listing_attributes(
    fields: &[FieldDescriptor],
    values: &HashMap<String, String>,
    marketplace_id: &str,
    language_tag: &str,
) -> Map<String, Value> {
    let mut attributes = Map::new();
    let mut groups: Vec<(String, Map<String, Value>)> = Vec::new();

    for field in fields {
        let Some(raw) = values.get(&field.name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };
        let value = coerce_value(field, raw);

        match field.source_path.as_slice() {
            [parent, sub] => {
                group_entry(&mut groups, parent, marketplace_id).insert(sub.clone(), value);
            }
            [parent, sub, nested] => {
                let inner = group_entry(&mut groups, parent, marketplace_id)
                    .entry(sub.clone())
                    .or_insert_with(|| json!([{}]));
                if let Some(Value::Object(inner)) = inner.get_mut(0) {
                    inner.insert(nested.clone(), value);
                }
            }
            _ => {
                let mut entry = Map::new();
                let is_text = value.is_string();
                entry.insert("value".to_string(), value);
                if is_text {
                    entry.insert("language_tag".to_string(), json!(language_tag));
                }
                entry.insert("marketplace_id".to_string(), json!(marketplace_id));
                attributes.insert(field.name.clone(), Value::Array(vec![Value::Object(entry)]));
            }
        }
    }

    for (parent, entry) in groups {
        attributes.insert(parent, Value::Array(vec![Value::Object(entry)]));
    }

    attributes
}

/// The single envelope entry collecting `parent`'s flattened fields.
fn group_entry<'a>(
    groups: &'a mut Vec<(String, Map<String, Value>)>,
    parent: &str,
    marketplace_id: &str,
) -> &'a mut Map<String, Value> {
    let idx = match groups.iter().position(|(name, _)| name == parent) {
        Some(idx) => idx,
        None => {
            let mut entry = Map::new();
            entry.insert("marketplace_id".to_string(), json!(marketplace_id));
            groups.push((parent.to_string(), entry));
            groups.len() - 1
        }
    };
    &mut groups[idx].1
}

/// Convert submitted text to the JSON type the schema expects. Enum fields
/// map back to the matching enum value; unparseable input stays text.
pub fn coerce_value(field: &FieldDescriptor, raw: &str) -> Value {
    if let Some(values) = &field.enum_values {
        if let Some(matching) = values.iter().find(|v| render_scalar(v) == raw) {
            return matching.clone();
        }
    }

    match field.primitive_type {
        PrimitiveType::Integer => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| json!(raw)),
        PrimitiveType::Number => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| json!(raw)),
        PrimitiveType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Value::Bool(true),
            "false" | "0" | "no" | "off" => Value::Bool(false),
            _ => json!(raw),
        },
        PrimitiveType::String => json!(raw),
    }
}
