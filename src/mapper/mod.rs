//! Marketplace schema to form field mapping
//!
//! Walks the top-level `properties` of a product type schema and resolves
//! each one into renderable [`FieldDescriptor`]s:
//!
//! 1. [`classifier`] decides whether a property is skipped, a simple wrapped
//!    scalar, a nested record, or a plain node.
//! 2. Wrapped and nested properties go through the [`flattener`]; plain nodes
//!    are read directly with the [`extractor`].
//! 3. [`widget`] picks the input widget for every resulting field.
//!
//! The pipeline is pure: it performs no I/O and keeps no state between calls.

pub mod classifier;
pub mod extractor;
pub mod flattener;
pub mod widget;

pub use classifier::{classify, ExclusionRules, PropertyClass};
pub use extractor::{extract_type_and_enum, TypeInfo};
pub use flattener::flatten;
pub use widget::{apply_widget, infer_widget, parse_select_options, SelectOption, Widget};

use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::{title_case, FieldDescriptor, Grouping, PrimitiveType, SchemaProperty};

/// The schema document is not a JSON object
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid schema: expected a JSON object at the top level, found {found}")]
pub struct InvalidSchemaError {
    pub found: &'static str,
}

impl InvalidSchemaError {
    pub fn for_value(value: &Value) -> Self {
        let found = match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Self { found }
    }
}

/// Maps schema documents to field descriptors with configurable exclusions
#[derive(Clone, Debug, Default)]
pub struct SchemaMapper {
    rules: ExclusionRules,
}

impl SchemaMapper {
    pub fn new(rules: ExclusionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    /// Resolve every top-level property of `schema`, in declaration order.
    pub fn map(&self, schema: &Value) -> Result<Vec<FieldDescriptor>, InvalidSchemaError> {
        let document = schema
            .as_object()
            .ok_or_else(|| InvalidSchemaError::for_value(schema))?;

        let required: HashSet<String> = document
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let Some(properties) = document.get("properties").and_then(Value::as_object) else {
            tracing::debug!("Schema has no properties object; nothing to map");
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(properties.len());

        for (name, node) in properties {
            let property = SchemaProperty::new(node);

            let resolved = match classify(name, &property, &self.rules) {
                PropertyClass::Excluded => {
                    tracing::debug!("Skipping excluded property {}", name);
                    continue;
                }
                PropertyClass::Simple | PropertyClass::Complex => {
                    flatten(name, &property, &required)
                }
                PropertyClass::Plain => vec![plain_field(name, &property, &required)],
            };

            for field in resolved {
                if !seen.insert(field.name.clone()) {
                    tracing::warn!("Dropping duplicate field name {} from property {}", field.name, name);
                    continue;
                }
                fields.push(apply_widget(field));
            }
        }

        Ok(fields)
    }
}

/// Map a schema document with the default exclusion rules.
pub fn build_field_descriptors(schema: &Value) -> Result<Vec<FieldDescriptor>, InvalidSchemaError> {
    SchemaMapper::default().map(schema)
}

/// A single field read straight from a property node.
fn plain_field(name: &str, property: &SchemaProperty<'_>, required: &HashSet<String>) -> FieldDescriptor {
    let TypeInfo { type_name, enum_values, enum_labels } = extract_type_and_enum(property);

    FieldDescriptor {
        name: name.to_string(),
        display_name: property
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| title_case(name)),
        description: property.description().map(str::to_string),
        example: property.first_example(),
        primitive_type: PrimitiveType::from_schema_type(&type_name),
        required: required.contains(name),
        enum_values,
        enum_labels,
        min_length: property.min_length(),
        max_length: property.max_length(),
        pattern: property.pattern().map(str::to_string),
        grouping: Grouping::for_property_name(name).label().to_string(),
        ..Default::default()
    }
}
