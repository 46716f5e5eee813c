//! Primitive type and enum extraction.
//!
//! Amazon nests enumerations inside the attribute envelope, either on an inner
//! key literally named `type` or on the inner `value`. Both shapes normalise to
//! one flat [`TypeInfo`].

use serde_json::Value;

use crate::domain::SchemaProperty;

/// Type and enumeration of one property
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TypeInfo {
    /// Raw `type` keyword, `"string"` when absent
    pub type_name: String,
    pub enum_values: Option<Vec<Value>>,
    pub enum_labels: Option<Vec<String>>,
}

impl TypeInfo {
    fn from_node(node: &SchemaProperty<'_>) -> Self {
        Self {
            type_name: node.type_or_default().to_string(),
            enum_values: node.enum_values().cloned(),
            enum_labels: node.enum_names(),
        }
    }
}

pub fn extract_type_and_enum(property: &SchemaProperty<'_>) -> TypeInfo {
    if property.is_type("array") {
        let enum_carrier = ["type", "value"]
            .into_iter()
            .filter_map(|key| property.item_property(key))
            .find(|inner| inner.enum_values().is_some());

        if let Some(inner) = enum_carrier {
            return TypeInfo::from_node(&inner);
        }
    }

    TypeInfo::from_node(property)
}
