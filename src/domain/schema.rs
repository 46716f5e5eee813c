//! Read-only view over marketplace schema nodes.
//!
//! Amazon product type schemas are large JSON Schema documents whose nodes are
//! only loosely typed. [`SchemaProperty`] wraps a borrowed [`Value`] and exposes
//! the handful of keywords the field mapper cares about. A key that is missing
//! or carries an unexpected JSON type simply reads as absent.

use serde_json::{Map, Value};

/// Sub-property names Amazon attaches to every attribute envelope.
pub const METADATA_PROPERTIES: [&str; 2] = ["language_tag", "marketplace_id"];

/// Returns true for envelope bookkeeping keys that never become form fields.
pub fn is_metadata_property(name: &str) -> bool {
    METADATA_PROPERTIES.contains(&name)
}

/// Borrowed view of one schema property node.
#[derive(Clone, Copy, Debug)]
pub struct SchemaProperty<'a> {
    node: &'a Value,
}

impl<'a> SchemaProperty<'a> {
    pub fn new(node: &'a Value) -> Self {
        Self { node }
    }

    /// The underlying JSON node.
    pub fn raw(&self) -> &'a Value {
        self.node
    }

    fn str_key(&self, key: &str) -> Option<&'a str> {
        self.node.get(key).and_then(Value::as_str)
    }

    fn u64_key(&self, key: &str) -> Option<u64> {
        self.node.get(key).and_then(Value::as_u64)
    }

    /// The declared `type` keyword, if it is a string.
    pub fn type_name(&self) -> Option<&'a str> {
        self.str_key("type")
    }

    /// Declared type with the permissive `"string"` default.
    pub fn type_or_default(&self) -> &'a str {
        self.type_name().unwrap_or("string")
    }

    pub fn is_type(&self, expected: &str) -> bool {
        self.type_name() == Some(expected)
    }

    pub fn title(&self) -> Option<&'a str> {
        self.str_key("title")
    }

    pub fn description(&self) -> Option<&'a str> {
        self.str_key("description")
    }

    pub fn pattern(&self) -> Option<&'a str> {
        self.str_key("pattern")
    }

    pub fn min_length(&self) -> Option<u64> {
        self.u64_key("minLength")
    }

    pub fn max_length(&self) -> Option<u64> {
        self.u64_key("maxLength")
    }

    /// First entry of `examples`, rendered as display text.
    pub fn first_example(&self) -> Option<String> {
        self.node
            .get("examples")
            .and_then(Value::as_array)
            .and_then(|examples| examples.first())
            .map(render_scalar)
    }

    /// Allowed values, when `enum` is a non-empty array.
    pub fn enum_values(&self) -> Option<&'a Vec<Value>> {
        self.node
            .get("enum")
            .and_then(Value::as_array)
            .filter(|values| !values.is_empty())
    }

    /// Display labels parallel to [`Self::enum_values`].
    pub fn enum_names(&self) -> Option<Vec<String>> {
        self.node
            .get("enumNames")
            .and_then(Value::as_array)
            .map(|names| names.iter().map(render_scalar).collect())
    }

    /// The `items` sub-node of an array property.
    pub fn items(&self) -> Option<SchemaProperty<'a>> {
        self.node.get("items").filter(|v| v.is_object()).map(SchemaProperty::new)
    }

    /// The `properties` map of this node, in declaration order.
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.node.get("properties").and_then(Value::as_object)
    }

    /// `items.properties`, the sub-properties of an attribute envelope.
    pub fn item_properties(&self) -> Option<&'a Map<String, Value>> {
        self.items().and_then(|items| items.properties())
    }

    /// Looks up one entry of `items.properties`.
    pub fn item_property(&self, name: &str) -> Option<SchemaProperty<'a>> {
        self.item_properties()
            .and_then(|props| props.get(name))
            .map(SchemaProperty::new)
    }
}

/// Renders a JSON scalar the way form widgets display it: strings unquoted,
/// everything else as its JSON text.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
