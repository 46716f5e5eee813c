//! Resolved form field descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Primitive Type
// ============================================================================

/// Primitive value kind of a resolved field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
}

impl PrimitiveType {
    /// Parse a schema `type` keyword. Anything that is not one of the four
    /// primitive tags (including `array` and `object`) reads as `String`.
    pub fn from_schema_type(type_name: &str) -> Self {
        match type_name {
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            _ => Self::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Widget Kind
// ============================================================================

/// Abstract input widget a field renders as
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Select,
    #[default]
    Text,
    Textarea,
    Decimal,
    Checkbox,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Decimal => "decimal",
            Self::Checkbox => "checkbox",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Grouping
// ============================================================================

/// Display category assigned to top-level properties by name keywords
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grouping {
    BrandInformation,
    PhysicalAttributes,
    ImagesAndMedia,
    Pricing,
    ProductDetails,
}

impl Grouping {
    /// Pick a category from keywords in the property name. First match wins.
    pub fn for_property_name(name: &str) -> Self {
        let name = name.to_lowercase();
        let has = |keywords: &[&str]| keywords.iter().any(|k| name.contains(k));

        if has(&["brand", "manufacturer"]) {
            Self::BrandInformation
        } else if has(&["dimension", "weight"]) {
            Self::PhysicalAttributes
        } else if has(&["image", "media"]) {
            Self::ImagesAndMedia
        } else if has(&["price", "cost"]) {
            Self::Pricing
        } else {
            Self::ProductDetails
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BrandInformation => "Brand Information",
            Self::PhysicalAttributes => "Physical Attributes",
            Self::ImagesAndMedia => "Images & Media",
            Self::Pricing => "Pricing",
            Self::ProductDetails => "Product Details",
        }
    }
}

/// `item_package_weight` -> `Item Package Weight`
pub fn title_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Field Descriptor
// ============================================================================

/// One resolved, renderable form field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Unique key within one mapped schema
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub primitive_type: PrimitiveType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub grouping: String,
    pub widget_kind: WidgetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_aux: Option<String>,
    /// Schema path of a flattened field: `[parent, sub]` or `[parent, sub, nested]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_path: Vec<String>,
}

impl FieldDescriptor {
    /// A descriptor with `name`, the title-cased display name and no other data.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: title_case(&name),
            grouping: Grouping::ProductDetails.label().to_string(),
            name,
            ..Default::default()
        }
    }

    pub fn has_enum(&self) -> bool {
        self.enum_values.as_ref().is_some_and(|values| !values.is_empty())
    }

    /// True for descriptors produced by flattening a nested attribute.
    pub fn is_flattened(&self) -> bool {
        self.source_path.len() > 1
    }
}
