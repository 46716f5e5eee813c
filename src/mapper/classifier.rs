//! Property classification.
//!
//! Amazon wraps every attribute in an array-of-object envelope. Envelopes
//! holding a lone `value` are simple scalars; envelopes with several
//! sub-properties are nested records that get flattened into one field per
//! sub-property.

use std::collections::HashSet;

use crate::domain::{is_metadata_property, SchemaProperty};

/// Object-typed properties that never become form fields.
pub const DEFAULT_DENY_LIST: [&str; 3] = [
    "fulfillment_availability",
    "merchant_suggested_asin",
    "purchasable_offer",
];

/// Object-typed properties that are always kept, even when denied.
pub const DEFAULT_ALLOW_LIST: [&str; 2] = [
    "externally_assigned_product_identifier",
    "supplier_declared_has_product_identifier_exemption",
];

/// How a top-level property is turned into fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyClass {
    /// Skipped entirely
    Excluded,
    /// Array envelope around a single `value`; one field named after the parent
    Simple,
    /// Array envelope around several sub-properties; flattened
    Complex,
    /// Anything else; one field built straight from the node
    Plain,
}

/// Deny/allow lists applied to object-typed properties
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusionRules {
    deny: HashSet<String>,
    allow: HashSet<String>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_LIST, DEFAULT_ALLOW_LIST)
    }
}

impl ExclusionRules {
    pub fn new<D, A>(deny: D, allow: A) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            deny: deny.into_iter().map(Into::into).collect(),
            allow: allow.into_iter().map(Into::into).collect(),
        }
    }

    /// Add more names to the deny list.
    pub fn deny<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.deny.extend(names.into_iter().map(Into::into));
        self
    }

    /// Allow-listed names are never excluded.
    pub fn excludes(&self, name: &str) -> bool {
        !self.allow.contains(name) && self.deny.contains(name)
    }
}

/// Non-metadata sub-property names of an array-of-object envelope, in
/// declaration order. `None` when the property is not such an envelope.
pub fn envelope_sub_properties<'a>(property: &SchemaProperty<'a>) -> Option<Vec<&'a str>> {
    if !property.is_type("array") {
        return None;
    }
    let items = property.items()?;
    if !items.is_type("object") {
        return None;
    }
    let props = items.properties()?;

    Some(
        props
            .keys()
            .map(String::as_str)
            .filter(|name| !is_metadata_property(name))
            .collect(),
    )
}

pub fn classify(name: &str, property: &SchemaProperty<'_>, rules: &ExclusionRules) -> PropertyClass {
    if property.is_type("object") && rules.excludes(name) {
        return PropertyClass::Excluded;
    }

    match envelope_sub_properties(property).as_deref() {
        Some(["value"]) => PropertyClass::Simple,
        Some(subs) if subs.len() > 1 => PropertyClass::Complex,
        // A lone non-`value` sub-property, or only metadata, is left as-is.
        _ => PropertyClass::Plain,
    }
}
