//! Flattening of attribute envelopes into independent fields.

use std::collections::HashSet;

use crate::domain::{is_metadata_property, title_case, FieldDescriptor, PrimitiveType, SchemaProperty};

use super::classifier::envelope_sub_properties;
use super::extractor::{extract_type_and_enum, TypeInfo};

/// Expand a `Simple` or `Complex` envelope into field descriptors.
///
/// Every descriptor inherits the parent's required flag and uses the parent's
/// title (or its title-cased name) as grouping. Widgets are not inferred here.
/// Properties that are not envelopes produce nothing.
pub fn flatten(
    name: &str,
    property: &SchemaProperty<'_>,
    required: &HashSet<String>,
) -> Vec<FieldDescriptor> {
    let is_required = required.contains(name);
    let group_label = property
        .title()
        .map(str::to_string)
        .unwrap_or_else(|| title_case(name));

    let Some(subs) = envelope_sub_properties(property) else {
        return Vec::new();
    };

    match subs.as_slice() {
        ["value"] => simple_field(name, property, is_required, group_label)
            .into_iter()
            .collect(),
        subs if subs.len() > 1 => complex_fields(name, property, is_required, &group_label),
        _ => Vec::new(),
    }
}

fn simple_field(
    name: &str,
    property: &SchemaProperty<'_>,
    is_required: bool,
    group_label: String,
) -> Option<FieldDescriptor> {
    let value = property.item_property("value")?;
    let TypeInfo { type_name, enum_values, enum_labels } = extract_type_and_enum(property);

    Some(FieldDescriptor {
        name: name.to_string(),
        display_name: property
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| title_case(name)),
        description: property.description().or(value.description()).map(str::to_string),
        example: property.first_example().or_else(|| value.first_example()),
        primitive_type: PrimitiveType::from_schema_type(&type_name),
        required: is_required,
        enum_values,
        enum_labels,
        min_length: value.min_length(),
        max_length: value.max_length(),
        pattern: value.pattern().map(str::to_string),
        grouping: group_label,
        ..Default::default()
    })
}

fn complex_fields(
    name: &str,
    property: &SchemaProperty<'_>,
    is_required: bool,
    group_label: &str,
) -> Vec<FieldDescriptor> {
    let Some(sub_properties) = property.item_properties() else {
        return Vec::new();
    };

    let mut fields = Vec::new();

    for (sub_name, sub_node) in sub_properties {
        if is_metadata_property(sub_name) {
            continue;
        }
        let sub = SchemaProperty::new(sub_node);

        match sub.item_properties().filter(|_| sub.is_type("array")) {
            Some(nested) => {
                for (nested_name, nested_node) in nested {
                    if is_metadata_property(nested_name) {
                        continue;
                    }
                    let nested = SchemaProperty::new(nested_node);
                    fields.push(nested_field(
                        [name, sub_name.as_str(), nested_name.as_str()],
                        &nested,
                        &sub,
                        is_required,
                        group_label,
                    ));
                }
            }
            None => fields.push(sub_field([name, sub_name.as_str()], &sub, is_required, group_label)),
        }
    }

    fields
}

fn sub_field(
    path: [&str; 2],
    sub: &SchemaProperty<'_>,
    is_required: bool,
    group_label: &str,
) -> FieldDescriptor {
    let field_name = path.join("_");
    let TypeInfo { type_name, enum_values, enum_labels } = extract_type_and_enum(sub);

    FieldDescriptor {
        display_name: sub
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&field_name)),
        description: sub.description().map(str::to_string),
        example: sub.first_example(),
        primitive_type: PrimitiveType::from_schema_type(&type_name),
        required: is_required,
        enum_values,
        enum_labels,
        min_length: sub.min_length(),
        max_length: sub.max_length(),
        pattern: sub.pattern().map(str::to_string),
        grouping: group_label.to_string(),
        source_path: path.iter().map(|s| s.to_string()).collect(),
        name: field_name,
        ..Default::default()
    }
}

/// A grandchild of a doubly nested envelope. Missing keys fall back to the
/// intermediate sub-property.
fn nested_field(
    path: [&str; 3],
    nested: &SchemaProperty<'_>,
    sub: &SchemaProperty<'_>,
    is_required: bool,
    group_label: &str,
) -> FieldDescriptor {
    let field_name = path.join("_");
    let TypeInfo { type_name, enum_values, enum_labels } = extract_type_and_enum(nested);

    FieldDescriptor {
        display_name: nested
            .title()
            .or(sub.title())
            .map(str::to_string)
            .unwrap_or_else(|| title_case(&field_name)),
        description: nested.description().or(sub.description()).map(str::to_string),
        example: nested.first_example().or_else(|| sub.first_example()),
        primitive_type: PrimitiveType::from_schema_type(&type_name),
        required: is_required,
        enum_values,
        enum_labels,
        min_length: nested.min_length().or(sub.min_length()),
        max_length: nested.max_length().or(sub.max_length()),
        pattern: nested.pattern().or(sub.pattern()).map(str::to_string),
        grouping: group_label.to_string(),
        source_path: path.iter().map(|s| s.to_string()).collect(),
        name: field_name,
        ..Default::default()
    }
}
