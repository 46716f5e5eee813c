//! Flat field-metadata rows.
//!
//! A [`ChannelListerField`] is the row shape the listing UI stores for every
//! form field, whether it came from a marketplace schema or was entered by
//! hand. [`ChannelListerField::from_descriptor`] is the one mapping from a
//! resolved [`FieldDescriptor`] to that row; both the Amazon import path and
//! the general field path call it.

use serde::{Deserialize, Serialize};

use super::field::FieldDescriptor;

/// Where a field definition originated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Defined by hand for the listing form
    #[default]
    Custom,
    /// Imported from an Amazon product type schema
    Amazon,
}

/// One row of field metadata
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelListerField {
    pub ordering: u32,
    pub field_name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    pub marketplace: String,
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type_aux: Option<String>,
    pub required: bool,
    pub grouping: String,
    #[serde(rename = "type")]
    pub field_type: FieldKind,
}

impl ChannelListerField {
    pub fn from_descriptor(descriptor: &FieldDescriptor, ordering: u32, marketplace: &str) -> Self {
        let field_type = if marketplace.eq_ignore_ascii_case("amazon") {
            FieldKind::Amazon
        } else {
            FieldKind::Custom
        };

        Self {
            ordering,
            field_name: descriptor.name.clone(),
            display_name: descriptor.display_name.clone(),
            tooltip: descriptor.description.clone(),
            example: descriptor.example.clone(),
            marketplace: marketplace.to_string(),
            input_type: descriptor.widget_kind.as_str().to_string(),
            input_type_aux: descriptor.widget_aux.clone(),
            required: descriptor.required,
            grouping: descriptor.grouping.clone(),
            field_type,
        }
    }
}

/// Converts descriptors into rows, numbering them from 1 in output order.
pub fn records_from_descriptors(
    descriptors: &[FieldDescriptor],
    marketplace: &str,
) -> Vec<ChannelListerField> {
    descriptors
        .iter()
        .zip(1u32..)
        .map(|(descriptor, ordering)| {
            ChannelListerField::from_descriptor(descriptor, ordering, marketplace)
        })
        .collect()
}
