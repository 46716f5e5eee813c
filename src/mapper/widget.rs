//! Widget inference and the `select` option encoding.
//!
//! Select options travel as a single string: `label==value` pairs joined by
//! `||`, or bare values joined by `||` when the schema carries no labels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{render_scalar, FieldDescriptor, PrimitiveType, WidgetKind};

const OPTION_SEPARATOR: &str = "||";
const PAIR_SEPARATOR: &str = "==";

/// Descriptions longer than this get a textarea.
const TEXTAREA_DESCRIPTION_LEN: usize = 100;

/// Inferred widget and its auxiliary configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Widget {
    pub kind: WidgetKind,
    pub aux: Option<String>,
}

/// One option of a select widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

pub fn infer_widget(descriptor: &FieldDescriptor) -> Widget {
    if let Some(values) = descriptor.enum_values.as_ref().filter(|v| !v.is_empty()) {
        return Widget {
            kind: WidgetKind::Select,
            aux: Some(encode_select_options(values, descriptor.enum_labels.as_deref())),
        };
    }

    let kind = match descriptor.primitive_type {
        PrimitiveType::String => {
            let long = descriptor
                .description
                .as_ref()
                .is_some_and(|d| d.chars().count() > TEXTAREA_DESCRIPTION_LEN);
            if long {
                WidgetKind::Textarea
            } else {
                WidgetKind::Text
            }
        }
        PrimitiveType::Number | PrimitiveType::Integer => WidgetKind::Decimal,
        PrimitiveType::Boolean => WidgetKind::Checkbox,
    };

    Widget { kind, aux: None }
}

/// Runs [`infer_widget`] and stores the result on the descriptor.
pub fn apply_widget(mut descriptor: FieldDescriptor) -> FieldDescriptor {
    let widget = infer_widget(&descriptor);
    descriptor.widget_kind = widget.kind;
    descriptor.widget_aux = widget.aux;
    descriptor
}

pub fn encode_select_options(values: &[Value], labels: Option<&[String]>) -> String {
    match labels {
        Some(labels) => values
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let value = render_scalar(value);
                let label = labels.get(idx).cloned().unwrap_or_else(|| value.clone());
                format!("{label}{PAIR_SEPARATOR}{value}")
            })
            .collect::<Vec<_>>()
            .join(OPTION_SEPARATOR),
        None => values
            .iter()
            .map(render_scalar)
            .collect::<Vec<_>>()
            .join(OPTION_SEPARATOR),
    }
}

/// Decode a select widget's aux string back into ordered options.
pub fn parse_select_options(aux: &str) -> Vec<SelectOption> {
    if aux.is_empty() {
        return Vec::new();
    }

    aux.split(OPTION_SEPARATOR)
        .map(|entry| match entry.split_once(PAIR_SEPARATOR) {
            Some((label, value)) => SelectOption {
                label: label.to_string(),
                value: value.to_string(),
            },
            None => SelectOption {
                label: entry.to_string(),
                value: entry.to_string(),
            },
        })
        .collect()
}
