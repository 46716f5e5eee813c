//! Domain types shared by the mapper and the marketplace adapters.

pub mod field;
pub mod record;
pub mod schema;

pub use field::{title_case, FieldDescriptor, Grouping, PrimitiveType, WidgetKind};
pub use record::{records_from_descriptors, ChannelListerField, FieldKind};
pub use schema::{is_metadata_property, render_scalar, SchemaProperty, METADATA_PROPERTIES};
