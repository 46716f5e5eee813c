//! # Channel Lister - marketplace listing fields
//!
//! Turns marketplace product type schemas (Amazon SP-API product type
//! definitions) into flat, renderable form field descriptors, and carries the
//! collaborators around that pipeline.
//!
//! ## Features
//!
//! - **Schema mapping**: envelope unwrapping, nested record flattening, enum
//!   extraction and widget inference
//! - **Amazon SP-API**: LWA tokens, product type search and definitions,
//!   listing submission
//! - **Caching**: memory and disk tiers for schemas, tokens and carriers
//! - **ShipStation**: carrier listing and rate shopping
//!
//! ## Quick Start
//!
//! ```rust
//! use channel_lister::mapper::build_field_descriptors;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "properties": {
//!         "brand": {
//!             "type": "array",
//!             "title": "Brand",
//!             "items": {
//!                 "type": "object",
//!                 "properties": { "value": { "type": "string" } }
//!             }
//!         }
//!     },
//!     "required": ["brand"]
//! });
//!
//! let fields = build_field_descriptors(&schema).unwrap();
//! assert_eq!(fields[0].name, "brand");
//! assert!(fields[0].required);
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema view, field descriptors and field records
//! - **Mapper**: the pure schema-to-field pipeline
//! - **Adapters**: caches, SP-API and ShipStation clients
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod mapper;

pub use domain::{ChannelListerField, FieldDescriptor, PrimitiveType, WidgetKind};
pub use mapper::{build_field_descriptors, InvalidSchemaError, SchemaMapper};
