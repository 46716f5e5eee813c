//! Amazon product type fields and listing submission

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::client::{ListingSubmission, ListingSubmissionResult, ProductTypeSummary, SpApiClient};
use super::listing::build_listing_attributes;
use crate::adapters::cache::SharedCache;
use crate::adapters::error::{ServiceError, ServiceResult};
use crate::domain::{records_from_descriptors, ChannelListerField, FieldDescriptor};
use crate::mapper::{InvalidSchemaError, SchemaMapper};

pub const MARKETPLACE: &str = "amazon";

/// Ties the SP-API client, the schema cache and the field mapper together
pub struct AmazonSpApiService {
    client: Arc<SpApiClient>,
    cache: SharedCache,
    schema_ttl: Duration,
    mapper: SchemaMapper,
    language_tag: String,
}

impl AmazonSpApiService {
    pub fn new(client: Arc<SpApiClient>, cache: SharedCache, schema_ttl: Duration) -> Self {
        Self {
            client,
            cache,
            schema_ttl,
            mapper: SchemaMapper::default(),
            language_tag: "en_US".to_string(),
        }
    }

    pub fn with_mapper(mut self, mapper: SchemaMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_language_tag(mut self, language_tag: impl Into<String>) -> Self {
        self.language_tag = language_tag.into();
        self
    }

    fn schema_cache_key(&self, product_type: &str) -> String {
        format!("amazon_schema:{}:{}", self.client.marketplace_id(), product_type)
    }

    pub async fn search_product_types(&self, keywords: &[String]) -> ServiceResult<Vec<ProductTypeSummary>> {
        self.client.search_product_types(keywords).await
    }

    /// The product type's JSON schema: memory, then disk, then SP-API.
    pub async fn product_type_schema(&self, product_type: &str) -> ServiceResult<Value> {
        let key = self.schema_cache_key(product_type);
        if let Some(schema) = self.cache.get(&key).await {
            tracing::debug!("Using cached schema for {}", product_type);
            return Ok(schema);
        }

        tracing::info!(
            "Fetching {} schema for marketplace {}",
            product_type,
            self.client.marketplace_id()
        );
        let definition = self.client.get_product_type_definition(product_type).await?;

        let schema = match (definition.embedded_schema(), definition.schema_link()) {
            (Some(schema), _) => schema.clone(),
            (None, Some(link)) => self.client.fetch_schema_document(link).await?,
            (None, None) => {
                return Err(ServiceError::Parse(format!(
                    "Definition for {} carries neither a schema nor a schema link",
                    product_type
                )))
            }
        };
        if !schema.is_object() {
            return Err(InvalidSchemaError::for_value(&schema).into());
        }

        self.cache.put(&key, schema.clone(), self.schema_ttl).await;
        Ok(schema)
    }

    pub async fn product_type_fields(&self, product_type: &str) -> ServiceResult<Vec<FieldDescriptor>> {
        let schema = self.product_type_schema(product_type).await?;
        let fields = self.mapper.map(&schema)?;
        tracing::info!("Mapped {} fields for {}", fields.len(), product_type);
        Ok(fields)
    }

    pub async fn product_type_records(&self, product_type: &str) -> ServiceResult<Vec<ChannelListerField>> {
        let fields = self.product_type_fields(product_type).await?;
        Ok(records_from_descriptors(&fields, MARKETPLACE))
    }

    /// Map submitted form values back into attributes and PUT the listing.
    pub async fn submit_listing(
        &self,
        sku: &str,
        product_type: &str,
        values: &HashMap<String, String>,
    ) -> ServiceResult<ListingSubmissionResult> {
        let fields = self.product_type_fields(product_type).await?;
        let submission = ListingSubmission {
            product_type: product_type.to_string(),
            requirements: "LISTING".to_string(),
            attributes: build_listing_attributes(
                &fields,
                values,
                self.client.marketplace_id(),
                &self.language_tag,
            ),
        };

        let result = self.client.put_listing_item(sku, &submission).await?;
        if !result.is_accepted() {
            tracing::warn!(
                "Listing {} returned {} with {} issue(s)",
                sku,
                result.status,
                result.issues.len()
            );
        }
        Ok(result)
    }
}
