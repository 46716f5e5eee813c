//! Selling Partner API HTTP client

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use super::auth::{LwaCredentials, LwaTokenProvider};
use crate::adapters::cache::SharedCache;
use crate::adapters::error::{check_status, ServiceError, ServiceResult};
use crate::adapters::rate_limit::{create_limiter, SharedRateLimiter};
use crate::config::AmazonSettings;

const DEFINITIONS_PATH: &str = "/definitions/2020-09-01/productTypes";
const LISTINGS_PATH: &str = "/listings/2021-08-01/items";

/// One hit of a product type search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeSummary {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub marketplace_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductTypeList {
    #[serde(default)]
    product_types: Vec<ProductTypeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub property_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeVersion {
    pub version: String,
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub release_candidate: bool,
}

/// Product type definition; `schema` is either the schema itself or a
/// `{ "link": { "resource": url } }` pointer to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTypeDefinition {
    pub product_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub property_groups: BTreeMap<String, PropertyGroup>,
    #[serde(default)]
    pub product_type_version: Option<ProductTypeVersion>,
}

impl ProductTypeDefinition {
    /// The embedded schema document, when the response carries one.
    pub fn embedded_schema(&self) -> Option<&Value> {
        self.schema
            .as_ref()
            .filter(|schema| schema.get("properties").is_some_and(Value::is_object))
    }

    /// The `schema.link.resource` URL.
    pub fn schema_link(&self) -> Option<&str> {
        self.schema
            .as_ref()?
            .pointer("/link/resource")
            .and_then(Value::as_str)
    }
}

/// Body of a listing PUT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSubmission {
    pub product_type: String,
    pub requirements: String,
    pub attributes: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingIssue {
    pub code: String,
    pub message: String,
    pub severity: String,
    #[serde(default)]
    pub attribute_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSubmissionResult {
    pub sku: String,
    pub status: String,
    pub submission_id: String,
    #[serde(default)]
    pub issues: Vec<ListingIssue>,
}

impl ListingSubmissionResult {
    pub fn is_accepted(&self) -> bool {
        self.status.eq_ignore_ascii_case("ACCEPTED")
    }
}

/// SP-API client bound to one marketplace
pub struct SpApiClient {
    http: reqwest::Client,
    endpoint: String,
    marketplace_id: String,
    seller_id: Option<String>,
    locale: String,
    tokens: LwaTokenProvider,
    limiter: SharedRateLimiter,
}

impl SpApiClient {
    /// Create a client from settings; the token cache is shared with the caller.
    pub fn new(settings: &AmazonSettings, token_cache: SharedCache) -> ServiceResult<Self> {
        let credentials = LwaCredentials::from_settings(settings)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ServiceError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let tokens = LwaTokenProvider::new(
            http.clone(),
            settings.token_endpoint.clone(),
            credentials,
            token_cache,
        );

        Ok(Self {
            http,
            endpoint: settings.endpoint(),
            marketplace_id: settings.marketplace_id.clone(),
            seller_id: settings.seller_id.clone(),
            locale: settings.locale.clone(),
            tokens,
            limiter: create_limiter(settings.requests_per_second, settings.burst_size),
        })
    }

    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }

    async fn authorized(&self, request: reqwest::RequestBuilder) -> ServiceResult<reqwest::Response> {
        self.limiter.until_ready().await;
        let token = self.tokens.access_token().await?;

        let response = request.header("x-amz-access-token", token).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            self.tokens.invalidate().await;
        }
        check_status(response).await
    }

    pub async fn search_product_types(&self, keywords: &[String]) -> ServiceResult<Vec<ProductTypeSummary>> {
        let mut query = vec![("marketplaceIds", self.marketplace_id.clone())];
        if !keywords.is_empty() {
            query.push(("keywords", keywords.join(",")));
        }

        let request = self
            .http
            .get(format!("{}{}", self.endpoint, DEFINITIONS_PATH))
            .query(&query);

        let list: ProductTypeList = self
            .authorized(request)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse product type list: {}", e)))?;

        Ok(list.product_types)
    }

    pub async fn get_product_type_definition(&self, product_type: &str) -> ServiceResult<ProductTypeDefinition> {
        let mut query = vec![
            ("marketplaceIds", self.marketplace_id.clone()),
            ("requirements", "LISTING".to_string()),
            ("locale", self.locale.clone()),
        ];
        if let Some(seller_id) = &self.seller_id {
            query.push(("sellerId", seller_id.clone()));
        }

        let request = self
            .http
            .get(format!(
                "{}{}/{}",
                self.endpoint,
                DEFINITIONS_PATH,
                urlencoding::encode(product_type)
            ))
            .query(&query);

        self.authorized(request)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse product type definition: {}", e)))
    }

    /// Download a linked schema document. Links are pre-signed, so no SP-API
    /// token is attached.
    pub async fn fetch_schema_document(&self, url: &str) -> ServiceResult<Value> {
        tracing::debug!("Downloading schema document {}", url);
        let response = check_status(self.http.get(url).send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse schema document: {}", e)))
    }

    pub async fn put_listing_item(
        &self,
        sku: &str,
        submission: &ListingSubmission,
    ) -> ServiceResult<ListingSubmissionResult> {
        let seller_id = self.seller_id.as_deref().ok_or_else(|| {
            ServiceError::Configuration("amazon.seller_id is required to submit listings".to_string())
        })?;

        let request = self
            .http
            .put(format!(
                "{}{}/{}/{}",
                self.endpoint,
                LISTINGS_PATH,
                urlencoding::encode(seller_id),
                urlencoding::encode(sku)
            ))
            .query(&[("marketplaceIds", self.marketplace_id.as_str())])
            .json(submission);

        self.authorized(request)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse listing response: {}", e)))
    }
}
