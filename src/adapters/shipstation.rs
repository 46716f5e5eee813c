//! ShipStation carrier and rate lookups

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::adapters::cache::SharedCache;
use crate::adapters::error::{check_status, ServiceError, ServiceResult};
use crate::config::ShipStationSettings;

const CARRIERS_CACHE_KEY: &str = "shipstation_carriers";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub requires_funded_account: bool,
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub units: String,
}

impl Weight {
    pub fn ounces(value: f64) -> Self {
        Self {
            value,
            units: "ounces".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub units: String,
}

/// Body of `POST /shipments/getrates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub carrier_code: String,
    pub from_postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_state: Option<String>,
    pub to_country: String,
    pub to_postal_code: String,
    pub weight: Weight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residential: Option<bool>,
}

impl RateRequest {
    /// Same shipment, quoted against another carrier.
    pub fn for_carrier(&self, carrier_code: impl Into<String>) -> Self {
        Self {
            carrier_code: carrier_code.into(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateQuote {
    service_name: String,
    service_code: String,
    #[serde(default)]
    shipment_cost: f64,
    #[serde(default)]
    other_cost: f64,
}

/// A quoted service with its combined cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub carrier_code: String,
    pub service_name: String,
    pub service_code: String,
    pub shipment_cost: f64,
    pub other_cost: f64,
    pub total_cost: f64,
}

impl ShippingRate {
    fn from_quote(carrier_code: &str, quote: RateQuote) -> Self {
        Self {
            carrier_code: carrier_code.to_string(),
            total_cost: quote.shipment_cost + quote.other_cost,
            service_name: quote.service_name,
            service_code: quote.service_code,
            shipment_cost: quote.shipment_cost,
            other_cost: quote.other_cost,
        }
    }
}

/// Order rates cheapest first.
pub fn sort_by_total_cost(rates: &mut [ShippingRate]) {
    rates.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
}

pub struct ShipStationClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: SecretString,
    cache: SharedCache,
    carriers_ttl: Duration,
}

impl ShipStationClient {
    pub fn new(settings: &ShipStationSettings, cache: SharedCache, carriers_ttl: Duration) -> ServiceResult<Self> {
        let api_key = settings.api_key().ok_or_else(|| {
            ServiceError::Authentication("ShipStation api_key is not configured".to_string())
        })?;
        let api_secret = settings.api_secret().ok_or_else(|| {
            ServiceError::Authentication("ShipStation api_secret is not configured".to_string())
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ServiceError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_secret: SecretString::from(api_secret),
            cache,
            carriers_ttl,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Carriers on the account, cached for the configured TTL.
    pub async fn list_carriers(&self) -> ServiceResult<Vec<Carrier>> {
        if let Some(cached) = self.cache.get(CARRIERS_CACHE_KEY).await {
            match serde_json::from_value(cached) {
                Ok(carriers) => return Ok(carriers),
                Err(e) => tracing::warn!("Ignoring malformed cached carriers: {}", e),
            }
        }

        tracing::info!("Fetching ShipStation carriers");
        let response = self
            .http
            .get(self.url("/carriers"))
            .basic_auth(&self.api_key, Some(self.api_secret.expose_secret()))
            .send()
            .await?;

        let carriers: Vec<Carrier> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse carriers: {}", e)))?;

        self.cache
            .put(CARRIERS_CACHE_KEY, serde_json::to_value(&carriers)?, self.carriers_ttl)
            .await;
        Ok(carriers)
    }

    /// Rates for one carrier, cheapest first.
    pub async fn get_rates(&self, request: &RateRequest) -> ServiceResult<Vec<ShippingRate>> {
        tracing::debug!(
            "Requesting {} rates {} -> {}",
            request.carrier_code,
            request.from_postal_code,
            request.to_postal_code
        );

        let response = self
            .http
            .post(self.url("/shipments/getrates"))
            .basic_auth(&self.api_key, Some(self.api_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        let quotes: Vec<RateQuote> = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse rates: {}", e)))?;

        let mut rates: Vec<ShippingRate> = quotes
            .into_iter()
            .map(|quote| ShippingRate::from_quote(&request.carrier_code, quote))
            .collect();
        sort_by_total_cost(&mut rates);
        Ok(rates)
    }

    /// Rates across every carrier on the account. Carriers whose quote fails
    /// are logged and skipped.
    pub async fn get_all_rates(&self, request: &RateRequest) -> ServiceResult<Vec<ShippingRate>> {
        let carriers = self.list_carriers().await?;
        let mut rates = Vec::new();

        for carrier in &carriers {
            match self.get_rates(&request.for_carrier(&carrier.code)).await {
                Ok(quoted) => rates.extend(quoted),
                Err(e) => tracing::warn!("Skipping carrier {}: {}", carrier.code, e),
            }
        }

        sort_by_total_cost(&mut rates);
        Ok(rates)
    }

    pub async fn cheapest_rate(&self, request: &RateRequest) -> ServiceResult<Option<ShippingRate>> {
        Ok(self.get_rates(request).await?.into_iter().next())
    }
}
