use reqwest::Url;
use thiserror::Error;

use crate::config::{AmazonSettings, CacheSettings, Settings, ShipStationSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(amazon) = &settings.amazon {
            if let Err(e) = Self::validate_amazon(amazon) {
                errors.extend(e);
            }
        }

        if let Some(shipstation) = &settings.shipstation {
            if let Err(e) = Self::validate_shipstation(shipstation) {
                errors.extend(e);
            }
        }

        if let Err(e) = Self::validate_cache(&settings.cache) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_amazon(amazon: &AmazonSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if amazon.marketplace_id.trim().is_empty() {
            errors.push(ValidationError::MissingField("amazon.marketplace_id".to_string()));
        }

        if let Some(endpoint) = &amazon.endpoint {
            if let Err(e) = Self::validate_url("amazon.endpoint", endpoint) {
                errors.push(e);
            }
        }

        if let Err(e) = Self::validate_url("amazon.token_endpoint", &amazon.token_endpoint) {
            errors.push(e);
        }

        if amazon.requests_per_second == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "amazon.requests_per_second".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if amazon.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "amazon.timeout_seconds".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_shipstation(shipstation: &ShipStationSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_url("shipstation.base_url", &shipstation.base_url) {
            errors.push(e);
        }

        if shipstation.timeout_seconds == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "shipstation.timeout_seconds".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_cache(cache: &CacheSettings) -> Result<(), Vec<ValidationError>> {
        if cache.directory.as_os_str().is_empty() {
            return Err(vec![ValidationError::MissingField("cache.directory".to_string())]);
        }
        Ok(())
    }

    fn validate_url(field: &str, value: &str) -> Result<(), ValidationError> {
        match Url::parse(value) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
            Ok(url) => Err(ValidationError::InvalidValue {
                field: field.to_string(),
                reason: format!("Unsupported scheme '{}'", url.scheme()),
            }),
            Err(e) => Err(ValidationError::InvalidValue {
                field: field.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
