//! Login with Amazon (LWA) access tokens

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::adapters::cache::SharedCache;
use crate::adapters::error::{check_status, ServiceError, ServiceResult};
use crate::config::AmazonSettings;

/// Tokens are refreshed this long before Amazon says they expire.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// LWA app credentials plus the seller's refresh token
pub struct LwaCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

impl LwaCredentials {
    pub fn from_settings(settings: &AmazonSettings) -> ServiceResult<Self> {
        let missing = |what: &str| {
            ServiceError::Authentication(format!("Amazon {} is not configured", what))
        };

        Ok(Self {
            client_id: settings.client_id().ok_or_else(|| missing("client_id"))?,
            client_secret: SecretString::from(
                settings.client_secret().ok_or_else(|| missing("client_secret"))?,
            ),
            refresh_token: SecretString::from(
                settings.refresh_token().ok_or_else(|| missing("refresh_token"))?,
            ),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges the refresh token for short-lived access tokens, caching them
pub struct LwaTokenProvider {
    client: reqwest::Client,
    token_endpoint: String,
    credentials: LwaCredentials,
    cache: SharedCache,
}

impl LwaTokenProvider {
    pub fn new(
        client: reqwest::Client,
        token_endpoint: impl Into<String>,
        credentials: LwaCredentials,
        cache: SharedCache,
    ) -> Self {
        Self {
            client,
            token_endpoint: token_endpoint.into(),
            credentials,
            cache,
        }
    }

    fn cache_key(&self) -> String {
        format!("amazon_lwa_token:{}", self.credentials.client_id)
    }

    /// A valid access token, from cache when possible.
    pub async fn access_token(&self) -> ServiceResult<String> {
        let key = self.cache_key();
        if let Some(token) = self.cache.get(&key).await {
            if let Some(token) = token.as_str() {
                return Ok(token.to_string());
            }
        }

        let response = self.request_token().await?;
        let ttl = response
            .expires_in
            .unwrap_or(3600)
            .saturating_sub(EXPIRY_MARGIN_SECS);
        self.cache
            .put(&key, json!(response.access_token), Duration::from_secs(ttl))
            .await;

        Ok(response.access_token)
    }

    /// Drop the cached token, e.g. after the API rejected it.
    pub async fn invalidate(&self) {
        self.cache.forget(&self.cache_key()).await;
    }

    async fn request_token(&self) -> ServiceResult<TokenResponse> {
        tracing::info!("Requesting LWA access token");

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.expose_secret()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose_secret()),
        ];

        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await?;

        let response = check_status(response).await.map_err(|e| match e {
            ServiceError::Api { status, message } if status == 400 || status == 401 => {
                ServiceError::Authentication(format!("LWA token request rejected: {}", message))
            }
            other => other,
        })?;

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse LWA token response: {}", e)))
    }
}
