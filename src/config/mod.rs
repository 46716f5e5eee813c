use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "channel-lister.toml";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Amazon Selling Partner API access
    #[serde(default)]
    pub amazon: Option<AmazonSettings>,
    /// ShipStation rate lookups
    #[serde(default)]
    pub shipstation: Option<ShipStationSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// SP-API regional endpoint group
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AmazonRegion {
    #[default]
    Na,
    Eu,
    Fe,
}

impl AmazonRegion {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Na => "https://sellingpartnerapi-na.amazon.com",
            Self::Eu => "https://sellingpartnerapi-eu.amazon.com",
            Self::Fe => "https://sellingpartnerapi-fe.amazon.com",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AmazonSettings {
    /// LWA client id (plain text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Environment variable holding the LWA client id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_env: Option<String>,
    #[serde(default)]
    pub region: AmazonRegion,
    /// Overrides the regional SP-API endpoint (sandbox or a local mock)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    pub marketplace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_locale")]
    pub language_tag: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl AmazonSettings {
    /// Settings for one marketplace with every optional value at its default.
    pub fn for_marketplace(marketplace_id: impl Into<String>) -> Self {
        Self {
            client_id: None,
            client_id_env: None,
            client_secret: None,
            client_secret_env: None,
            refresh_token: None,
            refresh_token_env: None,
            region: AmazonRegion::default(),
            endpoint: None,
            token_endpoint: default_token_endpoint(),
            marketplace_id: marketplace_id.into(),
            seller_id: None,
            locale: default_locale(),
            language_tag: default_locale(),
            requests_per_second: default_requests_per_second(),
            burst_size: default_burst_size(),
            timeout_seconds: default_timeout(),
        }
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| self.region.endpoint().to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn client_id(&self) -> Option<String> {
        resolve_credential(&self.client_id, &self.client_id_env, "AMAZON_CLIENT_ID")
    }

    pub fn client_secret(&self) -> Option<String> {
        resolve_credential(&self.client_secret, &self.client_secret_env, "AMAZON_CLIENT_SECRET")
    }

    pub fn refresh_token(&self) -> Option<String> {
        resolve_credential(&self.refresh_token, &self.refresh_token_env, "AMAZON_REFRESH_TOKEN")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipStationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret_env: Option<String>,
    #[serde(default = "default_shipstation_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ShipStationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            api_secret: None,
            api_secret_env: None,
            base_url: default_shipstation_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ShipStationSettings {
    pub fn api_key(&self) -> Option<String> {
        resolve_credential(&self.api_key, &self.api_key_env, "SHIPSTATION_API_KEY")
    }

    pub fn api_secret(&self) -> Option<String> {
        resolve_credential(&self.api_secret, &self.api_secret_env, "SHIPSTATION_API_SECRET")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheSettings {
    /// Directory for the on-disk cache tier
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_schema_ttl")]
    pub schema_ttl_seconds: u64,
    #[serde(default = "default_carriers_ttl")]
    pub carriers_ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            schema_ttl_seconds: default_schema_ttl(),
            carriers_ttl_seconds: default_carriers_ttl(),
        }
    }
}

fn default_token_endpoint() -> String {
    "https://api.amazon.com/auth/o2/token".to_string()
}

fn default_locale() -> String {
    "en_US".to_string()
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_burst_size() -> u32 {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_shipstation_url() -> String {
    "https://ssapi.shipstation.com".to_string()
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from(".cache/channel-lister")
}

fn default_schema_ttl() -> u64 {
    86_400
}

fn default_carriers_ttl() -> u64 {
    3_600
}

/// Plain value first, then the named environment variable, then the
/// conventional variable.
fn resolve_credential(value: &Option<String>, env_var: &Option<String>, fallback_env: &str) -> Option<String> {
    if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
        return Some(value.clone());
    }
    let env_var = env_var.as_deref().unwrap_or(fallback_env);
    std::env::var(env_var).ok().filter(|v| !v.is_empty())
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_path(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Create settings from CLI arguments (config file, then CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(&cli.config)?;
        settings.apply_cli_overrides(cli);
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("CHANNEL_LISTER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.cache_dir {
            self.cache.directory = dir.clone();
        }
        if let Some(amazon) = self.amazon.as_mut() {
            if let Some(marketplace_id) = &cli.marketplace_id {
                amazon.marketplace_id = marketplace_id.clone();
            }
            if let Some(endpoint) = &cli.amazon_endpoint {
                amazon.endpoint = Some(endpoint.clone());
            }
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }
}
