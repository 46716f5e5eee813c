use anyhow::Context;
use channel_lister::adapters::amazon::{AmazonSpApiService, SpApiClient};
use channel_lister::adapters::cache::{FileCache, SharedCache, TieredCache};
use channel_lister::adapters::shipstation::{RateRequest, ShipStationClient, Weight};
use channel_lister::cli::{Cli, Command};
use channel_lister::config::Settings;
use channel_lister::domain::records_from_descriptors;
use channel_lister::mapper::build_field_descriptors;
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    info!("Using cache directory {}", settings.cache.directory.display());
    let cache: SharedCache = Arc::new(TieredCache::new(FileCache::new(&settings.cache.directory)));

    match cli.command {
        Command::Fields { schema, records } => {
            let content = tokio::fs::read_to_string(&schema)
                .await
                .with_context(|| format!("Failed to read {}", schema.display()))?;
            let document: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", schema.display()))?;
            let fields = build_field_descriptors(&document)?;
            info!("Mapped {} fields from {}", fields.len(), schema.display());

            if records {
                print_json(&records_from_descriptors(&fields, "custom"))?;
            } else {
                print_json(&fields)?;
            }
        }
        Command::ProductType { name, records } => {
            let service = amazon_service(&settings, cache)?;
            if records {
                print_json(&service.product_type_records(&name).await?)?;
            } else {
                print_json(&service.product_type_fields(&name).await?)?;
            }
        }
        Command::Search { keywords } => {
            let service = amazon_service(&settings, cache)?;
            print_json(&service.search_product_types(&keywords).await?)?;
        }
        Command::Rates {
            from_postal,
            to_postal,
            to_country,
            to_state,
            weight_oz,
            carrier,
        } => {
            let shipstation = settings
                .shipstation
                .as_ref()
                .context("No [shipstation] section in the configuration")?;
            let client = ShipStationClient::new(
                shipstation,
                cache,
                Duration::from_secs(settings.cache.carriers_ttl_seconds),
            )?;

            let request = RateRequest {
                carrier_code: carrier.clone().unwrap_or_default(),
                from_postal_code: from_postal,
                to_state,
                to_country,
                to_postal_code: to_postal,
                weight: Weight::ounces(weight_oz),
                dimensions: None,
                confirmation: None,
                residential: None,
            };

            let rates = match carrier {
                Some(_) => client.get_rates(&request).await?,
                None => client.get_all_rates(&request).await?,
            };
            print_json(&rates)?;
        }
    }

    Ok(())
}

fn amazon_service(settings: &Settings, cache: SharedCache) -> anyhow::Result<AmazonSpApiService> {
    let amazon = settings
        .amazon
        .as_ref()
        .context("No [amazon] section in the configuration")?;

    let client = SpApiClient::new(amazon, cache.clone())?;
    Ok(AmazonSpApiService::new(
        Arc::new(client),
        cache,
        Duration::from_secs(settings.cache.schema_ttl_seconds),
    )
    .with_language_tag(amazon.language_tag.clone()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
