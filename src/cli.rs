use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marketplace listing field builder
#[derive(Parser, Debug, Clone)]
#[command(name = "channel-lister", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "CHANNEL_LISTER_CONFIG", default_value = "channel-lister.toml")]
    pub config: PathBuf,

    /// Directory for the on-disk cache
    #[arg(long, env = "CHANNEL_LISTER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Amazon marketplace id (overrides amazon.marketplace_id)
    #[arg(long, env = "CHANNEL_LISTER_MARKETPLACE_ID")]
    pub marketplace_id: Option<String>,

    /// SP-API endpoint (overrides the regional endpoint)
    #[arg(long, env = "CHANNEL_LISTER_AMAZON_ENDPOINT")]
    pub amazon_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Map a local product type schema file to form fields
    Fields {
        /// JSON schema document
        #[arg(long)]
        schema: PathBuf,
        /// Print field-metadata rows instead of descriptors
        #[arg(long)]
        records: bool,
    },
    /// Fetch an Amazon product type schema and map it to form fields
    ProductType {
        /// Product type name, e.g. LUGGAGE
        name: String,
        /// Print field-metadata rows instead of descriptors
        #[arg(long)]
        records: bool,
    },
    /// Search Amazon product types by keyword
    Search {
        /// Keywords to search for
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Look up ShipStation shipping rates
    Rates {
        #[arg(long)]
        from_postal: String,
        #[arg(long)]
        to_postal: String,
        #[arg(long, default_value = "US")]
        to_country: String,
        #[arg(long)]
        to_state: Option<String>,
        /// Package weight in ounces
        #[arg(long)]
        weight_oz: f64,
        /// Carrier code; every connected carrier when omitted
        #[arg(long)]
        carrier: Option<String>,
    },
}
