//! shopee-crawler - Shopee shop listing exporter
//!
//! Fetches shop listings through ScraperAPI async jobs and saves them as JSON and CSV.

use anyhow::Result;
use clap::{Parser, Subcommand};
use shopee_crawler::commands::{RatesCommand, ShopCommand};
use shopee_crawler::config::{Config, OutputFormat};
use shopee_crawler::shopee::Country;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shopee-crawler",
    version,
    about = "Export every listing of a Shopee shop",
    long_about = "Fetches Shopee shop listings through ScraperAPI async jobs, converts prices to USD, and saves raw JSON and parsed CSV."
)]
struct Cli {
    /// Shopee country storefront
    #[arg(short = 'C', long, global = true)]
    country: Option<Country>,

    /// ScraperAPI key
    #[arg(long, global = true, env = "SHOPEE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory for raw and parsed outputs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and export every listing of a shop
    #[command(alias = "s")]
    Shop {
        /// Numeric shop id
        shop_id: String,

        /// Items per page
        #[arg(long)]
        chunk_size: Option<u32>,

        /// Skip the raw JSON dump
        #[arg(long)]
        no_raw: bool,

        /// Skip the parsed CSV
        #[arg(long)]
        no_parsed: bool,

        /// Skip the USD price column
        #[arg(long)]
        no_usd: bool,

        /// Hide sold-out items
        #[arg(long)]
        hide_sold_out: bool,
    },

    /// Refresh cached exchange rates
    Rates,

    /// List supported countries
    Countries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env()?;

    if let Some(country) = cli.country {
        config.country = country;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    match cli.command {
        Commands::Shop { shop_id, chunk_size, no_raw, no_parsed, no_usd, hide_sold_out } => {
            if let Some(size) = chunk_size {
                config.chunk_size = size;
            }
            config.save_raw &= !no_raw;
            config.save_parsed &= !no_parsed;
            config.convert_usd &= !no_usd;
            config.filter_sold_out |= hide_sold_out;

            let cmd = ShopCommand::new(config);
            let output = cmd.execute(&shop_id).await?;
            println!("{}", output);
        }

        Commands::Rates => {
            let cmd = RatesCommand::new(config);
            let output = cmd.execute().await?;
            println!("{}", output);
        }

        Commands::Countries => {
            println!("Supported Shopee countries:\n");
            println!("{:<12} {:<18} {:<10}", "Country", "Domain", "Currency");
            println!("{:-<12} {:-<18} {:-<10}", "", "", "");

            for country in Country::all() {
                println!("{:<12} {:<18} {:<10}", country.to_string(), country.domain(), country.currency());
            }
        }
    }

    Ok(())
}
