//! 'main' for the tx-inspect process

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use std::{io::Read, path::PathBuf, process::ExitCode};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};
use txlens_codec::process_tx_hex_with_limits;
use txlens_common::{
    DecodeLimits, Transaction,
    configuration::{CONFIG_KEY_REGISTRY_PATH, OutputFormat},
    lookup::AssetRegistryLookup,
};

mod registry_source;
mod summary;

use registry_source::FileRegistry;

#[derive(Parser, Debug)]
#[command(name = "tx-inspect")]
#[command(about = "Decode a hex CBOR transaction and show its contents")]
struct Args {
    /// Hex encoded transaction
    #[arg(long, conflicts_with = "file")]
    hex: Option<String>,

    /// File holding the hex encoded transaction; stdin when neither is given
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Asset registry JSON, used to label native assets
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Output format: json or summary
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Config file name, without extension
    #[arg(short, long, default_value = "tx-inspect")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Standard logging using RUST_LOG for log levels
    let fmt_layer =
        fmt::layer().with_writer(std::io::stderr).with_filter(EnvFilter::from_default_env());
    Registry::default().with(fmt_layer).init();

    let args = Args::parse();

    let config = Config::builder()
        .add_source(File::with_name(&args.config).required(false))
        .add_source(
            Environment::with_prefix("TXLENS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let limits = DecodeLimits::from_config(&config);
    let format = args.format.unwrap_or_else(|| OutputFormat::from_config(&config));

    let text = read_input(&args)?;
    let tx = match process_tx_hex_with_limits(&text, &limits) {
        Ok(tx) => tx,
        Err(e) => {
            error!("Transaction decode failed: {e}");
            eprintln!("could not parse transaction: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Decoded transaction {}", tx.hash);

    let registry_path = args
        .registry
        .clone()
        .or_else(|| config.get_string(CONFIG_KEY_REGISTRY_PATH).ok().map(PathBuf::from));

    println!("{}", render(&tx, format, registry_path).await?);
    Ok(ExitCode::SUCCESS)
}

fn read_input(args: &Args) -> Result<String> {
    if let Some(hex) = &args.hex {
        return Ok(hex.clone());
    }
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
    Ok(text)
}

async fn render(
    tx: &Transaction,
    format: OutputFormat,
    registry_path: Option<PathBuf>,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tx)?),
        OutputFormat::Summary => {
            // A registry that fails to load only costs the labels
            let registry = match registry_path {
                Some(path) => match FileRegistry::new(path).registry().await {
                    Ok(registry) => Some(registry),
                    Err(e) => {
                        warn!("Asset registry unavailable: {e:#}");
                        None
                    }
                },
                None => None,
            };
            Ok(summary::render(tx, registry.as_ref()))
        }
    }
}
