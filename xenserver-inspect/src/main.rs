use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use xenserver_api::JsonRpcClient;
use xenserver_common::LogFormat;
use xenserver_inspect::cli::Args;
use xenserver_inspect::commands;
use xenserver_inspect::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so the file can set the level
    let (config, source) = match &args.config {
        Some(config_path) => {
            let cfg = Config::load(config_path)?;
            (cfg.with_cli_overrides(&args), Some(config_path.as_str()))
        }
        None => match Config::load(DEFAULT_CONFIG_PATH) {
            Ok(cfg) => (cfg.with_cli_overrides(&args), Some(DEFAULT_CONFIG_PATH)),
            Err(_) => (Config::default_with_cli(&args), None),
        },
    };

    // Initialize logging
    match config.logging.log_format()? {
        LogFormat::Pretty => xenserver_common::init_logging(&config.logging.level)?,
        LogFormat::Json => xenserver_common::init_logging_json(&config.logging.level)?,
    }

    match source {
        Some(path) => info!(config_path = %path, "Configuration loaded"),
        None => info!("No config file found, using CLI arguments and defaults"),
    }

    let client = JsonRpcClient::new(&config.client_config()).context("Failed to create XenAPI client")?;
    info!(endpoint = %client.endpoint(), "XenAPI client ready");

    match commands::run(&args.command, &client).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
