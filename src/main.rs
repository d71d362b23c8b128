use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use steam_sweep::{
    Config, DEFAULT_CONFIG_FILE, FileSink, Result, Scanner, SteamWebClient, run_until_signal,
};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides `api_key` from the config file
const API_KEY_ENV: &str = "STEAM_API_KEY";

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "steam-sweep failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if !config_path.exists() {
        Config::write_default(&config_path)?;
        println!(
            "Wrote a default configuration to {}. Set api_key and the scan range, then run again.",
            config_path.display()
        );
        return Ok(());
    }

    let mut config = Config::load(&config_path)?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            tracing::debug!("Using API key from {API_KEY_ENV}");
            config.api.api_key = key;
        }
    }
    let config = Arc::new(config);

    let api = Arc::new(SteamWebClient::from_config(&config)?);
    let sink = Arc::new(FileSink::new(&config.output.output_dir).await?);
    tracing::info!(
        config = %config_path.display(),
        output_dir = %config.output.output_dir.display(),
        "Configuration loaded"
    );

    let scanner = Scanner::new(config, api, sink);
    let report = run_until_signal(&scanner).await?;
    if report.cancelled {
        tracing::info!("Scan cancelled");
    }
    Ok(())
}
