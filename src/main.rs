use anyhow::{Context, Result};
use clap::Parser;
use profile_wizard::wizard_cli::{handle_wizard_command, WizardCli};
use profile_wizard::WizardConfig;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WizardCli::parse();
    let config = WizardConfig::load()?;

    if let Some(parent) = config.log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file: {}", config.log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting profile wizard");
    info!("Run mode: {:?}", config.run_mode);
    info!("API: {}", config.api_url);
    info!("Session store: {}", config.session_db.display());

    handle_wizard_command(cli, config).await
}
