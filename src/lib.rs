pub mod cli;
pub mod core;
pub mod providers;

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::convert::ConversionOutcome;
use crate::core::config::AppConfig;
use crate::core::rates::RateTable;
use crate::providers::ExchangeRatesApiProvider;

pub enum AppCommand {
    Convert {
        from: Option<String>,
        to: Option<String>,
        amount: String,
    },
    Rates,
}

/// What a command showed the user.
#[derive(Debug)]
pub enum CommandOutcome {
    Converted(ConversionOutcome),
    Rates(RateTable),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<CommandOutcome> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.provider.base_url,
        timeout_secs = config.provider.timeout_secs,
        "Loaded config"
    );

    let provider = ExchangeRatesApiProvider::new(
        &config.provider.base_url,
        config.require_api_key()?,
        Duration::from_secs(config.provider.timeout_secs),
    )?;

    match command {
        AppCommand::Convert { from, to, amount } => {
            let from = from.as_deref().unwrap_or(&config.default_from);
            let to = to.as_deref().unwrap_or(&config.default_to);
            cli::convert::run(&provider, from, to, &amount)
                .await
                .map(CommandOutcome::Converted)
        }
        AppCommand::Rates => cli::rates::run(&provider)
            .await
            .map(CommandOutcome::Rates),
    }
}
