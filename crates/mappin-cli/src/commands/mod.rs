//! Command implementations

mod config;
mod geocode;
mod simulate;

use crate::cli::{Cli, Commands};
use crate::config_loader;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use mappin_core::config::LayeredConfig;
use mappin_core::ports::GeocodingPort;
use mappin_geocode::{MapboxGeocoder, StaticGeocoder};
use std::sync::Arc;
use std::time::Duration;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    let mut overrides = config_loader::global_overrides(&cli);
    if let Commands::Simulate(args) = &cli.command {
        overrides.form_location = args.form_location.map(Into::into);
    }
    let config = config_loader::load(&cli, overrides)?;

    match cli.command {
        Commands::Simulate(args) => simulate::execute(args, &config, &output).await,
        Commands::Geocode(args) => geocode::execute(args, &config, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}

/// The hosted geocoder for the configured endpoint and token
fn hosted_geocoder(config: &LayeredConfig) -> Result<MapboxGeocoder> {
    let token = config
        .require_access_token()
        .context("Set MAPPIN_ACCESS_TOKEN or pass --access-token")?;
    let geocoder = MapboxGeocoder::new(
        config.geocoder_url.value.clone(),
        token,
        Duration::from_secs(config.geocoder_timeout_secs.value),
    )?;
    Ok(geocoder)
}

/// Hosted geocoder when a token is configured, otherwise an empty offline one
fn widget_geocoder(
    config: &LayeredConfig,
    offline: bool,
    output: &OutputWriter,
) -> Result<Arc<dyn GeocodingPort>> {
    if offline {
        return Ok(Arc::new(StaticGeocoder::new()));
    }

    if config.require_access_token().is_err() {
        output.warning("No access token configured; addresses will not be resolved");
        return Ok(Arc::new(StaticGeocoder::new()));
    }

    Ok(Arc::new(hosted_geocoder(config)?))
}
