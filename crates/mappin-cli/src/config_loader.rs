//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use mappin_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

const DEFAULT_CONFIG_FILE: &str = "mappin.toml";

/// Load defaults, then the config file, then the environment, then flags
pub fn load(cli: &Cli, overrides: CliConfigOverrides) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_path(cli.config.as_deref()) {
        tracing::debug!("Loading configuration from {}", path.display());
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);
    Ok(config)
}

/// Flags shared by every command
pub fn global_overrides(cli: &Cli) -> CliConfigOverrides {
    CliConfigOverrides {
        access_token: cli.access_token.clone(),
        form_location: None,
        geocoder_url: cli.geocoder_url.clone(),
        country_code: cli.country.clone(),
        postal_code: cli.postal_code.clone(),
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.is_file().then_some(fallback)
        }
    }
}
