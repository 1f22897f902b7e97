use clap::{Parser, Subcommand};
use mappin_core::models::FormLocation;
use std::path::PathBuf;

/// Mappin - pick locations on a map and bind them to form inputs
#[derive(Parser, Debug)]
#[command(name = "mappin")]
#[command(about = "Headless driver for the map-picking widget", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./mappin.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Map and geocoder access token
    #[arg(long, global = true, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// Geocoder endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub geocoder_url: Option<String>,

    /// Country code used for the initial map position
    #[arg(long, global = true)]
    pub country: Option<String>,

    /// Postal code used for the initial map position
    #[arg(long, global = true)]
    pub postal_code: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mount the widget on a form and replay a gesture script
    Simulate(SimulateArgs),

    /// Look up an address or a coordinate
    Geocode(GeocodeArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// XHTML fragment holding the form's labels and inputs
    #[arg(long, value_name = "FILE")]
    pub form: PathBuf,

    /// JSON array of widget inputs to replay
    #[arg(long, value_name = "FILE")]
    pub script: PathBuf,

    /// Where the form is placed relative to the map
    #[arg(long, value_enum)]
    pub form_location: Option<FormLocationArg>,

    /// Print placed pins as a GeoJSON FeatureCollection
    #[arg(long)]
    pub geojson: bool,

    /// Never call the hosted geocoder
    #[arg(long)]
    pub offline: bool,
}

#[derive(Parser, Debug)]
pub struct GeocodeArgs {
    /// Address text, or "lat,lng" with --reverse
    pub query: String,

    /// Resolve a coordinate to a place name
    #[arg(long)]
    pub reverse: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FormLocationArg {
    Top,
    Bottom,
}

impl From<FormLocationArg> for FormLocation {
    fn from(arg: FormLocationArg) -> Self {
        match arg {
            FormLocationArg::Top => FormLocation::Top,
            FormLocationArg::Bottom => FormLocation::Bottom,
        }
    }
}
