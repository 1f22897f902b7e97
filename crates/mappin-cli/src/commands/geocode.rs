//! Geocode command implementation

use crate::cli::GeocodeArgs;
use crate::output::OutputWriter;
use crate::output_types::{GeocodeOutput, GeocodeResultItem};
use anyhow::{anyhow, Context, Result};
use mappin_core::config::LayeredConfig;
use mappin_core::models::Coordinate;
use mappin_core::ports::GeocodingPort;
use tabled::Tabled;

pub async fn execute(args: GeocodeArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let geocoder = super::hosted_geocoder(config)?;

    let results = if args.reverse {
        let at = parse_lat_lng(&args.query)?;
        let label = geocoder
            .reverse_geocode(at)
            .await
            .with_context(|| format!("Reverse lookup of {} failed", at))?;
        label
            .map(|label| GeocodeResultItem { label, location: Some(at) })
            .into_iter()
            .collect::<Vec<_>>()
    } else {
        geocoder
            .forward_geocode(&args.query)
            .await
            .with_context(|| format!("Lookup of '{}' failed", args.query))?
            .into_iter()
            .map(|candidate| GeocodeResultItem {
                label: candidate.label,
                location: Some(candidate.coordinate),
            })
            .collect()
    };

    if output.is_json() {
        return output.result(GeocodeOutput {
            query: args.query,
            geocoder: geocoder.id().to_string(),
            results,
        });
    }

    if results.is_empty() {
        output.info(format!("No places found for '{}'", args.query));
        return Ok(());
    }

    #[derive(Tabled)]
    struct PlaceRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "Place")]
        label: String,
        #[tabled(rename = "Location")]
        location: String,
    }

    output.section(format!("Results for '{}'", args.query));
    let rows = results
        .into_iter()
        .enumerate()
        .map(|(i, item)| PlaceRow {
            rank: i + 1,
            label: item.label,
            location: item.location.map(|at| at.to_string()).unwrap_or_default(),
        })
        .collect();
    output.table(rows);

    Ok(())
}

/// Parse "lat,lng" as typed on the command line
fn parse_lat_lng(text: &str) -> Result<Coordinate> {
    let (lat, lng) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected \"lat,lng\", got '{}'", text))?;
    let latitude: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude '{}'", lat))?;
    let longitude: f64 =
        lng.trim().parse().with_context(|| format!("Invalid longitude '{}'", lng))?;
    Ok(Coordinate::new(latitude, longitude)?)
}
