//! CLI interface for the NVS client.
//!
//! Each subcommand is non-interactive: arguments in, JSON out on stdout.
//! Human-readable notes go to stderr.
//!
//! - `nvs status`: is the provider answering?
//! - `nvs assets|nearby|age|recent`: provider queries.
//! - `nvs range`: pure geometry, no network.
//! - `nvs survey`: the full watch-circle walk for a ship position.

mod format;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::Config;
use crate::directory::{AssetDirectory, distance_and_bearing};
use crate::geo::{DistanceMethod, GeoPoint, RangeAndBearing, WatchCircle, range_and_bearing};
use crate::model::Asset;
use crate::provider::Transport;

use format::{format_age, recent_view};

/// NVS: query buoy and mooring assets relative to a ship.
#[derive(Debug, Parser)]
#[command(name = "nvs", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Provider endpoint, overriding `base-url` from `~/.nvs/config.toml`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log provider traffic to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: a ship at the OSU dock
  1. nvs status
  2. nvs nearby --lat 44.6258 --lon -124.0451 --radius 1000 --online
  3. nvs age edu_oregonstate_buoys_Yaquina
  4. nvs recent edu_oregonstate_buoys_Yaquina

Or all at once:
  nvs survey --lat 44.6258 --lon -124.0451 --radius 1000 --method planar-euclidean

Geometry only:
  nvs range 44.6258 -124.0451 44.6180 -124.0330 --method great-circle"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether the provider is responding.
    Status,

    /// List asset metadata.
    Assets {
        /// Only assets whose deploy status is online.
        #[arg(long)]
        online: bool,
    },

    /// List assets inside a watch circle around the ship.
    ///
    /// Each asset is reported with its distance and bearing from the ship.
    Nearby {
        #[command(flatten)]
        circle: CircleArgs,

        /// Only assets whose deploy status is online.
        #[arg(long)]
        online: bool,
    },

    /// Distance and bearing between two points. No network access.
    Range {
        /// Latitude of the starting point (the ship).
        #[arg(allow_negative_numbers = true)]
        from_lat: f64,
        /// Longitude of the starting point.
        #[arg(allow_negative_numbers = true)]
        from_lon: f64,
        /// Latitude of the target.
        #[arg(allow_negative_numbers = true)]
        to_lat: f64,
        /// Longitude of the target.
        #[arg(allow_negative_numbers = true)]
        to_lon: f64,

        #[arg(long, value_enum, default_value_t = MethodArg::GreatCircle)]
        method: MethodArg,
    },

    /// How old an asset's latest data is.
    Age {
        /// Provider asset id (`siso_id`).
        asset_id: String,
    },

    /// Most recent value of every measurement an asset declares.
    ///
    /// Variables that could not be fetched are listed under `failures`.
    Recent {
        /// Provider asset id (`siso_id`).
        asset_id: String,
    },

    /// Nearby online assets with distance, bearing, data age and recent values.
    Survey {
        #[command(flatten)]
        circle: CircleArgs,
    },
}

/// Ship position and watch circle.
#[derive(Debug, clap::Args)]
pub struct CircleArgs {
    /// Ship latitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Ship longitude in decimal degrees.
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Watch circle radius in meters.
    #[arg(long, default_value_t = 1000.0)]
    radius: f64,

    #[arg(long, value_enum, default_value_t = MethodArg::GreatCircle)]
    method: MethodArg,
}

impl CircleArgs {
    fn to_domain(&self) -> Result<WatchCircle, String> {
        let ship = GeoPoint::new(self.lat, self.lon).map_err(|e| e.to_string())?;
        WatchCircle::new(ship, self.radius, self.method.to_domain()).map_err(|e| e.to_string())
    }
}

/// CLI-facing distance method, mapped to the domain `DistanceMethod`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    /// Haversine distance on a sphere.
    GreatCircle,
    /// Straight line between UTM coordinates.
    PlanarEuclidean,
    /// Taxicab distance between UTM coordinates.
    PlanarManhattan,
}

impl MethodArg {
    fn to_domain(self) -> DistanceMethod {
        match self {
            Self::GreatCircle => DistanceMethod::GreatCircle,
            Self::PlanarEuclidean => DistanceMethod::PlanarEuclidean,
            Self::PlanarManhattan => DistanceMethod::PlanarManhattan,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NearbyAsset<'a> {
    #[serde(flatten)]
    asset: &'a Asset,
    range: RangeAndBearing,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgeReport<'a> {
    asset_id: &'a str,
    age: String,
    age_seconds: i64,
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: Cli, config: &Config) -> Result<(), String> {
    let mut config = config.clone();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    config.validate()?;

    match cli.command {
        Command::Status => cmd_status(&config.directory()?),
        Command::Assets { online } => cmd_assets(&config.directory()?, online),
        Command::Nearby { circle, online } => {
            cmd_nearby(&config.directory()?, &circle.to_domain()?, online)
        }
        Command::Range {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            method,
        } => cmd_range(from_lat, from_lon, to_lat, to_lon, method),
        Command::Age { asset_id } => cmd_age(&config.directory()?, &asset_id),
        Command::Recent { asset_id } => cmd_recent(&config.directory()?, &asset_id),
        Command::Survey { circle } => cmd_survey(&config.directory()?, &circle.to_domain()?),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize: {e}"))?;
    println!("{json}");
    Ok(())
}

fn cmd_status<T: Transport>(directory: &AssetDirectory<T>) -> Result<(), String> {
    if directory.health_check() {
        println!("online");
        Ok(())
    } else {
        Err("provider is not responding".to_string())
    }
}

fn cmd_assets<T: Transport>(directory: &AssetDirectory<T>, online: bool) -> Result<(), String> {
    let assets = directory
        .list_assets(online)
        .map_err(|e| format!("failed to list assets: {e}"))?;
    eprintln!("{} asset(s)", assets.len());
    print_json(&assets)
}

fn cmd_nearby<T: Transport>(
    directory: &AssetDirectory<T>,
    circle: &WatchCircle,
    online: bool,
) -> Result<(), String> {
    let nearby = directory
        .find_nearby(circle, online)
        .map_err(|e| format!("failed to find nearby assets: {e}"))?;

    let report: Vec<NearbyAsset> = nearby
        .iter()
        .map(|asset| NearbyAsset {
            asset,
            range: distance_and_bearing(circle.center, asset, circle.method),
        })
        .collect();

    if report.is_empty() {
        eprintln!("No assets within {} m", circle.radius_meters);
    }
    print_json(&report)
}

fn cmd_range(
    from_lat: f64,
    from_lon: f64,
    to_lat: f64,
    to_lon: f64,
    method: MethodArg,
) -> Result<(), String> {
    let from = GeoPoint::new(from_lat, from_lon).map_err(|e| e.to_string())?;
    let to = GeoPoint::new(to_lat, to_lon).map_err(|e| e.to_string())?;
    print_json(&range_and_bearing(from, to, method.to_domain()))
}

fn require_asset<T: Transport>(directory: &AssetDirectory<T>, id: &str) -> Result<Asset, String> {
    directory
        .find_asset(id)
        .map_err(|e| format!("failed to look up asset: {e}"))?
        .ok_or_else(|| format!("no asset with id '{id}'"))
}

fn cmd_age<T: Transport>(directory: &AssetDirectory<T>, asset_id: &str) -> Result<(), String> {
    let asset = require_asset(directory, asset_id)?;
    let age = directory
        .data_age(&asset)
        .map_err(|e| format!("failed to get data age: {e}"))?;

    print_json(&AgeReport {
        asset_id: &asset.id,
        age: format_age(age),
        age_seconds: age.as_secs(),
    })
}

fn cmd_recent<T: Transport>(directory: &AssetDirectory<T>, asset_id: &str) -> Result<(), String> {
    let asset = require_asset(directory, asset_id)?;
    let recent = directory.recent_measurements(&asset);
    if !recent.is_complete() {
        eprintln!(
            "{} of {} variable(s) could not be fetched",
            recent.failures.len(),
            asset.measurements.len()
        );
    }
    print_json(&recent_view(&recent))
}

fn cmd_survey<T: Transport>(
    directory: &AssetDirectory<T>,
    circle: &WatchCircle,
) -> Result<(), String> {
    if !directory.health_check() {
        return Err("provider is not responding".to_string());
    }

    let nearby = directory
        .find_nearby(circle, true)
        .map_err(|e| format!("failed to find nearby assets: {e}"))?;

    if nearby.is_empty() {
        eprintln!("No online assets within {} m", circle.radius_meters);
    }

    for asset in &nearby {
        let range = distance_and_bearing(circle.center, asset, circle.method);
        eprintln!(
            "{} is {} m away at bearing {} degrees.",
            asset.name, range.distance_meters, range.bearing_degrees
        );

        match directory.data_age(asset) {
            Ok(age) => eprintln!("Data from {} is {} old.", asset.name, format_age(age)),
            Err(e) => eprintln!("Data age for {} unavailable: {e}", asset.name),
        }

        print_json(&recent_view(&directory.recent_measurements(asset)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "nvs",
            "nearby",
            "--lat",
            "44.6258",
            "--lon",
            "-124.0451",
            "--method",
            "planar-manhattan",
            "--online",
        ])
        .unwrap();

        match cli.command {
            Command::Nearby { circle, online } => {
                assert!(online);
                let circle = circle.to_domain().unwrap();
                assert!((circle.center.longitude() - -124.0451).abs() < 1e-9);
                assert!((circle.radius_meters - 1000.0).abs() < f64::EPSILON);
                assert_eq!(circle.method, DistanceMethod::PlanarManhattan);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_range_positionals() {
        let cli = Cli::try_parse_from([
            "nvs", "range", "44.6258", "-124.0451", "44.6180", "-124.0330",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Range {
                method: MethodArg::GreatCircle,
                ..
            }
        ));
    }

    #[test]
    fn invalid_radius_is_reported() {
        let cli = Cli::try_parse_from([
            "nvs", "survey", "--lat", "44.6", "--lon", "-124.0", "--radius", "0",
        ])
        .unwrap();
        let Command::Survey { circle } = cli.command else {
            panic!("expected survey");
        };
        let err = circle.to_domain().unwrap_err();
        assert!(err.contains("radius"), "{err}");
    }

    #[test]
    fn invalid_coordinates_are_reported() {
        let err = cmd_range(95.0, 0.0, 0.0, 0.0, MethodArg::GreatCircle).unwrap_err();
        assert!(err.contains("latitude"), "{err}");
    }

    #[test]
    fn global_base_url_after_subcommand() {
        let cli = Cli::try_parse_from(["nvs", "status", "--base-url", "http://localhost:1"])
            .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:1"));
    }

    #[test]
    fn empty_base_url_override_is_rejected() {
        for url in ["", "   "] {
            let cli = Cli::try_parse_from(["nvs", "status", "--base-url", url]).unwrap();
            let err = run(cli, &Config::default()).unwrap_err();
            assert!(err.contains("base-url is empty"), "{err}");
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
