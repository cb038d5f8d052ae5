//! Client for the NANOOS Visualization System (NVS) asset service.
//!
//! Looks up buoy and mooring assets, reads their recent data, and relates
//! their positions to a ship: distance, bearing, and whether they fall
//! inside a watch circle.
//!
//! ```no_run
//! use nvs::{Config, DistanceMethod, GeoPoint, WatchCircle};
//!
//! let directory = Config::default().directory()?;
//! let ship = GeoPoint::new(44.6258, -124.0451)?;
//! let circle = WatchCircle::new(ship, 1000.0, DistanceMethod::GreatCircle)?;
//!
//! for asset in directory.find_nearby(&circle, true)? {
//!     let range = nvs::distance_and_bearing(ship, &asset, circle.method);
//!     println!("{} is {} m away", asset.name, range.distance_meters);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod directory;
pub mod geo;
pub mod model;
pub mod provider;
pub mod time;

pub use config::Config;
pub use directory::{
    AssetDirectory, DirectoryError, RecentMeasurements, VariableFailure, distance_and_bearing,
    filter_nearby,
};
pub use geo::{
    DistanceMethod, GeoError, GeoPoint, RangeAndBearing, WatchCircle, compute_bearing,
    compute_distance, is_within_radius, range_and_bearing,
};
pub use model::{Asset, DeployStatus, MeasurementSpec, Sample, SampleKey};
pub use provider::{HttpResponse, ProviderError, Transport, TransportError, UreqTransport};
