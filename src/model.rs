//! Records exchanged with the asset data provider.
//!
//! Wire shapes (`*Record`) mirror the provider's JSON and are converted
//! into the domain types re-exported here before leaving this crate.

mod asset;
mod sample;

use serde::{Deserialize, Deserializer};

pub use asset::{Asset, AssetRecord, DeployStatus, MeasurementSpec};
pub use sample::{DataAgeRecord, Sample, SampleKey, SampleRecord, parse_depth};

/// The provider sends some numbers as JSON strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Lenient::<f64>::deserialize(deserializer)? {
        Lenient::Value(n) => Ok(n),
        Lenient::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Lenient::<i64>::deserialize(deserializer)? {
        Lenient::Value(n) => Ok(n),
        Lenient::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
