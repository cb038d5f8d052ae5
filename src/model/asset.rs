//! Asset metadata: where a buoy or mooring sits and what it measures.

use serde::{Deserialize, Serialize};

use crate::geo::{GeoError, GeoPoint};

/// A deployed sensor platform as described by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Provider identifier (`siso_id`).
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    pub deploy_status: DeployStatus,

    /// Declared measurement variables, in provider order.
    pub measurements: Vec<MeasurementSpec>,
}

/// Deployment state reported for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeployStatus {
    Online,
    Offline,

    /// Any status text the provider sends that is neither of the above.
    Other(String),
}

impl DeployStatus {
    /// Classify a raw status label such as `"online"` or `"offline - recovered"`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.contains("offline") {
            Self::Offline
        } else if lower.contains("online") {
            Self::Online
        } else {
            Self::Other(label.to_string())
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// A measurement variable an asset declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSpec {
    #[serde(rename(deserialize = "var_id"))]
    pub variable_id: String,

    #[serde(rename(deserialize = "units"), default)]
    pub unit: Option<String>,
}

/// JSON shape of one entry in the `meta` result.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRecord {
    #[serde(rename = "siso_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(deserialize_with = "super::lenient_f64")]
    pub lat: f64,

    #[serde(deserialize_with = "super::lenient_f64")]
    pub lon: f64,

    #[serde(default)]
    pub deploy_status: String,

    #[serde(default)]
    pub measurements: Vec<MeasurementSpec>,
}

impl TryFrom<AssetRecord> for Asset {
    type Error = GeoError;

    fn try_from(record: AssetRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            location: GeoPoint::new(record.lat, record.lon)?,
            deploy_status: DeployStatus::from_label(&record.deploy_status),
            id: record.id,
            name: record.name,
            measurements: record.measurements,
        })
    }
}
