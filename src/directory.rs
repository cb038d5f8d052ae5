//! Asset directory: provider queries shaped into ship-relative answers.
//!
//! Every call fetches fresh data; nothing is cached between calls and the
//! directory holds no per-call state, so a shared `&AssetDirectory` can be
//! used from several threads as long as the transport allows it.

use std::collections::BTreeMap;

use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use tracing::{debug, warn};

use crate::geo::{DistanceMethod, GeoPoint, RangeAndBearing, WatchCircle, range_and_bearing};
use crate::model::{
    Asset, AssetRecord, DataAgeRecord, Sample, SampleKey, SampleRecord, parse_depth,
};
use crate::provider::{Operation, Provider, ProviderError, Transport};
use crate::time::provider_instant;

/// Units convention requested for recent values.
const UNITS_MODE: &str = "v1";

/// Errors from directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("asset {asset_id} has no data")]
    NoData { asset_id: String },

    #[error("{operation}: malformed record: {reason}")]
    MalformedRecord {
        operation: Operation,
        reason: String,
    },

    #[error("invalid provider timestamp: {0}")]
    Time(#[from] jiff::Error),
}

impl DirectoryError {
    /// Whether the failure was the provider being out of reach, as opposed
    /// to bad or missing data.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_unavailable())
    }
}

pub type Result<T> = core::result::Result<T, DirectoryError>;

/// Samples gathered for one asset, plus the variables that could not be read.
#[derive(Debug, Default)]
pub struct RecentMeasurements {
    pub samples: BTreeMap<SampleKey, Sample>,
    pub failures: Vec<VariableFailure>,
}

impl RecentMeasurements {
    /// True when every declared variable was fetched.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A measurement variable whose recent values could not be collected.
#[derive(Debug)]
pub struct VariableFailure {
    pub variable_id: String,
    pub error: DirectoryError,
}

/// Queries the provider for assets and their data.
#[derive(Debug, Clone)]
pub struct AssetDirectory<T> {
    provider: Provider<T>,
    time_zone: TimeZone,
}

impl<T: Transport> AssetDirectory<T> {
    /// Creates a directory. `time_zone` is the zone the provider's clocks run in.
    pub fn new(transport: T, time_zone: TimeZone) -> Self {
        Self {
            provider: Provider::new(transport),
            time_zone,
        }
    }

    /// Whether the provider answers with a success status.
    ///
    /// An unreachable provider is reported as `false`, not as an error.
    pub fn health_check(&self) -> bool {
        match self.provider.ping() {
            Ok(response) => {
                debug!(status = response.status, "health check");
                response.is_success()
            }
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }

    /// All assets, or only those currently online.
    ///
    /// Records whose coordinates are out of range are skipped with a warning.
    pub fn list_assets(&self, online_only: bool) -> Result<Vec<Asset>> {
        let records: Vec<serde_json::Value> = self.provider.fetch(Operation::Meta, &[])?;
        let total = records.len();

        let assets: Vec<Asset> = records
            .into_iter()
            .filter_map(|record| {
                let id = record
                    .get("siso_id")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("<unknown>")
                    .to_string();
                parse_asset(record)
                    .inspect_err(|e| warn!(asset = %id, error = %e, "skipping asset"))
                    .ok()
            })
            .filter(|asset| !online_only || asset.deploy_status.is_online())
            .collect();

        debug!(total, kept = assets.len(), online_only, "listed assets");
        Ok(assets)
    }

    /// Look up one asset by provider id.
    pub fn find_asset(&self, id: &str) -> Result<Option<Asset>> {
        Ok(self
            .list_assets(false)?
            .into_iter()
            .find(|asset| asset.id == id))
    }

    /// Assets inside the watch circle. No matches is an empty list.
    pub fn find_nearby(&self, circle: &WatchCircle, online_only: bool) -> Result<Vec<Asset>> {
        let nearby = filter_nearby(self.list_assets(online_only)?, circle);
        debug!(
            found = nearby.len(),
            radius_meters = circle.radius_meters,
            method = ?circle.method,
            "nearby assets"
        );
        Ok(nearby)
    }

    /// How long ago the asset last reported data.
    pub fn data_age(&self, asset: &Asset) -> Result<SignedDuration> {
        self.data_age_at(asset, Timestamp::now())
    }

    /// Age of the asset's latest data as seen from `now`.
    pub fn data_age_at(&self, asset: &Asset, now: Timestamp) -> Result<SignedDuration> {
        let records: Vec<DataAgeRecord> = self
            .provider
            .fetch(Operation::DataAge, &[("asset_id", asset.id.as_str())])?;
        let latest = records.last().ok_or_else(|| DirectoryError::NoData {
            asset_id: asset.id.clone(),
        })?;

        let reported = provider_instant(latest.time, &self.time_zone)?;
        Ok(now.duration_since(reported))
    }

    /// Latest samples for every declared measurement, keyed by variable and depth.
    ///
    /// Fetches one variable at a time. A variable that fails is recorded in
    /// `failures` and contributes no samples; the others are still collected.
    pub fn recent_measurements(&self, asset: &Asset) -> RecentMeasurements {
        let mut recent = RecentMeasurements::default();

        for spec in &asset.measurements {
            match self.variable_samples(&asset.id, &spec.variable_id) {
                Ok(samples) => recent.samples.extend(samples),
                Err(error) => {
                    warn!(
                        asset = %asset.id,
                        variable = %spec.variable_id,
                        error = %error,
                        "failed to fetch recent values"
                    );
                    recent.failures.push(VariableFailure {
                        variable_id: spec.variable_id.clone(),
                        error,
                    });
                }
            }
        }

        recent
    }

    fn variable_samples(
        &self,
        asset_id: &str,
        variable_id: &str,
    ) -> Result<Vec<(SampleKey, Sample)>> {
        let records: Vec<SampleRecord> = self.provider.fetch(
            Operation::RecentValues,
            &[
                ("asset_id", asset_id),
                ("units_mode", UNITS_MODE),
                ("var_id", variable_id),
            ],
        )?;

        records
            .into_iter()
            .map(|record| -> Result<(SampleKey, Sample)> {
                let depth_meters =
                    parse_depth(&record.depth).ok_or_else(|| DirectoryError::MalformedRecord {
                        operation: Operation::RecentValues,
                        reason: format!("unreadable depth '{}'", record.depth),
                    })?;
                let timestamp_utc = provider_instant(record.time, &self.time_zone)?;

                let key = SampleKey {
                    variable_id: record.var_id.clone(),
                    depth_label: record.depth,
                };
                let sample = Sample {
                    variable_id: record.var_id,
                    depth_meters,
                    value: record.value,
                    unit: record.units,
                    timestamp_utc,
                };
                Ok((key, sample))
            })
            .collect()
    }
}

/// One `meta` entry. A record that fails here is skipped, not fatal to the listing.
fn parse_asset(record: serde_json::Value) -> Result<Asset> {
    let malformed = |reason: String| DirectoryError::MalformedRecord {
        operation: Operation::Meta,
        reason,
    };
    let record: AssetRecord =
        serde_json::from_value(record).map_err(|e| malformed(e.to_string()))?;
    Asset::try_from(record).map_err(|e| malformed(e.to_string()))
}

/// Keep the assets that lie inside `circle`, in their original order.
pub fn filter_nearby(assets: impl IntoIterator<Item = Asset>, circle: &WatchCircle) -> Vec<Asset> {
    assets
        .into_iter()
        .filter(|asset| circle.contains(asset.location))
        .collect()
}

/// Distance and bearing from the ship to an asset.
pub fn distance_and_bearing(
    ship: GeoPoint,
    asset: &Asset,
    method: DistanceMethod,
) -> RangeAndBearing {
    range_and_bearing(ship, asset.location, method)
}
