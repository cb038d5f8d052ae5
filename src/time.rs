//! Provider timestamp normalization.
//!
//! The provider reports times as epoch seconds, but the value encodes a
//! wall-clock reading in the provider's local zone rather than a true UTC
//! instant. Rendering the seconds as a UTC civil time and re-reading that
//! civil time in the provider zone recovers the real instant.

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;

/// Zone the provider's clocks run in when none is configured.
pub const DEFAULT_PROVIDER_TIME_ZONE: &str = "America/Los_Angeles";

/// ISO-8601 rendering used for sample timestamps.
const ISO8601: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Convert a provider epoch-seconds reading to the UTC instant it denotes.
///
/// Wall-clock times skipped or repeated by a DST transition resolve with
/// jiff's "compatible" strategy (later offset for gaps, earlier for folds).
pub fn provider_instant(epoch_seconds: i64, zone: &TimeZone) -> Result<Timestamp, jiff::Error> {
    let wall_clock: DateTime = TimeZone::UTC.to_datetime(Timestamp::from_second(epoch_seconds)?);
    Ok(wall_clock.to_zoned(zone.clone())?.timestamp())
}

/// Format an instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn iso8601(instant: Timestamp) -> String {
    instant.strftime(ISO8601).to_string()
}
