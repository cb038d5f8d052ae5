//! Recent measurement samples.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize, Serializer};

/// One reading of one variable at one depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub variable_id: String,

    /// Positive up: a sensor 0.9 m below the surface reports -0.9.
    pub depth_meters: f64,

    pub value: f64,
    pub unit: String,

    /// When the reading was taken, normalized to UTC.
    pub timestamp_utc: Timestamp,
}

/// Identifies a sample within an asset's recent data: variable plus depth.
///
/// The depth is kept as the provider's label (e.g. `"-0.9 m"`) so that keys
/// compare exactly. Displays as `<variable>_<depth>`, e.g. `H1_Salinity_-0.9 m`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleKey {
    pub variable_id: String,
    pub depth_label: String,
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.variable_id, self.depth_label)
    }
}

// JSON object keys must be strings.
impl Serialize for SampleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// JSON shape of one entry in the `recent_values` result.
#[derive(Debug, Clone, Deserialize)]
pub struct SampleRecord {
    pub var_id: String,
    pub depth: String,

    #[serde(deserialize_with = "super::lenient_f64")]
    pub value: f64,

    #[serde(default)]
    pub units: String,

    /// Epoch seconds in the provider's local wall-clock.
    #[serde(deserialize_with = "super::lenient_i64")]
    pub time: i64,
}

/// JSON shape of one entry in the `data_age` result.
#[derive(Debug, Clone, Deserialize)]
pub struct DataAgeRecord {
    /// Epoch seconds in the provider's local wall-clock.
    #[serde(deserialize_with = "super::lenient_i64")]
    pub time: i64,
}

/// Parse a depth label such as `"-0.9 m"` or `"12m"` into meters.
pub fn parse_depth(label: &str) -> Option<f64> {
    let number = label.trim().trim_end_matches('m').trim_end();
    number.parse().ok().filter(|d: &f64| d.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_depth_labels() {
        assert_eq!(parse_depth("-0.9 m"), Some(-0.9));
        assert_eq!(parse_depth("12m"), Some(12.0));
        assert_eq!(parse_depth(" 0 m "), Some(0.0));
        assert_eq!(parse_depth("surface"), None);
        assert_eq!(parse_depth(""), None);
        assert_eq!(parse_depth("inf m"), None);
    }

    #[test]
    fn key_display_joins_variable_and_depth() {
        let key = SampleKey {
            variable_id: "H1_Salinity".into(),
            depth_label: "-0.9 m".into(),
        };
        assert_eq!(key.to_string(), "H1_Salinity_-0.9 m");
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"H1_Salinity_-0.9 m\""
        );
    }

    #[test]
    fn parses_recent_values_record() {
        let json = r#"{"var_id": "H1_Salinity", "depth": "-0.9 m", "value": "10.9",
                       "units": "PSU", "time": 1613754000}"#;
        let record: SampleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.var_id, "H1_Salinity");
        assert!((record.value - 10.9).abs() < 1e-9);
        assert_eq!(record.time, 1_613_754_000);
    }
}
