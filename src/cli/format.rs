//! Output formatting for CLI display.

use std::collections::BTreeMap;

use jiff::SignedDuration;
use serde::Serialize;

use crate::directory::RecentMeasurements;
use crate::time::iso8601;

/// Format a data age as `N days, HH:MM:SS`.
pub(super) fn format_age(age: SignedDuration) -> String {
    let sign = if age.is_negative() { "-" } else { "" };
    let total = age.as_secs().unsigned_abs();

    let days = total / 86_400;
    let hours = total % 86_400 / 3600;
    let minutes = total % 3600 / 60;
    let seconds = total % 60;
    let clock = format!("{hours:02}:{minutes:02}:{seconds:02}");

    match days {
        0 => format!("{sign}{clock}"),
        1 => format!("{sign}1 day, {clock}"),
        n => format!("{sign}{n} days, {clock}"),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SampleView<'a> {
    value: f64,
    unit: &'a str,
    time: String,
    depth_meters: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FailureView<'a> {
    variable_id: &'a str,
    error: String,
}

/// Recent measurements keyed by `<variable>_<depth>`, plus any failures.
#[derive(Debug, Serialize)]
pub(super) struct RecentView<'a> {
    samples: BTreeMap<String, SampleView<'a>>,
    failures: Vec<FailureView<'a>>,
}

pub(super) fn recent_view(recent: &RecentMeasurements) -> RecentView<'_> {
    RecentView {
        samples: recent
            .samples
            .iter()
            .map(|(key, sample)| {
                let view = SampleView {
                    value: sample.value,
                    unit: &sample.unit,
                    time: iso8601(sample.timestamp_utc),
                    depth_meters: sample.depth_meters,
                };
                (key.to_string(), view)
            })
            .collect(),
        failures: recent
            .failures
            .iter()
            .map(|f| FailureView {
                variable_id: &f.variable_id,
                error: f.error.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::directory::{DirectoryError, VariableFailure};
    use crate::model::{Sample, SampleKey};

    #[test]
    fn formats_ages() {
        assert_eq!(format_age(SignedDuration::from_secs(0)), "00:00:00");
        assert_eq!(format_age(SignedDuration::from_secs(3_725)), "01:02:05");
        assert_eq!(format_age(SignedDuration::from_secs(86_400 + 59)), "1 day, 00:00:59");
        assert_eq!(
            format_age(SignedDuration::from_secs(3 * 86_400 + 7_200)),
            "3 days, 02:00:00"
        );
        assert_eq!(format_age(SignedDuration::from_secs(-90)), "-00:01:30");
    }

    #[test]
    fn recent_view_uses_display_keys_and_iso_times() {
        let mut recent = RecentMeasurements::default();
        recent.samples.insert(
            SampleKey {
                variable_id: "H1_Salinity".into(),
                depth_label: "-0.9 m".into(),
            },
            Sample {
                variable_id: "H1_Salinity".into(),
                depth_meters: -0.9,
                value: 10.9,
                unit: "PSU".into(),
                timestamp_utc: Timestamp::from_second(1_613_782_800).unwrap(),
            },
        );
        recent.failures.push(VariableFailure {
            variable_id: "H1_WaterTemperature".into(),
            error: DirectoryError::NoData {
                asset_id: "yaquina".into(),
            },
        });

        let json = serde_json::to_value(recent_view(&recent)).unwrap();
        let sample = &json["samples"]["H1_Salinity_-0.9 m"];
        assert_eq!(sample["unit"], "PSU");
        assert_eq!(sample["time"], "2021-02-20T01:00:00Z");
        assert_eq!(sample["depthMeters"], -0.9);
        assert_eq!(json["failures"][0]["variableId"], "H1_WaterTemperature");
        assert_eq!(json["failures"][0]["error"], "asset yaquina has no data");
    }
}
