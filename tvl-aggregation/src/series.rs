//! Daily TVL time series and historical offset lookups.

use chrono::{DateTime, Duration, Utc};
use derive_more::{Constructor, From};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Series kind (eg/ "tvl", "staking", "borrowed") -> ascending [`TvlPoint`] series, as served
/// by the per-chain chart feed.
pub type ChainChart = IndexMap<String, Vec<TvlPoint>>;

/// Series kind holding a chain's core TVL.
pub const TVL_SERIES: &str = "tvl";

/// A single `(unix_timestamp_secs, value)` observation.
///
/// Encoded on the wire as a two element array. Upstream occasionally serves the timestamp as a
/// numeric string, and the value as `null`, so both are decoded leniently.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Constructor, From)]
pub struct TvlPoint(
    #[serde(deserialize_with = "de_timestamp")] pub i64,
    #[serde(deserialize_with = "de_value")] pub f64,
);

impl TvlPoint {
    pub fn timestamp(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberLike::deserialize(deserializer)? {
        NumberLike::Int(timestamp) => Ok(timestamp),
        NumberLike::Float(timestamp) => Ok(timestamp.trunc() as i64),
        NumberLike::Text(text) => text
            .trim()
            .parse::<i64>()
            .or_else(|_| text.trim().parse::<f64>().map(|ts| ts.trunc() as i64))
            .map_err(|_| serde::de::Error::custom(format!("invalid timestamp: {text}"))),
        NumberLike::Missing => Err(serde::de::Error::custom("missing timestamp")),
    }
}

/// Lenient optional timestamp, `null` and absent fields decode as `None`.
pub(crate) fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberLike::deserialize(deserializer)? {
        NumberLike::Int(timestamp) => Ok(Some(timestamp)),
        NumberLike::Float(timestamp) => Ok(Some(timestamp.trunc() as i64)),
        NumberLike::Text(text) => Ok(text
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| text.trim().parse::<f64>().ok().map(|ts| ts.trunc() as i64))),
        NumberLike::Missing => Ok(None),
    }
}

fn de_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberLike::deserialize(deserializer)? {
        NumberLike::Int(value) => value as f64,
        NumberLike::Float(value) => value,
        NumberLike::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        NumberLike::Missing => 0.0,
    })
}

/// Value of the most recent point at or before `timestamp`, or `None` if the series starts
/// after it. `series` must be ascending by timestamp.
pub fn value_at_or_before(series: &[TvlPoint], timestamp: i64) -> Option<f64> {
    let index = series.partition_point(|point| point.timestamp() <= timestamp);
    index.checked_sub(1).map(|index| series[index].value())
}

/// Value of the series `days_before` days before `as_of`.
pub fn prev_value_from_chart(
    series: &[TvlPoint],
    as_of: DateTime<Utc>,
    days_before: i64,
) -> Option<f64> {
    let target = as_of - Duration::days(days_before);
    value_at_or_before(series, target.timestamp())
}

/// Drops the fractional part of every value, keeping timestamps.
pub fn truncate_series(series: &[TvlPoint]) -> Vec<TvlPoint> {
    series
        .iter()
        .map(|point| TvlPoint::new(point.timestamp(), point.value().trunc()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const DAY: i64 = 86_400;

    fn daily_series(start: i64, values: &[f64]) -> Vec<TvlPoint> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| TvlPoint::new(start + index as i64 * DAY, *value))
            .collect()
    }

    #[test]
    fn test_value_at_or_before() {
        struct TestCase {
            timestamp: i64,
            expected: Option<f64>,
        }

        let series = daily_series(1_000 * DAY, &[10.0, 20.0, 30.0]);

        let tests = vec![
            TestCase {
                // TC0: before the first point
                timestamp: 1_000 * DAY - 1,
                expected: None,
            },
            TestCase {
                // TC1: exactly on the first point
                timestamp: 1_000 * DAY,
                expected: Some(10.0),
            },
            TestCase {
                // TC2: inside a gap takes the earlier point
                timestamp: 1_001 * DAY + 3_600,
                expected: Some(20.0),
            },
            TestCase {
                // TC3: after the last point
                timestamp: 2_000 * DAY,
                expected: Some(30.0),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = value_at_or_before(&series, test.timestamp);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }

        assert_eq!(value_at_or_before(&[], 1_000 * DAY), None);
    }

    #[test]
    fn test_prev_value_from_chart() {
        let start = 1_700_000_000 - 40 * DAY;
        let values = (0..=40).map(|day| day as f64).collect::<Vec<_>>();
        let series = daily_series(start, &values);
        let as_of = Utc.timestamp_opt(1_700_000_000 + 60, 0).unwrap();

        assert_eq!(prev_value_from_chart(&series, as_of, 0), Some(40.0));
        assert_eq!(prev_value_from_chart(&series, as_of, 1), Some(39.0));
        assert_eq!(prev_value_from_chart(&series, as_of, 7), Some(33.0));
        assert_eq!(prev_value_from_chart(&series, as_of, 30), Some(10.0));
        assert_eq!(prev_value_from_chart(&series, as_of, 41), None);
    }

    #[test]
    fn test_tvl_point_de_lenient() {
        let input = r#"[[1596248105, 10.5], ["1596334505", 11], [1596420905.0, null], ["1596507305", "12.25"]]"#;
        let actual = serde_json::from_str::<Vec<TvlPoint>>(input).unwrap();
        let expected = vec![
            TvlPoint::new(1596248105, 10.5),
            TvlPoint::new(1596334505, 11.0),
            TvlPoint::new(1596420905, 0.0),
            TvlPoint::new(1596507305, 12.25),
        ];
        assert_eq!(actual, expected);

        assert!(serde_json::from_str::<Vec<TvlPoint>>(r#"[["yesterday", 1.0]]"#).is_err());
    }

    #[test]
    fn test_tvl_point_ser_as_pair() {
        let actual = serde_json::to_string(&TvlPoint::new(1596248105, 42.0)).unwrap();
        assert_eq!(actual, "[1596248105,42.0]");
    }

    #[test]
    fn test_truncate_series() {
        let series = vec![TvlPoint::new(1, 10.9), TvlPoint::new(2, -3.7)];
        assert_eq!(
            truncate_series(&series),
            vec![TvlPoint::new(1, 10.0), TvlPoint::new(2, -3.0)]
        );
    }
}
