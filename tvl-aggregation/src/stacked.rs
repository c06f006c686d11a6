//! Multi-chain stacked dataset: every chain's series folded into a single timestamp-keyed
//! structure for layered time-series rendering.

use crate::series::ChainChart;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Points strictly before this unix timestamp are excluded from the stacked dataset.
pub const STACKED_HISTORY_FLOOR: i64 = 1596248105;

/// Series kind -> value, for one chain at one timestamp.
pub type SeriesValues = IndexMap<String, f64>;

/// Chain name -> [`SeriesValues`], for one timestamp.
pub type StackedRow = IndexMap<String, SeriesValues>;

/// `(timestamp, row)` pair. Serialised as a two element array.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StackedEntry(pub i64, pub StackedRow);

impl StackedEntry {
    pub fn timestamp(&self) -> i64 {
        self.0
    }

    pub fn row(&self) -> &StackedRow {
        &self.1
    }
}

/// Ascending by timestamp, one entry per distinct timestamp.
pub type StackedDataset = Vec<StackedEntry>;

/// Owned accumulator for the stacked dataset fold.
///
/// Writing a value for `(timestamp, chain, kind)` never removes sibling kinds already recorded
/// for the same `(timestamp, chain)`; only the identical key is overwritten.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StackedAccumulator {
    rows: BTreeMap<i64, StackedRow>,
}

impl StackedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single value. Returns `false` if the timestamp precedes
    /// [`STACKED_HISTORY_FLOOR`] and the value was dropped.
    pub fn insert(&mut self, timestamp: i64, chain: &str, kind: &str, value: f64) -> bool {
        if timestamp < STACKED_HISTORY_FLOOR {
            return false;
        }

        self.rows
            .entry(timestamp)
            .or_default()
            .entry(chain.to_string())
            .or_default()
            .insert(kind.to_string(), value);
        true
    }

    /// Merge every series of `chain`'s chart.
    pub fn add_chart(mut self, chain: &str, chart: &ChainChart) -> Self {
        for (kind, series) in chart {
            for point in series {
                self.insert(point.timestamp(), chain, kind, point.value());
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_dataset(self) -> StackedDataset {
        self.rows
            .into_iter()
            .map(|(timestamp, row)| StackedEntry(timestamp, row))
            .collect()
    }
}

/// Fold every chain's chart into a [`StackedDataset`], sorted ascending by timestamp.
pub fn build_stacked_dataset<'a, I, S>(charts_by_chain: I) -> StackedDataset
where
    I: IntoIterator<Item = (S, &'a ChainChart)>,
    S: AsRef<str>,
{
    let accumulator = charts_by_chain
        .into_iter()
        .fold(StackedAccumulator::new(), |accumulator, (chain, chart)| {
            accumulator.add_chart(chain.as_ref(), chart)
        });

    debug!(timestamps = accumulator.len(), "built stacked dataset");

    accumulator.into_dataset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::TvlPoint;

    fn chart(series: Vec<(&str, Vec<(i64, f64)>)>) -> ChainChart {
        series
            .into_iter()
            .map(|(kind, points)| {
                (
                    kind.to_string(),
                    points.into_iter().map(TvlPoint::from).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_stacked_accumulator_floor() {
        struct TestCase {
            timestamp: i64,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: one second before the floor is excluded
                timestamp: 1596248104,
                expected: false,
            },
            TestCase {
                // TC1: exactly on the floor is included
                timestamp: 1596248105,
                expected: true,
            },
            TestCase {
                // TC2: long before the floor
                timestamp: 0,
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let mut accumulator = StackedAccumulator::new();
            let actual = accumulator.insert(test.timestamp, "Ethereum", "tvl", 1.0);
            assert_eq!(actual, test.expected, "TC{} failed", index);
            assert_eq!(accumulator.is_empty(), !test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_stacked_accumulator_preserves_sibling_kinds() {
        let t = STACKED_HISTORY_FLOOR + 100;
        let mut accumulator = StackedAccumulator::new();

        accumulator.insert(t, "Ethereum", "tvl", 100.0);
        accumulator.insert(t, "Ethereum", "staking", 5.0);
        accumulator.insert(t, "Polygon", "tvl", 7.0);
        accumulator.insert(t, "Ethereum", "tvl", 110.0);

        let dataset = accumulator.into_dataset();
        assert_eq!(dataset.len(), 1);

        let ethereum = &dataset[0].row()["Ethereum"];
        assert_eq!(ethereum.len(), 2);
        assert_eq!(ethereum["tvl"], 110.0);
        assert_eq!(ethereum["staking"], 5.0);
        assert_eq!(dataset[0].row()["Polygon"]["tvl"], 7.0);
    }

    #[test]
    fn test_build_stacked_dataset() {
        let floor = STACKED_HISTORY_FLOOR;
        let ethereum = chart(vec![
            ("tvl", vec![(floor - 1, 1.0), (floor, 100.0), (floor + 86_400, 110.0)]),
            ("staking", vec![(floor, 5.0)]),
        ]);
        let polygon = chart(vec![(
            "tvl",
            vec![(floor + 86_400, 20.0), (floor + 2 * 86_400, 25.0)],
        )]);
        let charts = IndexMap::from([
            ("Ethereum".to_string(), ethereum),
            ("Polygon".to_string(), polygon),
        ]);

        let actual = build_stacked_dataset(&charts);

        let timestamps = actual.iter().map(StackedEntry::timestamp).collect::<Vec<_>>();
        assert_eq!(timestamps, vec![floor, floor + 86_400, floor + 2 * 86_400]);

        let first = actual[0].row();
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["Ethereum"]);
        assert_eq!(first["Ethereum"]["tvl"], 100.0);
        assert_eq!(first["Ethereum"]["staking"], 5.0);

        let second = actual[1].row();
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["Ethereum", "Polygon"]);
        assert_eq!(second["Ethereum"].len(), 1);

        let serialised = serde_json::to_value(&actual[2]).unwrap();
        assert_eq!(
            serialised,
            serde_json::json!([floor + 2 * 86_400, { "Polygon": { "tvl": 25.0 } }])
        );
    }

    #[test]
    fn test_build_stacked_dataset_empty() {
        let charts: IndexMap<String, ChainChart> = IndexMap::new();
        assert!(build_stacked_dataset(&charts).is_empty());
    }
}
