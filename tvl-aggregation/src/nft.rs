//! Summary statistics over an NFT trading volume series.

use serde::{Deserialize, Serialize};

/// Daily NFT volume record, as served by the NFT chart feed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct NftVolumeRecord {
    #[serde(default, deserialize_with = "crate::series::de_opt_timestamp")]
    pub date: Option<i64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default, rename = "volumeUSD")]
    pub volume_usd: Option<f64>,
}

/// Cumulative and latest-day volume statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct NftStatistics {
    #[serde(rename = "totalVolumeUSD")]
    pub total_volume_usd: f64,
    #[serde(rename = "totalVolume")]
    pub total_volume: f64,
    #[serde(rename = "dailyVolumeUSD")]
    pub daily_volume_usd: f64,
    #[serde(rename = "dailyVolume")]
    pub daily_volume: f64,
    /// Percent change of the last day's USD volume against the day before.
    ///
    /// Unlike [`percent_change`](crate::change::percent_change) the baseline is not guarded: a
    /// zero or missing previous volume yields NaN / ±inf (serialised as `null`).
    #[serde(rename = "dailyChange")]
    pub daily_change: f64,
}

impl NftStatistics {
    /// Reduce an ordered-by-date volume series.
    pub fn from_records(records: &[NftVolumeRecord]) -> Self {
        let (total_volume, total_volume_usd) =
            records.iter().fold((0.0, 0.0), |(volume, volume_usd), record| {
                (
                    volume + record.volume.unwrap_or(0.0),
                    volume_usd + record.volume_usd.unwrap_or(0.0),
                )
            });

        let last = records.last();
        let daily_volume = last.and_then(|record| record.volume).unwrap_or(0.0);
        let daily_volume_usd = last.and_then(|record| record.volume_usd).unwrap_or(0.0);

        let daily_change = match records {
            [.., previous, _] => {
                let previous = previous.volume_usd.unwrap_or(f64::NAN);
                ((daily_volume_usd - previous) / previous) * 100.0
            }
            _ => 0.0,
        };

        Self {
            total_volume_usd,
            total_volume,
            daily_volume_usd,
            daily_volume,
            daily_change,
        }
    }
}
