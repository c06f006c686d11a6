use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tvl_aggregation::{
    decode,
    error::AggregationError,
    feed::{ConfigResponse, ProtocolDetailResponse, ProtocolsResponse},
    nft::NftVolumeRecord,
    series::ChainChart,
    MarketCaps,
};

const PROTOCOLS_FILE: &str = "protocols.json";
const CONFIG_FILE: &str = "config.json";
const MARKET_CAPS_FILE: &str = "mcaps.json";
const NFT_CHART_FILE: &str = "nft_chart.json";
const CHARTS_DIR: &str = "charts";
const PROTOCOL_DIR: &str = "protocol";
const HOURLY_PROTOCOL_DIR: &str = "hourly";

/// Chart file name used for the all-chains chart.
pub const ALL_CHAINS_CHART: &str = "total";

/// Upstream payloads stored on disk, one file per feed response:
///
/// ```text
/// <data_dir>/protocols.json
/// <data_dir>/config.json
/// <data_dir>/mcaps.json
/// <data_dir>/nft_chart.json
/// <data_dir>/charts/<chain>.json
/// <data_dir>/protocol/<slug>.json
/// <data_dir>/hourly/<slug>.json
/// ```
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn protocols(&self) -> Result<ProtocolsResponse, AggregationError> {
        read_json(&self.root.join(PROTOCOLS_FILE))
    }

    pub fn config(&self) -> Result<ConfigResponse, AggregationError> {
        read_json(&self.root.join(CONFIG_FILE))
    }

    pub fn market_caps(&self) -> Result<MarketCaps, AggregationError> {
        read_json(&self.root.join(MARKET_CAPS_FILE))
    }

    pub fn nft_chart(&self) -> Result<Vec<NftVolumeRecord>, AggregationError> {
        read_json(&self.root.join(NFT_CHART_FILE))
    }

    /// Chart of `chain`, or `None` if it was never fetched.
    pub fn chart(&self, chain: &str) -> Result<Option<ChainChart>, AggregationError> {
        read_optional_json(&self.root.join(CHARTS_DIR).join(format!("{chain}.json")))
    }

    /// Protocol detail for `slug`, replaced by the hourly payload when daily history is short
    /// and an hourly payload is available.
    pub fn protocol_detail(&self, slug: &str) -> Result<ProtocolDetailResponse, AggregationError> {
        let file = format!("{slug}.json");
        let detail: ProtocolDetailResponse = read_json(&self.root.join(PROTOCOL_DIR).join(&file))?;

        if !detail.needs_hourly_fallback() {
            return Ok(detail);
        }

        match read_optional_json::<ProtocolDetailResponse>(
            &self.root.join(HOURLY_PROTOCOL_DIR).join(&file),
        )? {
            Some(hourly) => {
                debug!(%slug, points = detail.tvl.len(), "using hourly protocol detail");
                Ok(ProtocolDetailResponse {
                    is_hourly_chart: true,
                    ..hourly
                })
            }
            None => Ok(detail),
        }
    }
}

fn read_json<T>(path: &Path) -> Result<T, AggregationError>
where
    T: DeserializeOwned,
{
    let payload = std::fs::read_to_string(path).map_err(|error| AggregationError::Source {
        path: path.display().to_string(),
        reason: error.to_string(),
    })?;

    decode(&payload)
}

fn read_optional_json<T>(path: &Path) -> Result<Option<T>, AggregationError>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        warn!(path = %path.display(), "payload not found, skipping");
        return Ok(None);
    }
    read_json(path).map(Some)
}
