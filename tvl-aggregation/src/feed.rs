//! Upstream payload shapes and the decoding boundary.
//!
//! Everything past [`decode`] operates on typed values with missing fields defaulted.

use crate::{
    chain::ChainMetadataMap,
    error::AggregationError,
    protocol::{de_null_default, Protocol},
    series::{de_opt_timestamp, TvlPoint},
};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Detail payloads with fewer daily points than this are replaced by the hourly payload.
pub const HOURLY_FALLBACK_MIN_POINTS: usize = 7;

/// Decode an upstream JSON payload.
pub fn decode<T>(payload: &str) -> Result<T, AggregationError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(payload).map_err(AggregationError::from)
}

/// Protocols feed response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolsResponse {
    #[serde(default, deserialize_with = "de_null_default")]
    pub protocols: Vec<Protocol>,
    /// Every chain with at least one protocol, in upstream (TVL) order.
    #[serde(default, deserialize_with = "de_null_default")]
    pub chains: Vec<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub protocol_categories: Vec<String>,
}

/// Config feed response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    #[serde(default, deserialize_with = "de_null_default")]
    pub chain_coingecko_ids: ChainMetadataMap,
}

/// Protocol name and symbol pair, as used by search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProtocolName {
    pub name: String,
    pub symbol: Option<String>,
}

pub fn protocol_names(protocols: &[Protocol]) -> Vec<ProtocolName> {
    protocols
        .iter()
        .map(|protocol| ProtocolName {
            name: protocol.name.clone(),
            symbol: protocol.symbol.clone(),
        })
        .collect()
}

/// Normalise a protocol name into its URL slug: lowercase, spaces to `-`, apostrophes dropped.
pub fn standardize_protocol_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "-").replace('\'', "")
}

/// Protocols indexed by [`standardize_protocol_name`]. Later duplicates replace earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtocolDirectory {
    protocols: IndexMap<String, Protocol>,
}

impl ProtocolDirectory {
    pub fn new(protocols: &[Protocol]) -> Self {
        Self {
            protocols: protocols
                .iter()
                .map(|protocol| (standardize_protocol_name(&protocol.name), protocol.clone()))
                .collect(),
        }
    }

    /// Look up by display name or slug.
    pub fn get(&self, name: &str) -> Option<&Protocol> {
        self.protocols.get(&standardize_protocol_name(name))
    }

    /// As [`Self::get`], failing with [`AggregationError::ProtocolNotFound`].
    pub fn find(&self, name: &str) -> Result<&Protocol, AggregationError> {
        self.get(name)
            .ok_or_else(|| AggregationError::ProtocolNotFound(standardize_protocol_name(name)))
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.protocols.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

/// Point of a protocol detail `tvl` history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvlHistoryPoint {
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub date: Option<i64>,
    #[serde(default, rename = "totalLiquidityUSD")]
    pub total_liquidity_usd: Option<f64>,
}

/// Protocol detail feed response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetailResponse {
    #[serde(default, deserialize_with = "de_null_default")]
    pub tvl: Vec<TvlHistoryPoint>,
    /// Historical per-section series, passed through untouched.
    #[serde(default, deserialize_with = "de_null_default")]
    pub chain_tvls: Map<String, Value>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub current_chain_tvls: IndexMap<String, f64>,
    /// Set when this payload is the hourly replacement for a short daily history.
    #[serde(default)]
    pub is_hourly_chart: bool,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ProtocolDetailResponse {
    /// Too little daily history to chart; callers should fetch the hourly payload instead.
    pub fn needs_hourly_fallback(&self) -> bool {
        self.tvl.len() < HOURLY_FALLBACK_MIN_POINTS
    }
}

/// Protocol detail fused for display.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedProtocol {
    /// Latest `totalLiquidityUSD`, or 0 without history.
    pub tvl: f64,
    /// Dated history points as `[date, value]` pairs.
    pub tvl_list: Vec<TvlPoint>,
    pub historical_chain_tvls: Map<String, Value>,
    /// Current TVL per section.
    pub chain_tvls: IndexMap<String, f64>,
    pub is_hourly_chart: bool,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Fuse a protocol detail payload: latest TVL, dated history list, and the current and
/// historical per-section TVL under display names.
pub fn fuse_protocol_detail(detail: ProtocolDetailResponse) -> FusedProtocol {
    let tvl = detail
        .tvl
        .last()
        .and_then(|point| point.total_liquidity_usd)
        .unwrap_or(0.0);

    let tvl_list = detail
        .tvl
        .iter()
        .filter_map(|point| match point.date {
            Some(date) if date != 0 => Some(TvlPoint::new(
                date,
                point.total_liquidity_usd.unwrap_or(0.0),
            )),
            _ => None,
        })
        .collect();

    FusedProtocol {
        tvl,
        tvl_list,
        historical_chain_tvls: detail.chain_tvls,
        chain_tvls: detail.current_chain_tvls,
        is_hourly_chart: detail.is_hourly_chart,
        other: detail.other,
    }
}
