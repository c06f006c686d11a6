//! Per-chain TVL rollups: historical offsets, market caps, protocol counts and cross-protocol
//! auxiliary TVL.

use crate::{
    change::percent_change,
    protocol::{Protocol, SectionTvl},
    section::split_chain_category,
    series::{prev_value_from_chart, ChainChart, TvlPoint, TVL_SERIES},
};
use chrono::{DateTime, Utc};
use fnv::FnvHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Symbol displayed for chains without metadata.
pub const UNKNOWN_CHAIN_SYMBOL: &str = "-";

/// Chain name -> static chain metadata, as served by the config feed.
pub type ChainMetadataMap = IndexMap<String, ChainMetadata>;

/// Price-feed id -> market cap quote.
pub type MarketCaps = FnvHashMap<String, MarketCapQuote>;

/// Category -> summed auxiliary TVL for a single chain.
pub type ChainExtraTvl = IndexMap<String, ExtraTvlTotals>;

/// Static metadata describing a chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    /// Identifier of the chain's native asset in the price feed.
    #[serde(default)]
    pub gecko_id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "crate::protocol::de_null_default")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
}

impl ChainMetadata {
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|own| own == category)
    }
}

/// Price-feed market cap response entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct MarketCapQuote {
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
}

/// Summed auxiliary TVL. Absent inputs count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraTvlTotals {
    pub tvl: f64,
    pub tvl_prev_day: f64,
    pub tvl_prev_week: f64,
    pub tvl_prev_month: f64,
}

impl ExtraTvlTotals {
    pub fn add(self, section: &SectionTvl) -> Self {
        Self {
            tvl: self.tvl + section.tvl.unwrap_or(0.0),
            tvl_prev_day: self.tvl_prev_day + section.tvl_prev_day.unwrap_or(0.0),
            tvl_prev_week: self.tvl_prev_week + section.tvl_prev_week.unwrap_or(0.0),
            tvl_prev_month: self.tvl_prev_month + section.tvl_prev_month.unwrap_or(0.0),
        }
    }
}

/// Owned accumulator of auxiliary TVL per `(chain, category)`, summed across protocols.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtraTvlAccumulator {
    chains: IndexMap<String, ChainExtraTvl>,
}

impl ExtraTvlAccumulator {
    /// Fold every protocol's `"<chain>-<category>"` sections into a new accumulator.
    pub fn fold<'a, I>(protocols: I) -> Self
    where
        I: IntoIterator<Item = &'a Protocol>,
    {
        protocols
            .into_iter()
            .fold(Self::default(), |accumulator, protocol| accumulator.add_protocol(protocol))
    }

    pub fn add_protocol(mut self, protocol: &Protocol) -> Self {
        for (section_name, section) in &protocol.chain_tvls {
            self.add_section(section_name, section);
        }
        self
    }

    /// Add one section. Returns `false` if the section name is not `"<chain>-<category>"`.
    pub fn add_section(&mut self, section_name: &str, section: &SectionTvl) -> bool {
        let Some((chain, category)) = split_chain_category(section_name) else {
            return false;
        };

        let totals = self
            .chains
            .entry(chain.to_string())
            .or_default()
            .entry(category)
            .or_default();
        *totals = totals.add(section);
        true
    }

    pub fn chain(&self, chain: &str) -> Option<&ChainExtraTvl> {
        self.chains.get(chain)
    }

    pub fn into_inner(self) -> IndexMap<String, ChainExtraTvl> {
        self.chains
    }
}

/// Number of protocols deployed on each chain.
pub fn count_protocols_per_chain(protocols: &[Protocol]) -> FnvHashMap<String, usize> {
    protocols
        .iter()
        .flat_map(|protocol| protocol.chains.iter())
        .fold(FnvHashMap::default(), |mut counts, chain| {
            *counts.entry(chain.clone()).or_insert(0) += 1;
            counts
        })
}

/// Market cap of `chain`'s native asset. Missing metadata, quotes or a zero cap yield `None`.
pub fn resolve_market_cap(
    chain: &str,
    metadata: &ChainMetadataMap,
    market_caps: &MarketCaps,
) -> Option<f64> {
    let gecko_id = metadata.get(chain)?.gecko_id.as_deref()?;
    market_caps
        .get(gecko_id)?
        .usd_market_cap
        .filter(|market_cap| *market_cap != 0.0)
}

/// Display-ready rollup of a single chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    pub name: String,
    pub symbol: String,
    pub tvl: Option<f64>,
    pub tvl_prev_day: Option<f64>,
    pub tvl_prev_week: Option<f64>,
    pub tvl_prev_month: Option<f64>,
    pub mcap: Option<f64>,
    pub protocols: usize,
    pub extra_tvl: ChainExtraTvl,
    #[serde(rename = "change_1d")]
    pub change_1d: Option<f64>,
    #[serde(rename = "change_7d")]
    pub change_7d: Option<f64>,
    #[serde(rename = "change_1m")]
    pub change_1m: Option<f64>,
}

/// Raw feed data required to build [`ChainRecord`]s.
#[derive(Debug, Clone, Copy)]
pub struct ChainInputs<'a> {
    /// Chains to build records for.
    pub chains: &'a [String],
    /// Chain name -> that chain's chart.
    pub charts: &'a IndexMap<String, ChainChart>,
    pub metadata: &'a ChainMetadataMap,
    pub market_caps: &'a MarketCaps,
    pub protocols: &'a [Protocol],
}

impl ChainInputs<'_> {
    fn tvl_series(&self, chain: &str) -> &[TvlPoint] {
        self.charts
            .get(chain)
            .and_then(|chart| chart.get(TVL_SERIES))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Build one [`ChainRecord`] per input chain, sorted by descending `tvl`. Chains without TVL
/// data rank as zero and keep their input order among equal values.
///
/// Historical values are looked up relative to `as_of`.
pub fn build_chain_records(inputs: &ChainInputs<'_>, as_of: DateTime<Utc>) -> Vec<ChainRecord> {
    let protocol_counts = count_protocols_per_chain(inputs.protocols);
    let extra_tvl = ExtraTvlAccumulator::fold(inputs.protocols);

    let mut records = inputs
        .chains
        .iter()
        .map(|chain| {
            if !inputs.charts.contains_key(chain) {
                warn!(%chain, "missing chain chart, tvl defaults to null");
            }
            let metadata = inputs.metadata.get(chain);
            if metadata.is_none() {
                warn!(%chain, "missing chain metadata");
            }

            let series = inputs.tvl_series(chain);
            let tvl = prev_value_from_chart(series, as_of, 0);
            let tvl_prev_day = prev_value_from_chart(series, as_of, 1);
            let tvl_prev_week = prev_value_from_chart(series, as_of, 7);
            let tvl_prev_month = prev_value_from_chart(series, as_of, 30);

            ChainRecord {
                name: chain.clone(),
                symbol: metadata
                    .and_then(|metadata| metadata.symbol.clone())
                    .unwrap_or_else(|| UNKNOWN_CHAIN_SYMBOL.to_string()),
                tvl,
                tvl_prev_day,
                tvl_prev_week,
                tvl_prev_month,
                mcap: resolve_market_cap(chain, inputs.metadata, inputs.market_caps),
                protocols: protocol_counts.get(chain).copied().unwrap_or(0),
                extra_tvl: extra_tvl.chain(chain).cloned().unwrap_or_default(),
                change_1d: percent_change(tvl, tvl_prev_day),
                change_7d: percent_change(tvl, tvl_prev_week),
                change_1m: percent_change(tvl, tvl_prev_month),
            }
        })
        .collect::<Vec<_>>();

    records.sort_by(|a, b| cmp_tvl_descending(a.tvl, b.tvl));

    debug!(chains = records.len(), %as_of, "built chain records");

    records
}

/// Missing TVL ranks as zero.
fn cmp_tvl_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}
