//! Display-ready compositions over already-fetched feed data.
//!
//! Each composition combines the lower level builders the way a listing page consumes them.
//! None of them perform I/O.

use crate::{
    chain::{build_chain_records, ChainInputs, ChainMetadataMap, ChainRecord, MarketCaps},
    error::AggregationError,
    filter::{filter_protocols, format_protocols, ProtocolQuery},
    parent::{group_by_parent, ParentGrouping},
    protocol::{Protocol, ProtocolView},
    series::{truncate_series, ChainChart, TvlPoint, TVL_SERIES},
    stacked::{build_stacked_dataset, StackedDataset},
};
use chrono::{DateTime, Utc};
use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Chain category selecting every chain.
pub const ALL_CATEGORY: &str = "All";

/// Chain category selecting every chain not tagged [`EVM_CATEGORY`].
pub const NON_EVM_CATEGORY: &str = "Non-EVM";

pub const EVM_CATEGORY: &str = "EVM";

/// Auxiliary chart kinds carried by a chain page, besides the core `tvl` chart.
pub const EXTRA_CHART_KINDS: [&str; 5] = ["staking", "borrowed", "pool2", "offers", "treasury"];

/// Chain category as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum ChainCategory {
    #[display("All")]
    All,
    #[display("Non-EVM")]
    NonEvm,
    #[display("{_0}")]
    Named(String),
}

impl ChainCategory {
    pub fn parse(category: &str) -> Self {
        match category {
            ALL_CATEGORY => Self::All,
            NON_EVM_CATEGORY => Self::NonEvm,
            named => Self::Named(named.to_string()),
        }
    }

    fn selects(&self, metadata_categories: &[String]) -> bool {
        match self {
            ChainCategory::All => true,
            ChainCategory::NonEvm => !metadata_categories.iter().any(|c| c == EVM_CATEGORY),
            ChainCategory::Named(name) => metadata_categories.iter().any(|c| c == name),
        }
    }
}

/// Navigation entry of the chains listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CategoryLink {
    pub label: String,
    pub to: String,
}

impl CategoryLink {
    fn new(label: &str) -> Self {
        let to = match label {
            ALL_CATEGORY => "/chains".to_string(),
            label => format!("/chains/{label}"),
        };
        Self {
            label: label.to_string(),
            to,
        }
    }
}

/// Tunables of [`chains_page`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainsPageOptions {
    /// Chains never listed, regardless of category.
    pub excluded_chains: Vec<String>,
}

impl Default for ChainsPageOptions {
    fn default() -> Self {
        Self {
            excluded_chains: vec!["Syscoin".to_string()],
        }
    }
}

/// Protocols listing filtered by category and optionally by chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolsPage {
    pub filtered_protocols: Vec<ProtocolView>,
    pub chain: String,
    pub category: Option<String>,
    /// Chains used by the category's protocols, in upstream order.
    pub chains: Vec<String>,
}

/// Protocols listing with a caller-defined projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleProtocolsPage {
    pub protocols: Vec<ProtocolView>,
    pub chains: Vec<String>,
}

/// Single chain (or all chains) overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    pub chains_set: Vec<String>,
    pub filtered_protocols: Vec<ProtocolView>,
    pub chart: Vec<TvlPoint>,
    pub extra_volumes_charts: IndexMap<String, Vec<TvlPoint>>,
}

/// Chains listing for a chain category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainsPage {
    pub chains_unique: Vec<String>,
    pub chain_tvls: Vec<ChainRecord>,
    pub stacked_dataset: StackedDataset,
    pub category: String,
    pub categories: Vec<CategoryLink>,
    pub chains_groupby_parent: ParentGrouping,
}

/// Protocols in `category`, with the chain universe narrowed to chains those protocols use.
///
/// The chain filter applies after the chain universe is collected, so the chain selector
/// still offers every chain of the category.
pub fn protocols_page(
    protocols: &[Protocol],
    chains: &[String],
    category: Option<&str>,
    chain: Option<&str>,
) -> ProtocolsPage {
    let records = format_protocols(protocols, None, category);

    let used_chains = records
        .iter()
        .flat_map(|record| record.chains.iter().map(String::as_str))
        .collect::<IndexSet<_>>();

    let filtered_protocols = records
        .iter()
        .filter(|record| chain.is_none_or(|chain| record.chains.iter().any(|c| c == chain)))
        .map(|record| record.project_default())
        .collect();

    ProtocolsPage {
        filtered_protocols,
        chain: chain.unwrap_or(ALL_CATEGORY).to_string(),
        category: category.map(str::to_string),
        chains: chains
            .iter()
            .filter(|chain| used_chains.contains(chain.as_str()))
            .cloned()
            .collect(),
    }
}

/// Every protocol, globally formatted and projected onto `fields`.
pub fn simple_protocols_page<S>(
    protocols: &[Protocol],
    chains: &[String],
    fields: &[S],
) -> SimpleProtocolsPage
where
    S: AsRef<str>,
{
    let query = ProtocolQuery::new().with_fields(fields.iter().map(|field| field.as_ref()));
    SimpleProtocolsPage {
        protocols: filter_protocols(protocols, &query),
        chains: chains.to_vec(),
    }
}

/// Chain overview: chain-scoped protocols, truncated core chart and auxiliary charts.
///
/// `chart` is the chain's chart, or the all-chains chart when `chain` is `None`. Missing
/// series default to empty.
pub fn chain_page(
    chain: Option<&str>,
    chart: &ChainChart,
    protocols: &[Protocol],
    chains: &[String],
) -> ChainPage {
    let query = ProtocolQuery {
        chain: chain.map(str::to_string),
        ..Default::default()
    };

    let truncated = |kind: &str| {
        chart
            .get(kind)
            .map(|series| truncate_series(series))
            .unwrap_or_default()
    };

    ChainPage {
        chain: chain.map(str::to_string),
        chains_set: chains.to_vec(),
        filtered_protocols: filter_protocols(protocols, &query),
        chart: truncated(TVL_SERIES),
        extra_volumes_charts: EXTRA_CHART_KINDS
            .into_iter()
            .map(|kind| (kind.to_string(), truncated(kind)))
            .collect(),
    }
}

/// Union of every chain's metadata categories, in first-seen order.
pub fn chain_category_universe(metadata: &ChainMetadataMap) -> Vec<String> {
    metadata
        .values()
        .flat_map(|metadata| metadata.categories.iter())
        .unique()
        .cloned()
        .collect()
}

/// Chains of `chains` belonging to `category`, skipping excluded chains.
pub fn select_chains(
    chains: &[String],
    metadata: &ChainMetadataMap,
    category: &ChainCategory,
    options: &ChainsPageOptions,
) -> Vec<String> {
    chains
        .iter()
        .filter(|chain| !options.excluded_chains.contains(*chain))
        .filter(|chain| {
            let categories = metadata
                .get(chain.as_str())
                .map(|metadata| metadata.categories.as_slice())
                .unwrap_or_default();
            category.selects(categories)
        })
        .cloned()
        .collect()
}

/// Chains listing for `category`.
///
/// `inputs.chains` is the full chain universe; it is narrowed to the category before building
/// records. Fails with [`AggregationError::CategoryNotFound`] if `category` is neither a
/// pseudo-category nor declared by any chain's metadata.
pub fn chains_page(
    category: &str,
    inputs: &ChainInputs<'_>,
    options: &ChainsPageOptions,
    as_of: DateTime<Utc>,
) -> Result<ChainsPage, AggregationError> {
    let universe = chain_category_universe(inputs.metadata);
    let requested = ChainCategory::parse(category);

    if let ChainCategory::Named(name) = &requested {
        if !universe.contains(name) {
            return Err(AggregationError::CategoryNotFound(name.clone()));
        }
    }

    let categories = [ALL_CATEGORY, NON_EVM_CATEGORY]
        .into_iter()
        .chain(universe.iter().map(String::as_str))
        .map(CategoryLink::new)
        .collect();

    let chains_unique = select_chains(inputs.chains, inputs.metadata, &requested, options);
    info!(
        %requested,
        chains = chains_unique.len(),
        "building chains page"
    );

    let scoped = ChainInputs {
        chains: &chains_unique,
        ..*inputs
    };

    let chain_tvls = build_chain_records(&scoped, as_of);
    let chains_groupby_parent = group_by_parent(&chains_unique, inputs.metadata);
    let stacked_dataset = build_stacked_dataset(
        chains_unique
            .iter()
            .filter_map(|chain| inputs.charts.get(chain).map(|chart| (chain, chart))),
    );

    debug!(
        parents = chains_groupby_parent.len(),
        timestamps = stacked_dataset.len(),
        "built chains page"
    );

    Ok(ChainsPage {
        chains_unique,
        chain_tvls,
        stacked_dataset,
        category: requested.to_string(),
        categories,
        chains_groupby_parent,
    })
}

/// Bundles owned chain feed data so a [`ChainInputs`] view can borrow from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainFeeds {
    pub chains: Vec<String>,
    pub charts: IndexMap<String, ChainChart>,
    pub metadata: ChainMetadataMap,
    pub market_caps: MarketCaps,
    pub protocols: Vec<Protocol>,
}

impl ChainFeeds {
    pub fn inputs(&self) -> ChainInputs<'_> {
        ChainInputs {
            chains: &self.chains,
            charts: &self.charts,
            metadata: &self.metadata,
            market_caps: &self.market_caps,
            protocols: &self.protocols,
        }
    }
}
