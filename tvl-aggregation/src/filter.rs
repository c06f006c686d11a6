//! Filtering and reshaping of the protocol collection by chain and/or category.

use crate::{
    change::percent_change,
    protocol::{ExtraTvlMap, Protocol, ProtocolRecord, ProtocolView, DEFAULT_PROTOCOL_FIELDS},
    section::{classify_section, SectionMode},
};
use tracing::debug;

/// Selection and projection parameters for [`filter_protocols`].
///
/// Empty strings are treated as "not given".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtocolQuery {
    pub chain: Option<String>,
    pub category: Option<String>,
    pub fields: Option<Vec<String>>,
}

impl ProtocolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn chain(&self) -> Option<&str> {
        non_empty(self.chain.as_deref())
    }

    pub fn category(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Filter, reshape and project `protocols` according to `query`.
///
/// Chain-scoped results are sorted by descending `tvl`; global results keep input order.
pub fn filter_protocols(protocols: &[Protocol], query: &ProtocolQuery) -> Vec<ProtocolView> {
    let records = format_protocols(protocols, query.chain(), query.category());

    match &query.fields {
        Some(fields) => records.iter().map(|record| record.project(fields)).collect(),
        None => records.iter().map(ProtocolRecord::project_default).collect(),
    }
}

/// [`filter_protocols`] without the final projection, yielding full [`ProtocolRecord`]s.
pub fn format_protocols(
    protocols: &[Protocol],
    chain: Option<&str>,
    category: Option<&str>,
) -> Vec<ProtocolRecord> {
    let chain = non_empty(chain);
    let category = non_empty(category);

    let mut records = protocols
        .iter()
        .filter(|protocol| chain.is_none_or(|chain| protocol.is_on_chain(chain)))
        .filter(|protocol| category.is_none_or(|category| protocol.is_in_category(category)))
        .map(|protocol| format_protocol(protocol, chain))
        .collect::<Vec<_>>();

    if chain.is_some() {
        records.sort_by(|a, b| b.tvl.total_cmp(&a.tvl));
    }

    debug!(
        input = protocols.len(),
        output = records.len(),
        ?chain,
        ?category,
        "formatted protocols"
    );

    records
}

/// Reshape a single protocol, scoping TVL to `chain` when given.
pub fn format_protocol(protocol: &Protocol, chain: Option<&str>) -> ProtocolRecord {
    let (tvl, tvl_prev_day, tvl_prev_week, tvl_prev_month) = match chain {
        Some(chain) => {
            let section = protocol.chain_tvls.get(chain).copied().unwrap_or_default();
            (
                section.tvl.unwrap_or(0.0),
                section.tvl_prev_day,
                section.tvl_prev_week,
                section.tvl_prev_month,
            )
        }
        None => (
            protocol.tvl.unwrap_or(0.0),
            protocol.tvl_prev_day,
            protocol.tvl_prev_week,
            protocol.tvl_prev_month,
        ),
    };

    let mode = SectionMode::from_chain(chain);
    let extra_tvl = protocol
        .chain_tvls
        .iter()
        .filter_map(|(section_name, section)| {
            classify_section(section_name, mode).map(|category| (category.to_string(), *section))
        })
        .collect::<ExtraTvlMap>();

    ProtocolRecord {
        name: protocol.name.clone(),
        symbol: protocol.symbol.clone(),
        chains: protocol.chains.clone(),
        category: protocol.category.clone(),
        tvl,
        tvl_prev_day,
        tvl_prev_week,
        tvl_prev_month,
        change_1d: percent_change(Some(tvl), tvl_prev_day),
        change_7d: percent_change(Some(tvl), tvl_prev_week),
        change_1m: percent_change(Some(tvl), tvl_prev_month),
        mcap: protocol.mcap,
        extra_tvl,
        chain_tvls: protocol.chain_tvls.clone(),
        other: ProtocolRecord::passthrough_fields(protocol),
    }
}

/// Default output fields as owned strings, for callers that extend the allow-list.
pub fn default_fields() -> Vec<String> {
    DEFAULT_PROTOCOL_FIELDS.iter().map(|field| field.to_string()).collect()
}
