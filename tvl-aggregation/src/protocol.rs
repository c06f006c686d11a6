//! Protocol models, as served by the protocols feed and as reshaped for display.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Section name -> TVL snapshot, eg/ `"Ethereum"`, `"Ethereum-staking"`, `"treasury"`.
pub type ChainTvls = IndexMap<String, SectionTvl>;

/// Auxiliary category -> TVL snapshot.
pub type ExtraTvlMap = IndexMap<String, SectionTvl>;

/// Output fields of a reshaped protocol when the caller does not provide an allow-list.
pub const DEFAULT_PROTOCOL_FIELDS: [&str; 12] = [
    "tvl",
    "name",
    "symbol",
    "chains",
    "change_1d",
    "change_7d",
    "change_1m",
    "tvlPrevDay",
    "tvlPrevWeek",
    "tvlPrevMonth",
    "mcap",
    "extraTvl",
];

/// Fields owned by [`ProtocolRecord`]; upstream copies of these are discarded rather than
/// carried in [`ProtocolRecord::other`].
const RECORD_FIELDS: [&str; 14] = [
    "name",
    "symbol",
    "chains",
    "category",
    "tvl",
    "tvlPrevDay",
    "tvlPrevWeek",
    "tvlPrevMonth",
    "change_1d",
    "change_7d",
    "change_1m",
    "mcap",
    "extraTvl",
    "chainTvls",
];

/// TVL of one `chainTvls` section at the current time and three historical offsets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTvl {
    pub tvl: Option<f64>,
    pub tvl_prev_day: Option<f64>,
    pub tvl_prev_week: Option<f64>,
    pub tvl_prev_month: Option<f64>,
}

/// Protocol entry of the protocols feed.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    #[serde(default, deserialize_with = "de_null_default")]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub chains: Vec<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub chain_tvls: ChainTvls,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tvl: Option<f64>,
    #[serde(default)]
    pub tvl_prev_day: Option<f64>,
    #[serde(default)]
    pub tvl_prev_week: Option<f64>,
    #[serde(default)]
    pub tvl_prev_month: Option<f64>,
    #[serde(default)]
    pub mcap: Option<f64>,
    /// Remaining upstream fields (slug, logo, url, ...), kept so an allow-list can select them.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Protocol {
    /// Does this protocol deploy on `chain`?
    pub fn is_on_chain(&self, chain: &str) -> bool {
        self.chains.iter().any(|candidate| candidate == chain)
    }

    /// Case-insensitive category match. A protocol without a category never matches.
    pub fn is_in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == category.to_lowercase())
    }
}

/// Protocol reshaped for display, with chain-scoped TVL, percent changes and extra TVL.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub chains: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tvl: f64,
    pub tvl_prev_day: Option<f64>,
    pub tvl_prev_week: Option<f64>,
    pub tvl_prev_month: Option<f64>,
    #[serde(rename = "change_1d")]
    pub change_1d: Option<f64>,
    #[serde(rename = "change_7d")]
    pub change_7d: Option<f64>,
    #[serde(rename = "change_1m")]
    pub change_1m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcap: Option<f64>,
    pub extra_tvl: ExtraTvlMap,
    pub chain_tvls: ChainTvls,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ProtocolRecord {
    /// Upstream fields not owned by the record itself.
    pub(crate) fn passthrough_fields(protocol: &Protocol) -> Map<String, Value> {
        protocol
            .other
            .iter()
            .filter(|(key, _)| !RECORD_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Keep only the allow-listed `fields`, in allow-list order. Fields the record does not
    /// carry are omitted.
    pub fn project<S>(&self, fields: &[S]) -> ProtocolView
    where
        S: AsRef<str>,
    {
        let Ok(Value::Object(mut record)) = serde_json::to_value(self) else {
            return ProtocolView::default();
        };

        ProtocolView(
            fields
                .iter()
                .filter_map(|field| record.remove_entry(field.as_ref()))
                .collect(),
        )
    }

    /// [`Self::project`] with [`DEFAULT_PROTOCOL_FIELDS`].
    pub fn project_default(&self) -> ProtocolView {
        self.project(&DEFAULT_PROTOCOL_FIELDS)
    }
}

/// Display projection of a [`ProtocolRecord`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ProtocolView(pub Map<String, Value>);

impl ProtocolView {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn tvl(&self) -> Option<f64> {
        self.get("tvl").and_then(Value::as_f64)
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }
}

/// Decode `null` as `T::default()`.
pub(crate) fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
