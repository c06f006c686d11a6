use chrono::{DateTime, TimeZone, Utc};
use std::{path::PathBuf, str::FromStr};
use tracing::warn;

/// Report produced by a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    Protocols,
    SimpleProtocols,
    Chain,
    #[default]
    Chains,
    Protocol,
    ProtocolNames,
    Nft,
}

impl FromStr for Report {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "protocols" => Ok(Report::Protocols),
            "simple-protocols" => Ok(Report::SimpleProtocols),
            "chain" => Ok(Report::Chain),
            "chains" => Ok(Report::Chains),
            "protocol" => Ok(Report::Protocol),
            "protocol-names" => Ok(Report::ProtocolNames),
            "nft" => Ok(Report::Nft),
            other => Err(format!("unknown report: {other}")),
        }
    }
}

/// Invocation settings, read from `TVL_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `TVL_REPORT`
    pub report: Report,
    /// `TVL_DATA_DIR`, directory holding the upstream payloads
    pub data_dir: PathBuf,
    /// `TVL_CHAIN`
    pub chain: Option<String>,
    /// `TVL_CATEGORY`, chain category for the chains report, protocol category otherwise
    pub category: Option<String>,
    /// `TVL_PROTOCOL`, name or slug for the protocol report
    pub protocol: Option<String>,
    /// `TVL_FIELDS`, comma separated projection for the simple protocols report
    pub fields: Option<Vec<String>>,
    /// `TVL_AS_OF`, unix seconds or RFC 3339
    pub as_of: DateTime<Utc>,
    /// `TVL_PRETTY`
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report: Report::default(),
            data_dir: PathBuf::from("data"),
            chain: None,
            category: None,
            protocol: None,
            fields: None,
            as_of: Utc::now(),
            pretty: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or empty variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let report = var("TVL_REPORT")
            .and_then(|report| {
                report
                    .parse::<Report>()
                    .inspect_err(|error| warn!(%error, "falling back to default report"))
                    .ok()
            })
            .unwrap_or(defaults.report);

        let as_of = var("TVL_AS_OF")
            .and_then(|as_of| {
                let parsed = parse_as_of(&as_of);
                if parsed.is_none() {
                    warn!(%as_of, "invalid TVL_AS_OF, using current time");
                }
                parsed
            })
            .unwrap_or(defaults.as_of);

        Self {
            report,
            data_dir: var("TVL_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            chain: var("TVL_CHAIN"),
            category: var("TVL_CATEGORY"),
            protocol: var("TVL_PROTOCOL"),
            fields: var("TVL_FIELDS").map(|fields| {
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|field| !field.is_empty())
                    .map(String::from)
                    .collect()
            }),
            as_of,
            pretty: var("TVL_PRETTY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pretty),
        }
    }
}

fn parse_as_of(input: &str) -> Option<DateTime<Utc>> {
    match input.trim().parse::<i64>() {
        Ok(timestamp) => Utc.timestamp_opt(timestamp, 0).single(),
        Err(_) => DateTime::parse_from_rfc3339(input.trim())
            .ok()
            .map(|as_of| as_of.with_timezone(&Utc)),
    }
}
