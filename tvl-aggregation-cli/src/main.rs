mod config;
mod source;

use config::{Config, Report};
use indexmap::IndexMap;
use serde_json::Value;
use source::{DataDir, ALL_CHAINS_CHART};
use tracing::{error, info};
use tvl_aggregation::{
    error::AggregationError,
    feed::{fuse_protocol_detail, protocol_names, standardize_protocol_name, ProtocolDirectory},
    filter::default_fields,
    nft::NftStatistics,
    page::{
        chain_page, chains_page, protocols_page, simple_protocols_page, ChainFeeds,
        ChainsPageOptions, ALL_CATEGORY,
    },
};

fn main() {
    init_logging();

    let config = Config::from_env();

    info!(
        report = ?config.report,
        data_dir = %config.data_dir.display(),
        as_of = %config.as_of,
        "Starting tvl aggregation"
    );

    if let Err(error) = run(&config) {
        error!(%error, not_found = error.is_not_found(), "Aggregation failed");
        std::process::exit(1);
    }
}

/// Build the configured report and print it to stdout as JSON.
fn run(config: &Config) -> Result<(), AggregationError> {
    let data = DataDir::new(&config.data_dir);
    let output = build_report(config, &data)?;

    let rendered = if config.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}

fn build_report(config: &Config, data: &DataDir) -> Result<Value, AggregationError> {
    let chain = config.chain.as_deref();
    let category = config.category.as_deref();

    let output = match config.report {
        Report::Protocols => {
            let feed = data.protocols()?;
            serde_json::to_value(protocols_page(&feed.protocols, &feed.chains, category, chain))?
        }
        Report::SimpleProtocols => {
            let feed = data.protocols()?;
            let fields = config.fields.clone().unwrap_or_else(default_fields);
            serde_json::to_value(simple_protocols_page(&feed.protocols, &feed.chains, &fields))?
        }
        Report::Chain => {
            let feed = data.protocols()?;
            let chart = data
                .chart(chain.unwrap_or(ALL_CHAINS_CHART))?
                .unwrap_or_default();
            serde_json::to_value(chain_page(chain, &chart, &feed.protocols, &feed.chains))?
        }
        Report::Chains => {
            let feeds = chain_feeds(data)?;
            let page = chains_page(
                category.unwrap_or(ALL_CATEGORY),
                &feeds.inputs(),
                &ChainsPageOptions::default(),
                config.as_of,
            )?;
            serde_json::to_value(page)?
        }
        Report::Protocol => {
            let name = config.protocol.as_deref().unwrap_or_default();
            let feed = data.protocols()?;
            let directory = ProtocolDirectory::new(&feed.protocols);
            let protocol = directory.find(name)?;
            let detail = data.protocol_detail(&standardize_protocol_name(&protocol.name))?;
            serde_json::to_value(fuse_protocol_detail(detail))?
        }
        Report::ProtocolNames => {
            let feed = data.protocols()?;
            serde_json::to_value(protocol_names(&feed.protocols))?
        }
        Report::Nft => serde_json::to_value(NftStatistics::from_records(&data.nft_chart()?))?,
    };

    Ok(output)
}

/// Load every feed the chains listing needs. Chains without a stored chart are left out of
/// the chart set.
fn chain_feeds(data: &DataDir) -> Result<ChainFeeds, AggregationError> {
    let protocols = data.protocols()?;
    let config = data.config()?;
    let market_caps = data.market_caps()?;

    let mut charts = IndexMap::with_capacity(protocols.chains.len());
    for chain in &protocols.chains {
        if let Some(chart) = data.chart(chain)? {
            charts.insert(chain.clone(), chart);
        }
    }

    Ok(ChainFeeds {
        chains: protocols.chains,
        charts,
        metadata: config.chain_coingecko_ids,
        market_caps,
        protocols: protocols.protocols,
    })
}

/// Initialize logging to stderr, keeping stdout for the report. `TVL_LOG_JSON=true` switches
/// to JSON lines.
fn init_logging() {
    let json = std::env::var("TVL_LOG_JSON")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        );

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
