/// TVL Aggregation - Composition Engine
///
/// Turns raw DeFi feed data (protocol snapshots, per-chain TVL histories, chain metadata,
/// market caps and NFT volumes) into display-ready aggregates:
/// - protocol listings filtered by chain and/or category, with auxiliary TVL extraction
/// - per-chain rollups with historical offsets and percent changes
/// - a multi-chain stacked time-series dataset
/// - parent chain groupings and NFT volume statistics
///
/// Every operation is a pure, synchronous function over in-memory inputs. Transport lives
/// with the caller; [`feed::decode`] is the only fallible boundary besides an unknown chain
/// category in [`page::chains_page`].
pub mod chain;
pub mod change;
pub mod error;
pub mod feed;
pub mod filter;
pub mod nft;
pub mod page;
pub mod parent;
pub mod protocol;
pub mod section;
pub mod series;
pub mod stacked;

// Re-export commonly used types for convenience
pub use chain::{
    build_chain_records, ChainInputs, ChainMetadata, ChainMetadataMap, ChainRecord, MarketCaps,
};
pub use change::percent_change;
pub use error::AggregationError;
pub use feed::{decode, ConfigResponse, ProtocolDirectory, ProtocolsResponse};
pub use filter::{filter_protocols, format_protocols, ProtocolQuery};
pub use nft::{NftStatistics, NftVolumeRecord};
pub use page::{chains_page, ChainFeeds, ChainsPage, ChainsPageOptions};
pub use parent::{group_by_parent, ParentGrouping};
pub use protocol::{Protocol, ProtocolRecord, ProtocolView, SectionTvl};
pub use section::{classify_section, SectionMode};
pub use series::{ChainChart, TvlPoint};
pub use stacked::{build_stacked_dataset, StackedDataset};
