//! Parent chain -> child chain grouping from static chain metadata.

use crate::chain::ChainMetadataMap;
use indexmap::{IndexMap, IndexSet};

/// Parent chain name -> child chain names, in first-seen order.
pub type ParentGrouping = IndexMap<String, IndexSet<String>>;

/// Group `chains` under the parent declared in their metadata.
///
/// Chains without a declared parent (or without metadata) are omitted entirely; they never
/// appear as an empty group.
pub fn group_by_parent<S>(chains: &[S], metadata: &ChainMetadataMap) -> ParentGrouping
where
    S: AsRef<str>,
{
    chains
        .iter()
        .filter_map(|chain| {
            let chain: &str = chain.as_ref();
            metadata
                .get(chain)
                .and_then(|metadata| metadata.parent.as_deref())
                .map(|parent| (parent, chain))
        })
        .fold(ParentGrouping::default(), |mut grouping, (parent, chain)| {
            grouping
                .entry(parent.to_string())
                .or_default()
                .insert(chain.to_string());
            grouping
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainMetadata;

    fn metadata(entries: &[(&str, Option<&str>)]) -> ChainMetadataMap {
        entries
            .iter()
            .map(|(chain, parent)| {
                (
                    chain.to_string(),
                    ChainMetadata {
                        parent: parent.map(str::to_string),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_group_by_parent() {
        let metadata = metadata(&[
            ("Ethereum", None),
            ("Arbitrum", Some("Ethereum")),
            ("Optimism", Some("Ethereum")),
            ("Moonriver", Some("Kusama")),
            ("Solana", None),
        ]);
        let chains = ["Ethereum", "Arbitrum", "Solana", "Optimism", "Moonriver", "Unknown"];

        let actual = group_by_parent(&chains, &metadata);

        assert_eq!(actual.keys().collect::<Vec<_>>(), vec!["Ethereum", "Kusama"]);
        assert_eq!(
            actual["Ethereum"].iter().collect::<Vec<_>>(),
            vec!["Arbitrum", "Optimism"]
        );
        assert_eq!(actual["Kusama"].iter().collect::<Vec<_>>(), vec!["Moonriver"]);
    }

    #[test]
    fn test_group_by_parent_parentless_chain_absent() {
        let metadata = metadata(&[("Solana", None), ("Eclipse", Some("Solana"))]);

        let actual = group_by_parent(&["Solana", "Ethereum"], &metadata);

        assert!(actual.is_empty());
        assert!(actual.values().all(|children| !children.contains("Solana")));
    }

    #[test]
    fn test_group_by_parent_only_listed_chains() {
        let metadata = metadata(&[("Arbitrum", Some("Ethereum")), ("Base", Some("Ethereum"))]);

        let actual = group_by_parent(&["Base".to_string()], &metadata);

        assert_eq!(actual.len(), 1);
        assert_eq!(actual["Ethereum"].len(), 1);
        assert!(actual["Ethereum"].contains("Base"));
    }
}
