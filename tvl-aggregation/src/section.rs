//! Classification of `chainTvls` section names into auxiliary ("extra") TVL categories.
//!
//! Upstream encodes categories purely by naming convention, so classification is string
//! inspection. The rule table must match upstream exactly, including the two capitalised
//! exceptions of the global mode.

/// Capitalised section names that are auxiliary categories in global mode.
pub const GLOBAL_CAPITALISED_CATEGORIES: [&str; 2] = ["Offers", "Treasury"];

/// How a section name is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMode<'a> {
    /// Aggregation for one chain: only `"<chain>-<category>"` sections are auxiliary.
    Chain(&'a str),
    /// Aggregation across every chain: lowercase-led sections plus the capitalised exceptions.
    Global,
}

impl<'a> SectionMode<'a> {
    pub fn from_chain(chain: Option<&'a str>) -> Self {
        match chain {
            Some(chain) => SectionMode::Chain(chain),
            None => SectionMode::Global,
        }
    }
}

/// Returns the category key when `section_name` is an auxiliary TVL section under `mode`.
///
/// Chain mode yields the second `-` separated segment; global mode yields the name unchanged.
pub fn classify_section<'s>(section_name: &'s str, mode: SectionMode<'_>) -> Option<&'s str> {
    match mode {
        SectionMode::Chain(chain) => {
            section_name.strip_prefix(chain)?.strip_prefix('-')?;
            // Second segment only, even when the chain name itself contains a '-'
            section_name.split('-').nth(1)
        }
        SectionMode::Global => {
            let first = section_name.chars().next()?;
            let lowercase_led = first.to_lowercase().eq(std::iter::once(first));
            (lowercase_led || GLOBAL_CAPITALISED_CATEGORIES.contains(&section_name))
                .then_some(section_name)
        }
    }
}

/// Splits a `"<chain>-<category>[-...]"` key into its first two segments, lowercasing the
/// category. Trailing segments are ignored.
pub fn split_chain_category(section_name: &str) -> Option<(&str, String)> {
    let mut segments = section_name.split('-');
    let chain = segments.next()?;
    let category = segments.next()?;
    Some((chain, category.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_section() {
        struct TestCase {
            section: &'static str,
            mode: SectionMode<'static>,
            expected: Option<&'static str>,
        }

        let tests = vec![
            TestCase {
                // TC0: global lowercase category
                section: "staking",
                mode: SectionMode::Global,
                expected: Some("staking"),
            },
            TestCase {
                // TC1: global capitalised exception
                section: "Treasury",
                mode: SectionMode::Global,
                expected: Some("Treasury"),
            },
            TestCase {
                // TC2: global capitalised exception
                section: "Offers",
                mode: SectionMode::Global,
                expected: Some("Offers"),
            },
            TestCase {
                // TC3: global chain name is not auxiliary
                section: "Ethereum",
                mode: SectionMode::Global,
                expected: None,
            },
            TestCase {
                // TC4: global keeps the full name, including chain prefixed lowercase names
                section: "pool2",
                mode: SectionMode::Global,
                expected: Some("pool2"),
            },
            TestCase {
                // TC5: global chain-prefixed section starts uppercase
                section: "Ethereum-staking",
                mode: SectionMode::Global,
                expected: None,
            },
            TestCase {
                // TC6: global non-letter first char equals its lowercase form
                section: "1inch-vault",
                mode: SectionMode::Global,
                expected: Some("1inch-vault"),
            },
            TestCase {
                // TC7: empty section name
                section: "",
                mode: SectionMode::Global,
                expected: None,
            },
            TestCase {
                // TC8: chain-scoped match
                section: "Polygon-staking",
                mode: SectionMode::Chain("Polygon"),
                expected: Some("staking"),
            },
            TestCase {
                // TC9: chain-scoped wrong prefix
                section: "Ethereum-staking",
                mode: SectionMode::Chain("Polygon"),
                expected: None,
            },
            TestCase {
                // TC10: chain-scoped bare chain section
                section: "Polygon",
                mode: SectionMode::Chain("Polygon"),
                expected: None,
            },
            TestCase {
                // TC11: chain-scoped prefix must end at the '-'
                section: "PolygonZk-staking",
                mode: SectionMode::Chain("Polygon"),
                expected: None,
            },
            TestCase {
                // TC12: chain-scoped key is the second segment, trailing segments dropped
                section: "Polygon-borrowed-v2",
                mode: SectionMode::Chain("Polygon"),
                expected: Some("borrowed"),
            },
            TestCase {
                // TC13: chain-scoped does not accept global categories
                section: "staking",
                mode: SectionMode::Chain("Polygon"),
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = classify_section(test.section, test.mode);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_split_chain_category() {
        assert_eq!(
            split_chain_category("Ethereum-Staking"),
            Some(("Ethereum", "staking".to_string()))
        );
        assert_eq!(
            split_chain_category("BSC-pool2-old"),
            Some(("BSC", "pool2".to_string()))
        );
        assert_eq!(split_chain_category("treasury"), None);
    }
}
