use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in `tvl-aggregation`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum AggregationError {
    #[error("chain category not found: {0}")]
    CategoryNotFound(String),

    #[error("protocol not found: {0}")]
    ProtocolNotFound(String),

    #[error("failed to decode upstream payload: {0}")]
    Payload(String),

    #[error("failed to read upstream payload {path}: {reason}")]
    Source { path: String, reason: String },
}

impl AggregationError {
    /// Determine if an error is the caller-facing "data unavailable" signal, as opposed to a
    /// failure in the transport boundary.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_not_found(&self) -> bool {
        match self {
            AggregationError::CategoryNotFound(_) | AggregationError::ProtocolNotFound(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AggregationError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_error_is_not_found() {
        struct TestCase {
            input: AggregationError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: unknown category is the not-found signal
                input: AggregationError::CategoryNotFound("Rollup".to_string()),
                expected: true,
            },
            TestCase {
                // TC1: unknown protocol slug
                input: AggregationError::ProtocolNotFound("sushi".to_string()),
                expected: true,
            },
            TestCase {
                // TC2: decoding failure is not
                input: AggregationError::from(
                    serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
                ),
                expected: false,
            },
            TestCase {
                // TC3: unreadable source is not
                input: AggregationError::Source {
                    path: "protocols.json".to_string(),
                    reason: "No such file or directory".to_string(),
                },
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_not_found();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
