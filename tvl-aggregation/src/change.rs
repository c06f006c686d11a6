//! Percentage change between a current value and a historical baseline.

/// Percent change of `current` relative to `previous`.
///
/// Returns `None` when there is no usable baseline (`previous` missing or zero) or no current
/// value. No rounding is applied.
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let current = current?;
    match previous {
        Some(previous) if previous != 0.0 => Some(((current - previous) / previous) * 100.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change() {
        struct TestCase {
            current: Option<f64>,
            previous: Option<f64>,
            expected: Option<f64>,
        }

        let tests = vec![
            TestCase {
                // TC0: growth
                current: Some(150.0),
                previous: Some(100.0),
                expected: Some(50.0),
            },
            TestCase {
                // TC1: decline
                current: Some(75.0),
                previous: Some(100.0),
                expected: Some(-25.0),
            },
            TestCase {
                // TC2: zero baseline
                current: Some(75.0),
                previous: Some(0.0),
                expected: None,
            },
            TestCase {
                // TC3: missing baseline
                current: Some(75.0),
                previous: None,
                expected: None,
            },
            TestCase {
                // TC4: missing current
                current: None,
                previous: Some(100.0),
                expected: None,
            },
            TestCase {
                // TC5: zero current is a meaningful value
                current: Some(0.0),
                previous: Some(40.0),
                expected: Some(-100.0),
            },
            TestCase {
                // TC6: negative zero baseline is still zero
                current: Some(10.0),
                previous: Some(-0.0),
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = percent_change(test.current, test.previous);
            match (actual, test.expected) {
                (Some(actual), Some(expected)) => {
                    assert!((actual - expected).abs() < 1e-9, "TC{} failed", index)
                }
                (actual, expected) => assert_eq!(actual, expected, "TC{} failed", index),
            }
        }
    }

    #[test]
    fn test_percent_change_is_none_only_without_baseline() {
        let baselines = [None, Some(0.0), Some(1.0), Some(-3.5), Some(1e9)];
        let currents = [Some(0.0), Some(2.0), Some(-8.0), Some(1e12)];

        for previous in baselines {
            for current in currents {
                let undefined = matches!(previous, None | Some(0.0));
                assert_eq!(
                    percent_change(current, previous).is_none(),
                    undefined,
                    "current: {current:?}, previous: {previous:?}"
                );
            }
        }
    }
}
