//! Aggregation output domain model

use serde::{Deserialize, Serialize};

/// One aggregation output row: a group-by key and its summed cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedBucket {
    pub key: String,
    /// Summed cost, rounded to cents
    pub total: f64,
}

impl AggregatedBucket {
    pub fn new(key: impl Into<String>, total: f64) -> Self {
        Self {
            key: key.into(),
            total,
        }
    }
}

/// Round an amount to 2 decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` in `whole`, 0 when `whole` is not positive
pub fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.005_1), 10.01);
        assert_eq!(round_cents(0.1 + 0.2), 0.3);
        assert_eq!(round_cents(-3.456), -3.46);
    }

    #[test]
    fn test_share_pct_guards_zero_total() {
        assert_eq!(share_pct(5.0, 0.0), 0.0);
        assert_eq!(share_pct(25.0, 100.0), 25.0);
    }
}
