use serde::Serialize;

/// A ratio-style KPI whose denominator may legitimately be zero.
///
/// `Unbounded` replaces the `Infinity` a bare division would produce, so no
/// non-finite value ever reaches a serialized result.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Metric {
    Finite(f64),
    Unbounded,
}

impl Metric {
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            if numerator == 0.0 {
                Metric::Finite(0.0)
            } else {
                Metric::Unbounded
            }
        } else {
            let value = numerator / denominator;
            if value.is_finite() {
                Metric::Finite(value)
            } else {
                Metric::Unbounded
            }
        }
    }

    pub fn finite(self) -> Option<f64> {
        match self {
            Metric::Finite(v) => Some(v),
            Metric::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Metric::Unbounded)
    }
}

/// Division that resolves a zero denominator to 0.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() { value } else { 0.0 }
}

pub fn profit_margin(net_profit: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        net_profit / revenue
    } else {
        0.0
    }
}

/// Rounds a modeled volume to a whole, non-negative count.
pub fn round_count(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if rounded >= u64::MAX as f64 {
        u64::MAX
    } else {
        rounded as u64
    }
}
