use serde::Serialize;

use super::calendar::run_quarter;
use super::types::{GrowthRateSettings, GrowthTargets, QuarterlyGrowthRate};

/// Per-axis multipliers for one month.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GrowthFactors {
    pub revenue: f64,
    pub customers: f64,
    pub orders: f64,
}

impl GrowthFactors {
    pub const NEUTRAL: GrowthFactors = GrowthFactors {
        revenue: 1.0,
        customers: 1.0,
        orders: 1.0,
    };
}

/// Values a growth entry may scale. Each axis is gated independently.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GrowthValues {
    pub revenue: f64,
    pub customers: f64,
    pub orders: f64,
}

pub fn find_growth_rate(
    month_index: u32,
    base_year: i32,
    settings: &GrowthRateSettings,
) -> Option<&QuarterlyGrowthRate> {
    let (quarter, year) = run_quarter(month_index, base_year);
    settings
        .quarterly_rates
        .iter()
        .find(|rate| u32::from(rate.quarter) == quarter && rate.year == year)
}

/// `1 + growthRate` of the matching run-quarter, or `1.0` when none is scheduled.
pub fn growth_rate_factor(month_index: u32, base_year: i32, settings: &GrowthRateSettings) -> f64 {
    find_growth_rate(month_index, base_year, settings)
        .map(|rate| 1.0 + rate.growth_rate)
        .unwrap_or(1.0)
}

pub fn growth_factors(month_index: u32, base_year: i32, settings: &GrowthRateSettings) -> GrowthFactors {
    let Some(rate) = find_growth_rate(month_index, base_year, settings) else {
        return GrowthFactors::NEUTRAL;
    };
    let factor = 1.0 + rate.growth_rate;
    let GrowthTargets {
        revenue,
        customers,
        orders,
    } = rate.applies_to;
    let gate = |on: bool| if on { factor } else { 1.0 };
    GrowthFactors {
        revenue: gate(revenue),
        customers: gate(customers),
        orders: gate(orders),
    }
}

pub fn apply_growth_rates(
    values: GrowthValues,
    month_index: u32,
    base_year: i32,
    settings: &GrowthRateSettings,
) -> GrowthValues {
    let factors = growth_factors(month_index, base_year, settings);
    GrowthValues {
        revenue: values.revenue * factors.revenue,
        customers: values.customers * factors.customers,
        orders: values.orders * factors.orders,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthQuarter {
    pub quarter: u8,
    pub year: i32,
    pub growth_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRateSummary {
    pub total_quarters: usize,
    pub average_growth_rate: f64,
    pub quarters: Vec<GrowthQuarter>,
}

/// Configured quarters in calendar order with their mean growth rate.
pub fn growth_rate_summary(settings: &GrowthRateSettings) -> GrowthRateSummary {
    let mut quarters: Vec<GrowthQuarter> = settings
        .quarterly_rates
        .iter()
        .map(|rate| GrowthQuarter {
            quarter: rate.quarter,
            year: rate.year,
            growth_rate: rate.growth_rate,
            description: rate.description.clone(),
        })
        .collect();
    quarters.sort_by_key(|q| (q.year, q.quarter));
    let average_growth_rate = if quarters.is_empty() {
        0.0
    } else {
        quarters.iter().map(|q| q.growth_rate).sum::<f64>() / quarters.len() as f64
    };
    GrowthRateSummary {
        total_quarters: quarters.len(),
        average_growth_rate,
        quarters,
    }
}
