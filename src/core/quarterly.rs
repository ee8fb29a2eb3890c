use std::collections::BTreeSet;

use serde::Serialize;

use super::calendar::run_quarter;
use super::metric::safe_div;
use super::types::{CostInputs, ModelKind, QuarterlyDetailedSettings, QuarterlyMetrics};

/// Pre-growth base values for one month; the quantity a quarterly bundle substitutes into.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BaseMetrics {
    pub conversion_rate: f64,
    pub price: f64,
    pub visitors: f64,
    pub sales: f64,
    pub churn_rate: f64,
    pub refund_rate: f64,
    pub take_rate: f64,
    pub marketing_cost: f64,
    pub personnel_cost: f64,
    pub other_fixed_costs: f64,
}

impl BaseMetrics {
    /// Base with cost fields taken from `costs` and every model field zeroed.
    pub fn from_costs(costs: &CostInputs) -> Self {
        Self {
            conversion_rate: 0.0,
            price: 0.0,
            visitors: 0.0,
            sales: 0.0,
            churn_rate: 0.0,
            refund_rate: 0.0,
            take_rate: 0.0,
            marketing_cost: costs.marketing_cost,
            personnel_cost: costs.personnel_cost,
            other_fixed_costs: costs.other_fixed_costs,
        }
    }

    pub fn fixed_costs(&self) -> f64 {
        self.marketing_cost + self.personnel_cost + self.other_fixed_costs
    }
}

pub fn find_quarterly_metrics(
    month_index: u32,
    base_year: i32,
    settings: &QuarterlyDetailedSettings,
) -> Option<&QuarterlyMetrics> {
    if !settings.use_detailed_settings {
        return None;
    }
    let (quarter, year) = run_quarter(month_index, base_year);
    settings
        .quarterly_metrics
        .iter()
        .find(|m| u32::from(m.quarter) == quarter && m.year == year)
}

pub fn is_override_applicable(
    month_index: u32,
    base_year: i32,
    settings: &QuarterlyDetailedSettings,
) -> bool {
    find_quarterly_metrics(month_index, base_year, settings).is_some()
}

pub fn apply_quarterly_overrides(
    month_index: u32,
    base_year: i32,
    settings: &QuarterlyDetailedSettings,
    model: ModelKind,
    base: BaseMetrics,
) -> BaseMetrics {
    let Some(bundle) = find_quarterly_metrics(month_index, base_year, settings) else {
        return base;
    };
    let mut adjusted = base;

    let (conversion, price) = match model {
        ModelKind::Subscription => (
            bundle.conversion_rates.visitor_to_signup,
            bundle.pricing.monthly_price,
        ),
        ModelKind::UnitEconomics => (None, bundle.pricing.unit_price),
        ModelKind::Marketplace => (
            bundle.conversion_rates.visitor_to_buyer,
            bundle.pricing.average_order_value,
        ),
    };
    let replace = |slot: &mut f64, value: Option<f64>| {
        if let Some(v) = value {
            *slot = v;
        }
    };
    replace(&mut adjusted.conversion_rate, conversion);
    replace(&mut adjusted.price, price);

    replace(&mut adjusted.marketing_cost, bundle.costs.marketing_cost);
    replace(&mut adjusted.personnel_cost, bundle.costs.personnel_cost);
    replace(&mut adjusted.other_fixed_costs, bundle.costs.other_fixed_costs);

    let metrics = &bundle.metrics;
    replace(&mut adjusted.visitors, metrics.monthly_visitors);
    replace(&mut adjusted.sales, metrics.monthly_sales);
    replace(&mut adjusted.churn_rate, metrics.churn_rate);
    replace(&mut adjusted.refund_rate, metrics.refund_rate);
    replace(&mut adjusted.take_rate, metrics.take_rate);

    adjusted
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuarterRef {
    pub quarter: u32,
    pub year: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyCoverage {
    pub total_quarters: u32,
    pub configured_quarters: u32,
    pub coverage_rate: f64,
    pub missing_quarters: Vec<QuarterRef>,
}

/// How many run-quarters of a `total_months` horizon carry an override bundle.
///
/// Only bundles inside the horizon count as configured; with overrides
/// disabled nothing is configured and no quarter is reported missing. Run
/// quarters past the fourth carry numbers above 4 and are always missing.
pub fn analyze_quarterly_coverage(
    settings: &QuarterlyDetailedSettings,
    total_months: u32,
    base_year: i32,
) -> QuarterlyCoverage {
    let total_quarters = total_months.div_ceil(3);
    if !settings.use_detailed_settings {
        return QuarterlyCoverage {
            total_quarters,
            configured_quarters: 0,
            coverage_rate: 0.0,
            missing_quarters: Vec::new(),
        };
    }

    let configured: BTreeSet<(i32, u32)> = settings
        .quarterly_metrics
        .iter()
        .map(|m| (m.year, u32::from(m.quarter)))
        .collect();
    let mut configured_quarters = 0;
    let mut missing_quarters = Vec::new();
    for i in 0..total_quarters {
        let (quarter, year) = run_quarter(i * 3, base_year);
        if configured.contains(&(year, quarter)) {
            configured_quarters += 1;
        } else {
            missing_quarters.push(QuarterRef { quarter, year });
        }
    }

    QuarterlyCoverage {
        total_quarters,
        configured_quarters,
        coverage_rate: safe_div(configured_quarters as f64, total_quarters as f64),
        missing_quarters,
    }
}
