use super::calendar::MonthKey;
use super::growth::growth_factors;
use super::metric::{Metric, round_count, safe_div};
use super::quarterly::{BaseMetrics, apply_quarterly_overrides};
use super::types::{
    CostInputs, ModelKind, ModelMonth, ModelRun, UnitEconomicsInputs, UnitEconomicsMonth,
    UnitEconomicsSummary,
};

pub type UnitEconomicsRun = ModelRun<UnitEconomicsMonth, UnitEconomicsSummary>;

/// Months a unit buyer is assumed to keep buying when pricing lifetime value.
pub const ASSUMED_LIFESPAN_MONTHS: f64 = 12.0;

fn base_metrics(inputs: &UnitEconomicsInputs, costs: &CostInputs) -> BaseMetrics {
    BaseMetrics {
        price: inputs.unit_price,
        sales: inputs.monthly_sales,
        ..BaseMetrics::from_costs(costs)
    }
}

fn capacity(inputs: &UnitEconomicsInputs) -> u64 {
    if inputs.production_capacity.is_finite() && inputs.production_capacity > 0.0 {
        inputs.production_capacity.floor() as u64
    } else {
        0
    }
}

/// Sales of the un-adjusted inputs after the capacity clamp.
pub fn base_sales(inputs: &UnitEconomicsInputs) -> u64 {
    round_count(inputs.monthly_sales).min(capacity(inputs))
}

/// Months are independent; nothing is carried between them.
pub fn step_month(
    inputs: &UnitEconomicsInputs,
    costs: &CostInputs,
    key: MonthKey,
    month_index: u32,
    base_year: i32,
) -> ModelMonth<UnitEconomicsMonth> {
    let adj = &inputs.adjustments;
    let base = apply_quarterly_overrides(
        month_index,
        base_year,
        &adj.quarterly_detailed_settings,
        ModelKind::UnitEconomics,
        base_metrics(inputs, costs),
    );
    let factors = growth_factors(month_index, base_year, &adj.growth_rate_settings);

    let demand = round_count(base.sales * factors.customers);
    let sales = demand.min(capacity(inputs));
    let unit_price = base.price * factors.revenue;
    let units = sales as f64;
    let revenue = units * unit_price;
    let cost_of_goods_sold = units * inputs.variable_cost_per_unit();
    let total_costs = base.fixed_costs() + costs.payment_fee_rate * revenue + cost_of_goods_sold;

    ModelMonth {
        key,
        revenue,
        customers: sales,
        total_costs,
        detail: UnitEconomicsMonth {
            sales,
            production: sales,
            unit_price,
            cost_of_goods_sold,
            gross_margin: revenue - cost_of_goods_sold,
        },
    }
}

pub fn simulate(
    inputs: &UnitEconomicsInputs,
    costs: &CostInputs,
    start: MonthKey,
    months: u32,
) -> UnitEconomicsRun {
    let base_year = start.year();
    let records: Vec<_> = start
        .range(months)
        .enumerate()
        .map(|(index, key)| step_month(inputs, costs, key, index as u32, base_year))
        .collect();

    let total_sales: u64 = records.iter().map(|m| m.detail.sales).sum();
    let total_cost_of_goods_sold: f64 = records.iter().map(|m| m.detail.cost_of_goods_sold).sum();
    let total_gross_margin: f64 = records.iter().map(|m| m.detail.gross_margin).sum();

    let reference_sales = base_sales(inputs) as f64;
    let unit_margin = inputs.unit_price - inputs.variable_cost_per_unit();
    let summary = UnitEconomicsSummary {
        total_sales,
        total_cost_of_goods_sold,
        total_gross_margin,
        ltv: Metric::Finite(unit_margin * reference_sales * ASSUMED_LIFESPAN_MONTHS),
        cac: safe_div(costs.marketing_cost, reference_sales),
    };
    ModelRun {
        months: records,
        total_customers: total_sales,
        summary,
    }
}
